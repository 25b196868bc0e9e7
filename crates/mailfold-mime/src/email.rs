//! Whole messages built from addresses, a body, and attachments.

use mailfold_header::codec;
use mailfold_header::{
    Address, AddressField, ContentTransferEncoding, HeaderField, MimeVersion, Subject,
    TransferEncoding,
};
use rand::Rng;

use crate::attachment::Attachment;
use crate::entity::{Body, Entity};
use crate::error::Result;
use crate::headers::Headers;
use crate::multipart::Multipart;
use crate::sniff::sniff_content_type;

/// A message assembled into a single MIME entity.
///
/// Address fields accept comma-separated lists. Empty fields are left out.
/// The structure depends on what is present:
///
/// - nothing: the header block and an empty body, without `MIME-Version`
/// - one body, inline part, or attachment: that single entity
/// - body and inline parts: `multipart/related`
/// - attachments with at most one of body or inline part: `multipart/mixed`
/// - otherwise: `multipart/mixed` holding a `multipart/related` of the body
///   and inline parts, then the attachments
///
/// ```ignore
/// let mut email = Email::new();
/// email.from = "a@a.com".into();
/// email.to = "b@b.com".into();
/// email.subject = "Hello".into();
/// email.body = "Hello World".into();
/// let raw = email.raw()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Email {
    /// `From` mailboxes.
    pub from: String,
    /// `To` mailboxes.
    pub to: String,
    /// `Cc` mailboxes.
    pub cc: String,
    /// `Bcc` mailboxes.
    pub bcc: String,
    /// Subject; any printable Unicode.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Inline parts and attachments, in order.
    pub attachments: Vec<Attachment>,
    extra: Headers,
}

impl Email {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field after the address and subject fields.
    pub fn add_header(&mut self, field: impl HeaderField + 'static) {
        self.extra.add(field);
    }

    /// Adds an attachment or inline part.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// The top-level fields: `From`, `To`, `Cc`, `Bcc`, `Subject` when
    /// non-empty, then added fields.
    #[must_use]
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        for (field, value) in [
            (AddressField::From, &self.from),
            (AddressField::To, &self.to),
            (AddressField::Cc, &self.cc),
            (AddressField::Bcc, &self.bcc),
        ] {
            if !value.is_empty() {
                headers.add(Address::new(field, value.as_str()));
            }
        }
        if !self.subject.is_empty() {
            headers.add(Subject::new(self.subject.as_str()));
        }
        headers.extend(self.extra.clone());
        headers
    }

    /// Validates the top-level fields.
    #[must_use]
    pub fn validate(&self) -> Vec<mailfold_header::Error> {
        self.headers().validate()
    }

    /// Renders the message with a random boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if a multipart body cannot be assembled.
    pub fn raw(&self) -> Result<String> {
        self.raw_with_rng(&mut rand::thread_rng())
    }

    /// Renders the message with boundaries drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if a multipart body cannot be assembled.
    pub fn raw_with_rng<R: Rng>(&self, rng: &mut R) -> Result<String> {
        Ok(self.entity(rng)?.to_string())
    }

    /// Assembles the message entity.
    ///
    /// # Errors
    ///
    /// Returns an error if a multipart body cannot be assembled.
    pub fn entity<R: Rng>(&self, rng: &mut R) -> Result<Entity> {
        let mut content: Vec<Entity> = Vec::new();
        if !self.body.is_empty() {
            content.push(self.body_entity());
        }
        let mut attachments = Vec::new();
        for attachment in &self.attachments {
            if attachment.inline {
                content.push(attachment.entity());
            } else {
                attachments.push(attachment.entity());
            }
        }

        let headers = self.headers();
        if content.is_empty() && attachments.is_empty() {
            return Ok(Entity::with_headers(headers, Body::default()));
        }

        let mut top = Headers::new();
        top.add(MimeVersion);
        top.extend(headers);

        tracing::debug!(
            content = content.len(),
            attachments = attachments.len(),
            "assembling message"
        );
        let entity = match (content.len(), attachments.len()) {
            (1, 0) | (0, 1) => {
                let mut single = content.pop().or_else(|| attachments.pop()).unwrap_or_default();
                top.extend(single.headers);
                single.headers = top;
                single
            }
            (_, 0) => Multipart::with_rng("related", content, rng)?.into_entity(top),
            (0 | 1, _) => {
                content.append(&mut attachments);
                Multipart::with_rng("mixed", content, rng)?.into_entity(top)
            }
            _ => {
                let related =
                    Multipart::with_rng("related", content, rng)?.into_entity(Headers::new());
                let mut parts = vec![related];
                parts.append(&mut attachments);
                Multipart::with_rng("mixed", parts, rng)?.into_entity(top)
            }
        };
        Ok(entity)
    }

    /// The body part. Text that cannot travel as `7bit` is sent
    /// quoted-printable.
    fn body_entity(&self) -> Entity {
        let content_type = sniff_content_type(self.body.as_bytes());
        if codec::is_7bit_safe(&self.body) {
            return Entity::new(content_type, self.body.as_str());
        }
        let mut headers = Headers::new();
        headers.add(content_type);
        headers.add(ContentTransferEncoding(TransferEncoding::QuotedPrintable));
        Entity::with_headers(
            headers,
            Body::Text(codec::encode_quoted_printable(&self.body)),
        )
    }
}
