//! Header field renderers.
//!
//! Every field validates its body and renders itself as one folded,
//! CRLF-terminated header line. Rendering never fails: a body that cannot
//! be understood is emitted verbatim as `Name: value\r\n`, and
//! [`HeaderField::validate`] reports what is wrong with it.

mod address;
mod content_type;
mod date;
mod message_id;
mod mime;
mod unstructured;

pub use address::{Address, AddressField, Mailbox};
pub use content_type::ContentType;
pub use date::{Date, format_date};
pub use message_id::{ContentId, MessageId};
pub use mime::{ContentDisposition, ContentTransferEncoding, MimeVersion, TransferEncoding};
pub use unstructured::{CustomHeader, Subject};

use std::fmt;

use crate::error::{Error, Result};
use crate::fold::Folder;
use crate::limits::MAX_FIELD_NAME_LEN;
use crate::syntax;

/// A header field that can validate and render itself.
pub trait HeaderField: fmt::Debug + Send + Sync + CloneHeaderField {
    /// Field name as rendered, e.g. `Reply-To`.
    fn name(&self) -> &str;

    /// Checks the field body against its grammar.
    ///
    /// # Errors
    ///
    /// Returns an error naming the field if the body is invalid.
    fn validate(&self) -> Result<()>;

    /// Renders the complete folded line, including the trailing CRLF.
    fn render(&self) -> String;
}

/// Object-safe cloning for boxed fields.
pub trait CloneHeaderField {
    /// Clones into a new box.
    fn clone_box(&self) -> Box<dyn HeaderField>;
}

impl<T> CloneHeaderField for T
where
    T: HeaderField + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn HeaderField> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn HeaderField> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Runs `build` against a fresh folder and returns the closed output, or
/// `None` if the folder failed.
pub(crate) fn render_folded(build: impl FnOnce(&mut Folder<Vec<u8>>)) -> Option<String> {
    let mut folder = Folder::new(Vec::new());
    build(&mut folder);
    match folder.finish() {
        Ok(bytes) => String::from_utf8(bytes).ok(),
        Err(err) => {
            tracing::warn!(error = %err, "folding failed");
            None
        }
    }
}

/// The unfolded fallback line.
pub(crate) fn raw_line(name: &str, value: &str) -> String {
    format!("{name}: {value}\r\n")
}

/// Checks a field name: printable US-ASCII without colon, at most 77 octets.
///
/// # Errors
///
/// Returns [`Error::InvalidFieldName`] otherwise.
pub fn validate_field_name(name: &str) -> Result<()> {
    if syntax::is_ftext(name) && name.len() <= MAX_FIELD_NAME_LEN {
        Ok(())
    } else {
        Err(Error::InvalidFieldName(name.to_owned()))
    }
}

/// Whether `value` holds only VCHAR and WSP.
#[must_use]
pub fn is_valid_field_body(value: &str) -> bool {
    value
        .bytes()
        .all(|b| syntax::is_vchar(b) || syntax::is_wsp(b))
}

/// Canonical capitalization of a field name: `content-type` becomes
/// `Content-Type`. Names with bytes outside `ftext` are returned unchanged.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    if !syntax::is_ftext(name) {
        return name.to_owned();
    }
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}
