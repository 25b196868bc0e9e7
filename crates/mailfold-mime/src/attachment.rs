//! File attachments and inline parts.

use std::path::Path;

use mailfold_header::codec;
use mailfold_header::{ContentDisposition, ContentId, ContentTransferEncoding, TransferEncoding};

use crate::entity::{Body, Entity};
use crate::error::Result;
use crate::headers::Headers;
use crate::sniff::sniff_content_type;

/// A file carried in its own body part.
///
/// Inline parts are shown in place and referenced from HTML with
/// `cid:<content_id>`; other parts are offered for download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attachment {
    /// `inline` rather than `attachment` disposition.
    pub inline: bool,
    /// Suggested file name.
    pub filename: String,
    /// Content id for `cid:` references; omitted when empty.
    pub content_id: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates a regular attachment.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
            ..Self::default()
        }
    }

    /// Creates an inline part referenced as `cid:<content_id>`.
    #[must_use]
    pub fn inline(
        filename: impl Into<String>,
        content_id: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            inline: true,
            content_id: content_id.into(),
            ..Self::new(filename, data)
        }
    }

    /// Reads an attachment from disk, named after the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!(path = %path.display(), size = data.len(), "read attachment");
        Ok(Self::new(filename, data))
    }

    /// Sets the content id.
    #[must_use]
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = content_id.into();
        self
    }

    /// The body part: sniffed `Content-Type`, `Content-Disposition`,
    /// base64 transfer encoding, optional `Content-ID`, and the data
    /// base64-encoded in 76-column lines.
    #[must_use]
    pub fn entity(&self) -> Entity {
        let mut headers = Headers::new();
        headers.add(sniff_content_type(&self.data));
        headers.add(ContentDisposition {
            inline: self.inline,
            ..ContentDisposition::attachment(self.filename.as_str())
        });
        headers.add(ContentTransferEncoding(TransferEncoding::Base64));
        if !self.content_id.is_empty() {
            headers.add(ContentId::new(self.content_id.as_str()));
        }
        Entity::with_headers(headers, Body::Text(codec::encode_base64_lines(&self.data)))
    }
}
