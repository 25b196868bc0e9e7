//! Error types for header validation and decoding.

use std::io;
use std::string::FromUtf8Error;

/// Result type alias for header operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Header error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A validation failure attributed to a named field.
    #[error("{field}: {source}")]
    Field {
        /// Canonical field name, e.g. `Reply-To`.
        field: String,
        /// What was wrong with the field body.
        #[source]
        source: Box<Error>,
    },

    /// Address list could not be parsed.
    #[error("invalid address list: {0}")]
    InvalidAddress(String),

    /// A local part or domain exceeds the SMTP limits.
    #[error("address part exceeds max length of {limit} octets: {part:?}")]
    AddressPartTooLong {
        /// The offending local part or domain.
        part: String,
        /// The limit it exceeds.
        limit: usize,
    },

    /// A single-mailbox field was given several.
    #[error("must not contain more than one address, found {0}")]
    TooManyAddresses(usize),

    /// A msg-id longer than fits on a folded line.
    #[error("id must not exceed {limit} octets, has {len}")]
    IdTooLong {
        /// The limit.
        limit: usize,
        /// Actual length.
        len: usize,
    },

    /// A msg-id that does not match `"<" id-left "@" id-right ">"`.
    #[error("id has invalid syntax: {0:?}")]
    InvalidId(String),

    /// Field name is empty, too long, or contains a colon or non-printable.
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// Field body contains characters outside VCHAR and WSP.
    #[error("invalid characters in field body")]
    InvalidFieldBody,

    /// Value is not printable text and cannot be carried by encoded words.
    #[error("must contain only printable or white space characters")]
    NotWordEncodable,

    /// Malformed media type.
    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    /// Malformed parameter attribute.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid encoding.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// The folder's output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Attributes this error to the field `name`.
    #[must_use]
    pub fn in_field(self, name: &str) -> Self {
        Self::Field {
            field: name.to_owned(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through field attribution.
    #[must_use]
    pub fn kind(&self) -> &Self {
        match self {
            Self::Field { source, .. } => source.kind(),
            other => other,
        }
    }
}
