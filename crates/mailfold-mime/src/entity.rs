//! MIME entities: a header block, a blank line, then a body.

use std::fmt;

use mailfold_header::{ContentType, HeaderField};

use crate::headers::Headers;
use crate::multipart::Multipart;

/// Entity body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Already transfer-encoded text.
    Text(String),
    /// Parts separated by a boundary.
    Multipart(Multipart),
}

impl Default for Body {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Multipart(multipart) => write!(f, "{multipart}"),
        }
    }
}

/// A message or body part.
///
/// ```ignore
/// let entity = Entity::new(ContentType::text_plain(), "hello world");
/// assert_eq!(
///     entity.to_string(),
///     "Content-Type: text/plain; charset=utf-8\r\n\r\nhello world"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Entity {
    /// Header fields.
    pub headers: Headers,
    /// Body.
    pub body: Body,
}

impl Entity {
    /// Creates an entity with only a `Content-Type` field.
    #[must_use]
    pub fn new(content_type: ContentType, data: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.add(content_type);
        Self {
            headers,
            body: Body::Text(data.into()),
        }
    }

    /// Creates an entity from its parts.
    #[must_use]
    pub const fn with_headers(headers: Headers, body: Body) -> Self {
        Self { headers, body }
    }

    /// The `Content-Type` field, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&dyn HeaderField> {
        self.headers.get("Content-Type")
    }

    /// Whether the body is multipart.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, Body::Multipart(_))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}", self.headers, self.body)
    }
}
