//! `Message-ID` and `Content-ID`.

use super::{HeaderField, is_valid_field_body, raw_line, render_folded};
use crate::error::{Error, Result};
use crate::fold::Token;
use crate::limits::MAX_MSG_ID_LEN;
use crate::syntax;

fn validate_id(id: &str) -> Result<()> {
    if id.len() > MAX_MSG_ID_LEN {
        return Err(Error::IdTooLong {
            limit: MAX_MSG_ID_LEN,
            len: id.len(),
        });
    }
    if !is_valid_field_body(id) || !syntax::is_msg_id(id) {
        return Err(Error::InvalidId(id.to_owned()));
    }
    Ok(())
}

fn render_id(name: &str, id: &str) -> String {
    render_folded(|folder| {
        folder.write([format!("{name}:")]);
        folder.write(Token::fws(1));
        folder.write([id]);
    })
    .unwrap_or_else(|| raw_line(name, id))
}

/// The `Message-ID` field.
///
/// The id is normalized before use: surrounding white space is trimmed, a
/// missing `@` is appended, and angle brackets are added when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageId(pub String);

impl MessageId {
    /// Creates a message id from raw input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The normalized id, e.g. `foo` becomes `<foo@>`.
    #[must_use]
    pub fn normalized(&self) -> String {
        let id = self.0.trim();
        let mut id = if id.contains('@') {
            id.to_owned()
        } else {
            format!("{id}@")
        };
        if !id.contains('<') && !id.contains('>') {
            id = format!("<{id}>");
        }
        id
    }
}

impl HeaderField for MessageId {
    fn name(&self) -> &str {
        "Message-ID"
    }

    fn validate(&self) -> Result<()> {
        validate_id(&self.normalized()).map_err(|e| e.in_field(self.name()))
    }

    fn render(&self) -> String {
        render_id(self.name(), &self.normalized())
    }
}

/// The `Content-ID` field, naming a body part for `cid:` references.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentId(pub String);

impl ContentId {
    /// Creates a content id. Plain ids are wrapped in angle brackets.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.starts_with('<') {
            Self(trimmed.to_owned())
        } else {
            Self(format!("<{trimmed}>"))
        }
    }
}

impl HeaderField for ContentId {
    fn name(&self) -> &str {
        "Content-ID"
    }

    fn validate(&self) -> Result<()> {
        validate_id(&self.0).map_err(|e| e.in_field(self.name()))
    }

    fn render(&self) -> String {
        render_id(self.name(), &self.0)
    }
}
