//! Unstructured fields: `Subject` and arbitrary custom fields.

use super::{HeaderField, is_valid_field_body, raw_line, render_folded, validate_field_name};
use crate::codec::{self, WordEncoding};
use crate::error::{Error, Result};
use crate::fold::{Folder, Token, WordEncodable};
use crate::limits::MAX_LINE_LEN;
use crate::syntax;

/// Writes `Name:` and an unstructured body.
///
/// Printable ASCII whose words all fit on a continuation line folds at the
/// spaces between words. Anything else is carried as a single encodable
/// word (when allowed) that splits into encoded words as needed.
fn write_unstructured(folder: &mut Folder<Vec<u8>>, name: &str, value: &str, encodable: bool) {
    folder.write([format!("{name}:")]);
    folder.write(Token::fws(1));
    let long_word = value.split(' ').any(|word| word.len() >= MAX_LINE_LEN);
    if encodable && (codec::needs_encoding(value) || long_word) {
        folder.write([WordEncodable::new(value, WordEncoding::Q, false, 2)]);
        return;
    }
    for (i, word) in value.split(' ').enumerate() {
        if i > 0 {
            folder.write(Token::fws(1));
        }
        folder.write([word]);
    }
}

/// The `Subject` field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subject(pub String);

impl Subject {
    /// Creates a subject.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl HeaderField for Subject {
    fn name(&self) -> &str {
        "Subject"
    }

    fn validate(&self) -> Result<()> {
        if syntax::is_word_encodable(&self.0) {
            Ok(())
        } else {
            Err(Error::NotWordEncodable.in_field(self.name()))
        }
    }

    fn render(&self) -> String {
        render_folded(|folder| write_unstructured(folder, self.name(), &self.0, true))
            .unwrap_or_else(|| raw_line(self.name(), &self.0))
    }
}

/// A field with a caller-chosen name and an unstructured body.
///
/// When `word_encodable` is set, non-ASCII bodies are carried in encoded
/// words; otherwise the body is written verbatim and must be printable
/// US-ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomHeader {
    /// Field name.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the body may be carried in encoded words.
    pub word_encodable: bool,
}

impl CustomHeader {
    /// Creates a custom field whose body may be word-encoded.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            word_encodable: true,
        }
    }

    /// Creates a custom field whose body is written verbatim.
    #[must_use]
    pub fn verbatim(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            word_encodable: false,
            ..Self::new(name, value)
        }
    }
}

impl HeaderField for CustomHeader {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        validate_field_name(&self.name)?;
        let body_ok = if self.word_encodable {
            syntax::is_word_encodable(&self.value)
        } else {
            is_valid_field_body(&self.value)
        };
        if body_ok {
            Ok(())
        } else if self.word_encodable {
            Err(Error::NotWordEncodable.in_field(&self.name))
        } else {
            Err(Error::InvalidFieldBody.in_field(&self.name))
        }
    }

    fn render(&self) -> String {
        render_folded(|folder| {
            write_unstructured(folder, &self.name, &self.value, self.word_encodable);
        })
        .unwrap_or_else(|| raw_line(&self.name, &self.value))
    }
}
