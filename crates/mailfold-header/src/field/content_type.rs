//! MIME content type handling.

use std::collections::BTreeMap;
use std::fmt;

use super::{HeaderField, raw_line, render_folded};
use crate::codec;
use crate::error::{Error, Result};
use crate::fold::{Folder, MimeParam, Token};
use crate::syntax;

/// MIME content type with parameters, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx).
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf-8")
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "utf-8")
    }

    /// Creates a multipart content type with boundary.
    #[must_use]
    pub fn multipart(sub_type: impl Into<String>, boundary: impl Into<String>) -> Self {
        Self::new("multipart", sub_type).with_parameter("boundary", boundary)
    }

    /// Creates a multipart/mixed content type with boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: impl Into<String>) -> Self {
        Self::multipart("mixed", boundary)
    }

    /// Creates a multipart/alternative content type with boundary.
    #[must_use]
    pub fn multipart_alternative(boundary: impl Into<String>) -> Self {
        Self::multipart("alternative", boundary)
    }

    /// Creates a multipart/related content type with boundary.
    #[must_use]
    pub fn multipart_related(boundary: impl Into<String>) -> Self {
        Self::multipart("related", boundary)
    }

    /// Adds a parameter, replacing an existing one of the same name.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_parameter(&mut self.parameters, key.into(), value.into());
        self
    }

    /// Returns a parameter by case-insensitive name.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        get_parameter(&self.parameters, key)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// `type/subtype` without parameters.
    #[must_use]
    pub fn media_type(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text")
    }

    /// Parses a content type string, folded or not.
    ///
    /// Format: `type/subtype; param1=value1; param2=value2`. RFC 2231
    /// extended values and continuations are decoded and joined.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let unfolded = codec::unfold(s);
        let (type_str, params) = unfolded
            .split_once(';')
            .unwrap_or((unfolded.as_ref(), ""));

        let (main_type, sub_type) = type_str
            .trim()
            .split_once('/')
            .ok_or_else(|| Error::InvalidContentType(format!("missing subtype in {s:?}")))?;
        let (main_type, sub_type) = (main_type.trim(), sub_type.trim());
        if !syntax::is_mime_token(main_type) || !syntax::is_mime_token(sub_type) {
            return Err(Error::InvalidContentType(format!("{main_type}/{sub_type}")));
        }

        Ok(Self {
            main_type: main_type.to_lowercase(),
            sub_type: sub_type.to_lowercase(),
            parameters: parse_parameters(params)?,
        })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;

        for (key, value) in &self.parameters {
            write!(f, "; {}", MimeParam::new(key.as_str(), value.as_str(), 0).value())?;
        }

        Ok(())
    }
}

impl HeaderField for ContentType {
    fn name(&self) -> &str {
        "Content-Type"
    }

    fn validate(&self) -> Result<()> {
        if !syntax::is_mime_token(&self.main_type) || !syntax::is_mime_token(&self.sub_type) {
            return Err(Error::InvalidContentType(self.media_type()).in_field(self.name()));
        }
        validate_attributes(&self.parameters).map_err(|e| e.in_field(self.name()))
    }

    fn render(&self) -> String {
        render_folded(|folder| {
            write_with_parameters(folder, self.name(), &self.media_type(), &self.parameters);
        })
        .unwrap_or_else(|| raw_line(self.name(), &self.to_string()))
    }
}

/// Writes `Name: value` followed by `; attribute=value` for each parameter.
/// Lines break after a semicolon first, and inside a parameter only when it
/// does not fit on a line of its own.
pub(crate) fn write_with_parameters(
    folder: &mut Folder<Vec<u8>>,
    name: &str,
    value: &str,
    parameters: &[(String, String)],
) {
    folder.write([format!("{name}:")]);
    folder.write(Token::fws(1));
    folder.write([value]);
    for (key, value) in parameters {
        folder.write([";"]);
        folder.write(Token::fws(1));
        folder.write([MimeParam::new(key.as_str(), value.as_str(), 2)]);
    }
}

pub(crate) fn validate_attributes(parameters: &[(String, String)]) -> Result<()> {
    match parameters
        .iter()
        .find(|(key, _)| !syntax::is_mime_token(key) || key.contains('*'))
    {
        Some((key, _)) => Err(Error::InvalidParameter(key.clone())),
        None => Ok(()),
    }
}

pub(crate) fn set_parameter(parameters: &mut Vec<(String, String)>, key: String, value: String) {
    match parameters
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
    {
        Some(slot) => slot.1 = value,
        None => parameters.push((key, value)),
    }
}

pub(crate) fn get_parameter<'a>(parameters: &'a [(String, String)], key: &str) -> Option<&'a str> {
    parameters
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        .map(|(_, value)| value.as_str())
}

/// Splits on `;` outside quoted strings. Continuation sections folded onto
/// their own line are separated by white space alone, so white space
/// followed by `attribute*N=` also separates.
fn split_parameters(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            ' ' | '\t' if !quoted && starts_section(&s[i + 1..]) => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn starts_section(s: &str) -> bool {
    let Some((key, _)) = s.split_once('=') else {
        return false;
    };
    let key = key.strip_suffix('*').unwrap_or(key);
    key.split_once('*').is_some_and(|(attribute, section)| {
        syntax::is_mime_token(attribute)
            && !section.is_empty()
            && section.bytes().all(|b| b.is_ascii_digit())
    })
}

#[derive(Default)]
struct Continuation {
    sections: BTreeMap<usize, String>,
}

/// Parses `; key=value` pairs, decoding RFC 2231 extended values and joining
/// continuations in section order.
pub(crate) fn parse_parameters(s: &str) -> Result<Vec<(String, String)>> {
    let mut parameters: Vec<(String, String)> = Vec::new();
    let mut continued: Vec<(String, Continuation)> = Vec::new();

    for part in split_parameters(s) {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        let (base, extended) = key
            .strip_suffix('*')
            .map_or((key.as_str(), false), |base| (base, true));

        if let Some((attribute, section)) = base.split_once('*') {
            let section: usize = section
                .parse()
                .map_err(|_| Error::InvalidParameter(key.clone()))?;
            let text = match (extended, section) {
                (true, 0) => decode_extended(value)?,
                (true, _) => codec::percent_decode_param(value)?,
                (false, _) => syntax::dequote(value),
            };
            let index = continued
                .iter()
                .position(|(name, _)| name == attribute)
                .unwrap_or_else(|| {
                    continued.push((attribute.to_owned(), Continuation::default()));
                    continued.len() - 1
                });
            continued[index].1.sections.insert(section, text);
        } else if extended {
            set_parameter(&mut parameters, base.to_owned(), decode_extended(value)?);
        } else {
            set_parameter(&mut parameters, key.clone(), syntax::dequote(value));
        }
    }

    for (attribute, continuation) in continued {
        let value: String = continuation.sections.into_values().collect();
        set_parameter(&mut parameters, attribute, value);
    }
    Ok(parameters)
}

/// Decodes `charset'language'percent-encoded`.
fn decode_extended(value: &str) -> Result<String> {
    let mut parts = value.splitn(3, '\'');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_language), Some(encoded))
            if charset.is_empty()
                || charset.eq_ignore_ascii_case("utf-8")
                || charset.eq_ignore_ascii_case("us-ascii") =>
        {
            codec::percent_decode_param(encoded)
        }
        (Some(charset), Some(_), Some(_)) => Err(Error::InvalidEncoding(format!(
            "unsupported charset {charset:?}"
        ))),
        _ => Err(Error::InvalidEncoding(format!(
            "malformed extended value {value:?}"
        ))),
    }
}
