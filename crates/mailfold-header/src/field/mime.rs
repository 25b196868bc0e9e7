//! MIME entity fields: `MIME-Version`, `Content-Transfer-Encoding` and
//! `Content-Disposition`.

use std::fmt;

use chrono::{DateTime, FixedOffset};

use super::content_type::{
    get_parameter, parse_parameters, set_parameter, validate_attributes, write_with_parameters,
};
use super::{HeaderField, format_date, raw_line, render_folded};
use crate::codec;
use crate::error::{Error, Result};
use crate::fold::Token;

/// `MIME-Version: 1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MimeVersion;

impl HeaderField for MimeVersion {
    fn name(&self) -> &str {
        "MIME-Version"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn render(&self) -> String {
        raw_line(self.name(), "1.0")
    }
}

/// Content transfer encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[default]
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Encodes `body` for transport.
    #[must_use]
    pub fn encode(self, body: &[u8]) -> String {
        match self {
            Self::Base64 => codec::encode_base64_lines(body),
            Self::QuotedPrintable => codec::encode_quoted_printable(&String::from_utf8_lossy(body)),
            Self::SevenBit | Self::EightBit | Self::Binary => {
                String::from_utf8_lossy(body).into_owned()
            }
        }
    }

    /// Decodes a transported body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid for this encoding.
    pub fn decode(self, body: &str) -> Result<Vec<u8>> {
        match self {
            Self::Base64 => codec::decode_base64(body),
            Self::QuotedPrintable => codec::decode_quoted_printable(body).map(String::into_bytes),
            Self::SevenBit | Self::EightBit | Self::Binary => Ok(body.as_bytes().to_vec()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// The `Content-Transfer-Encoding` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentTransferEncoding(pub TransferEncoding);

impl HeaderField for ContentTransferEncoding {
    fn name(&self) -> &str {
        "Content-Transfer-Encoding"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn render(&self) -> String {
        let value = self.0.to_string();
        render_folded(|folder| {
            folder.write([format!("{}:", self.name())]);
            folder.write(Token::fws(1));
            folder.write([value.as_str()]);
        })
        .unwrap_or_else(|| raw_line(self.name(), &value))
    }
}

/// The `Content-Disposition` field (RFC 2183).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentDisposition {
    /// `inline` rather than `attachment`.
    pub inline: bool,
    /// Suggested file name; omitted when empty.
    pub filename: String,
    /// `creation-date` parameter.
    pub creation_date: Option<DateTime<FixedOffset>>,
    /// `modification-date` parameter.
    pub modification_date: Option<DateTime<FixedOffset>>,
    /// `read-date` parameter.
    pub read_date: Option<DateTime<FixedOffset>>,
    /// `size` parameter, in octets.
    pub size: Option<u64>,
    /// Further parameters, rendered after the standard ones.
    pub parameters: Vec<(String, String)>,
}

impl ContentDisposition {
    /// An `attachment` disposition.
    #[must_use]
    pub fn attachment(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// An `inline` disposition.
    #[must_use]
    pub fn inline(filename: impl Into<String>) -> Self {
        Self {
            inline: true,
            ..Self::attachment(filename)
        }
    }

    /// Adds a parameter, replacing an existing one of the same name.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_parameter(&mut self.parameters, key.into(), value.into());
        self
    }

    /// `inline` or `attachment`.
    #[must_use]
    pub const fn disposition_type(&self) -> &'static str {
        if self.inline { "inline" } else { "attachment" }
    }

    /// All parameters in rendering order.
    #[must_use]
    pub fn all_parameters(&self) -> Vec<(String, String)> {
        let mut parameters = Vec::new();
        if !self.filename.is_empty() {
            parameters.push(("filename".to_owned(), self.filename.clone()));
        }
        for (key, date) in [
            ("creation-date", self.creation_date),
            ("modification-date", self.modification_date),
            ("read-date", self.read_date),
        ] {
            if let Some(date) = date {
                parameters.push((key.to_owned(), format_date(&date)));
            }
        }
        if let Some(size) = self.size {
            parameters.push(("size".to_owned(), size.to_string()));
        }
        parameters.extend(self.parameters.iter().cloned());
        parameters
    }

    /// Parses a disposition value such as `attachment; filename="a.txt"`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown disposition type or malformed
    /// parameters.
    pub fn parse(s: &str) -> Result<Self> {
        let unfolded = codec::unfold(s);
        let (kind, params) = unfolded.split_once(';').unwrap_or((unfolded.as_ref(), ""));
        let inline = match kind.trim().to_lowercase().as_str() {
            "inline" => true,
            "attachment" => false,
            other => return Err(Error::InvalidParameter(format!("disposition type {other:?}"))),
        };
        let mut disposition = Self {
            inline,
            ..Self::default()
        };
        for (key, value) in parse_parameters(params)? {
            match key.as_str() {
                "filename" => disposition.filename = value,
                "creation-date" => disposition.creation_date = parse_date(&value),
                "modification-date" => disposition.modification_date = parse_date(&value),
                "read-date" => disposition.read_date = parse_date(&value),
                "size" => disposition.size = value.parse().ok(),
                _ => disposition.parameters.push((key, value)),
            }
        }
        Ok(disposition)
    }

    /// Returns an extra parameter by case-insensitive name.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        get_parameter(&self.parameters, key)
    }
}

fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(value).ok()
}

impl HeaderField for ContentDisposition {
    fn name(&self) -> &str {
        "Content-Disposition"
    }

    fn validate(&self) -> Result<()> {
        validate_attributes(&self.parameters).map_err(|e| e.in_field(self.name()))
    }

    fn render(&self) -> String {
        let parameters = self.all_parameters();
        render_folded(|folder| {
            write_with_parameters(folder, self.name(), self.disposition_type(), &parameters);
        })
        .unwrap_or_else(|| raw_line(self.name(), self.disposition_type()))
    }
}
