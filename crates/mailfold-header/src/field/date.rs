use chrono::{DateTime, FixedOffset, Local, TimeZone};

use super::{HeaderField, raw_line, render_folded};
use crate::error::Result;
use crate::fold::Token;

/// Formats a timestamp as an RFC 5322 `date-time`, e.g.
/// `Mon, 2 Jan 2006 15:04:05 -0700`.
#[must_use]
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    date.format("%a, %-d %b %Y %H:%M:%S %z").to_string()
}

/// The `Date` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Date(pub DateTime<FixedOffset>);

impl Date {
    /// The current local time.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().fixed_offset())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Date {
    fn from(date: DateTime<Tz>) -> Self {
        Self(date.fixed_offset())
    }
}

impl HeaderField for Date {
    fn name(&self) -> &str {
        "Date"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn render(&self) -> String {
        let value = format_date(&self.0);
        render_folded(|folder| {
            folder.write([format!("{}:", self.name())]);
            folder.write(Token::fws(1));
            folder.write([value.as_str()]);
        })
        .unwrap_or_else(|| raw_line(self.name(), &value))
    }
}
