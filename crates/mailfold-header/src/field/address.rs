//! Address-list fields: `From`, `Sender`, `Reply-To`, `To`, `Cc` and `Bcc`.

use std::fmt;

use mailparse::MailAddr;

use super::{HeaderField, raw_line, render_folded};
use crate::codec::WordEncoding;
use crate::error::{Error, Result};
use crate::fold::{Token, WordEncodable};
use crate::limits::{MAX_DOMAIN_LEN, MAX_LOCAL_PART_LEN};
use crate::syntax;

/// Which address field a list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressField {
    /// `From`
    From,
    /// `Sender`, which holds exactly one mailbox.
    Sender,
    /// `Reply-To`
    ReplyTo,
    /// `To`
    To,
    /// `Cc`
    Cc,
    /// `Bcc`
    Bcc,
}

impl AddressField {
    /// The rendered field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::From => "From",
            Self::Sender => "Sender",
            Self::ReplyTo => "Reply-To",
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mailbox (optional display name + address).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mailbox {
    /// Display name (optional).
    pub name: Option<String>,
    /// Email address, `local@domain`.
    pub address: String,
}

impl Mailbox {
    /// Creates a new mailbox with just an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        Self::validate(&address)?;
        Ok(Self {
            name: None,
            address,
        })
    }

    /// Creates a new mailbox with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Some(name.into()),
            ..Self::new(address)?
        })
    }

    /// Parses an RFC 5322 address list. Group members are flattened into
    /// the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not parse, is empty, or holds an
    /// address without a local part and domain.
    pub fn parse_list(value: &str) -> Result<Vec<Self>> {
        let list =
            mailparse::addrparse(value).map_err(|e| Error::InvalidAddress(e.to_string()))?;
        let mut mailboxes = Vec::new();
        for addr in list.iter() {
            match addr {
                MailAddr::Single(info) => {
                    mailboxes.push(Self::from_parts(info.display_name.clone(), &info.addr)?);
                }
                MailAddr::Group(group) => {
                    for info in &group.addrs {
                        mailboxes.push(Self::from_parts(info.display_name.clone(), &info.addr)?);
                    }
                }
            }
        }
        if mailboxes.is_empty() {
            return Err(Error::InvalidAddress("no address found".into()));
        }
        Ok(mailboxes)
    }

    fn from_parts(name: Option<String>, address: &str) -> Result<Self> {
        Self::validate(address)?;
        Ok(Self {
            name: name.filter(|n| !n.is_empty()),
            address: address.to_owned(),
        })
    }

    /// The part before the last `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or(self.address.as_str(), |(local, _)| local)
    }

    /// The part after the last `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or("", |(_, domain)| domain)
    }

    /// Validates an email address (basic validation).
    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("address cannot be empty".into()));
        }
        match addr.rsplit_once('@') {
            None => Err(Error::InvalidAddress(format!("{addr:?} must contain @"))),
            Some((local, domain)) if local.is_empty() || domain.is_empty() => Err(
                Error::InvalidAddress(format!("{addr:?} needs a local part and a domain")),
            ),
            Some(_) => Ok(()),
        }
    }

    /// Checks the SMTP length limits on local part and domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressPartTooLong`] naming the offending part.
    pub fn check_lengths(&self) -> Result<()> {
        for (part, limit) in [
            (self.local_part(), MAX_LOCAL_PART_LEN),
            (self.domain(), MAX_DOMAIN_LEN),
        ] {
            if part.len() > limit {
                return Err(Error::AddressPartTooLong {
                    part: part.to_owned(),
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Tokens for one mailbox. Breaks inside a quoted name are least
    /// preferred, then the break between name and angle address.
    fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        match self.name.as_deref() {
            Some(name) if syntax::is_quotable(name) => {
                for (i, word) in syntax::quote(name).split(' ').enumerate() {
                    if i > 0 {
                        tokens.extend(Token::fws(3));
                    }
                    tokens.push(word.into());
                }
                tokens.extend(Token::fws(2));
            }
            Some(name) => {
                tokens.push(WordEncodable::new(name, WordEncoding::Q, true, 3).into());
                tokens.extend(Token::fws(2));
            }
            None => {}
        }
        tokens.push(format!("<{}>", self.address).into());
        tokens
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tokens() {
            if let Token::Fragment(fragment) = token {
                f.write_str(&fragment.value())?;
            }
        }
        Ok(())
    }
}

/// An address-list field.
///
/// ```ignore
/// let to = Address::new(AddressField::To, "alice@example.com, Bob <bob@example.com>");
/// assert_eq!(to.render(), "To: <alice@example.com>, \"Bob\" <bob@example.com>\r\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Which field this is.
    pub field: AddressField,
    /// The address list as given.
    pub value: String,
}

impl Address {
    /// Creates an address field.
    #[must_use]
    pub fn new(field: AddressField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// The parsed mailboxes, enforcing the single mailbox of `Sender`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not parse or `Sender` holds more
    /// than one mailbox.
    pub fn mailboxes(&self) -> Result<Vec<Mailbox>> {
        let mailboxes = Mailbox::parse_list(&self.value)?;
        if self.field == AddressField::Sender && mailboxes.len() > 1 {
            return Err(Error::TooManyAddresses(mailboxes.len()));
        }
        Ok(mailboxes)
    }
}

impl HeaderField for Address {
    fn name(&self) -> &str {
        self.field.as_str()
    }

    fn validate(&self) -> Result<()> {
        self.mailboxes()
            .and_then(|mailboxes| mailboxes.iter().try_for_each(Mailbox::check_lengths))
            .map_err(|e| e.in_field(self.name()))
    }

    fn render(&self) -> String {
        let mailboxes = match self.mailboxes() {
            Ok(mailboxes) => mailboxes,
            Err(err) => {
                tracing::debug!(field = self.name(), error = %err, "rendering address list verbatim");
                return raw_line(self.name(), &self.value);
            }
        };
        render_folded(|folder| {
            folder.write([format!("{}:", self.name())]);
            for (i, mailbox) in mailboxes.iter().enumerate() {
                if i > 0 {
                    folder.write([","]);
                }
                folder.write(Token::fws(1));
                folder.write(mailbox.tokens());
            }
        })
        .unwrap_or_else(|| raw_line(self.name(), &self.value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn i(n: usize) -> String {
        "i".repeat(n)
    }

    #[test]
    fn test_render_simple() {
        let cases = [
            (AddressField::From, "addr-name <addr@name.com>", "From: \"addr-name\" <addr@name.com>\r\n"),
            (AddressField::Sender, "addr@example.com", "Sender: <addr@example.com>\r\n"),
            (
                AddressField::ReplyTo,
                "alice@secret.com, Bob <bob@secret.com>",
                "Reply-To: <alice@secret.com>, \"Bob\" <bob@secret.com>\r\n",
            ),
            (
                AddressField::Bcc,
                "Eavesdrop Eve <eve@secret.com>",
                "Bcc: \"Eavesdrop Eve\" <eve@secret.com>\r\n",
            ),
        ];
        for (field, value, expected) in cases {
            let address = Address::new(field, value);
            assert!(address.validate().is_ok(), "{value}");
            assert_eq!(address.render(), expected);
        }
    }

    #[test]
    fn test_fold_after_field_name() {
        let address = Address::new(AddressField::To, format!("<a@{}.com>", i(69)));
        assert_eq!(address.render(), format!("To:\r\n <a@{}.com>\r\n", i(69)));
    }

    #[test]
    fn test_fold_between_mailboxes() {
        let one = format!("<{}@{}>", i(15), i(15));
        let address = Address::new(AddressField::To, format!("{one},{one},{one}"));
        assert_eq!(address.render(), format!("To: {one}, {one},\r\n {one}\r\n"));
    }

    #[test]
    fn test_fold_inside_quoted_name_is_last_resort() {
        let s = "s".repeat(37);
        let address = Address::new(
            AddressField::To,
            format!("\"{}\" <a@b>, \"{s} {s}\" <a@b>", i(55)),
        );
        assert_eq!(
            address.render(),
            format!("To: \"{}\" <a@b>,\r\n \"{s} {s}\"\r\n <a@b>\r\n", i(55))
        );
    }

    #[test]
    fn test_encoded_display_name_splits() {
        let address = Address::new(AddressField::To, format!("\"é{}\" <a@b>", i(61)));
        assert_eq!(
            address.render(),
            format!(
                "To:\r\n =?utf-8?q?=C3=A9{}?=\r\n =?utf-8?q?iiii?= <a@b>\r\n",
                i(57)
            )
        );
    }

    #[test]
    fn test_sender_rejects_lists() {
        let sender = Address::new(AddressField::Sender, "a@b.com, c@d.com");
        let err = sender.validate().unwrap_err();
        assert!(matches!(err.kind(), Error::TooManyAddresses(2)));
        assert!(err.to_string().starts_with("Sender: "));
        assert_eq!(sender.render(), "Sender: a@b.com, c@d.com\r\n");
    }

    #[test]
    fn test_invalid_list_rendered_verbatim() {
        let to = Address::new(AddressField::To, "not an address");
        assert!(to.validate().is_err());
        assert_eq!(to.render(), "To: not an address\r\n");
    }

    #[test]
    fn test_length_limits() {
        let local = Address::new(AddressField::To, format!("{}@example.com", i(65)));
        assert!(matches!(
            local.validate().unwrap_err().kind(),
            Error::AddressPartTooLong { limit: 64, .. }
        ));

        let domain = Address::new(AddressField::To, format!("a@{}", i(256)));
        assert!(matches!(
            domain.validate().unwrap_err().kind(),
            Error::AddressPartTooLong { limit: 255, .. }
        ));

        let ok = Address::new(AddressField::To, format!("{}@example.com", i(64)));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_group_is_flattened() {
        let to = Address::new(AddressField::To, "friends: a@b.com, c@d.com;");
        let mailboxes = to.mailboxes().unwrap();
        assert_eq!(mailboxes.len(), 2);
        assert_eq!(to.render(), "To: <a@b.com>, <c@d.com>\r\n");
    }

    #[test]
    fn test_mailbox_display() {
        let plain = Mailbox::new("a@b.com").unwrap();
        assert_eq!(plain.to_string(), "<a@b.com>");
        let named = Mailbox::with_name("Bob \"B\" Smith", "bob@b.com").unwrap();
        assert_eq!(named.to_string(), "\"Bob \\\"B\\\" Smith\" <bob@b.com>");
        let encoded = Mailbox::with_name("Evé", "e@e.com").unwrap();
        assert_eq!(encoded.to_string(), "=?utf-8?q?Ev=C3=A9?= <e@e.com>");
    }

    #[test]
    fn test_mailbox_parts() {
        let mailbox = Mailbox::new("user@example.com").unwrap();
        assert_eq!(mailbox.local_part(), "user");
        assert_eq!(mailbox.domain(), "example.com");
        assert!(Mailbox::new("nope").is_err());
        assert!(Mailbox::new("@example.com").is_err());
        assert!(Mailbox::new("").is_err());
    }
}
