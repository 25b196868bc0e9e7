use std::borrow::Cow;

use super::{Fragment, Split};
use crate::codec::{self, WordEncoding};
use crate::limits::{ENCODED_WORD_OVERHEAD, MAX_ENCODED_WORD_LEN};

/// Text that may be carried in RFC 2047 encoded words.
///
/// Renders as-is while it is plain printable ASCII, unless encoding is
/// forced. Splitting always produces encoded words so that decoders can
/// rejoin the pieces without inserting white space.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordEncodable {
    decoded: String,
    encoding: WordEncoding,
    must_encode: bool,
    priority: u32,
}

impl WordEncodable {
    /// Creates a word over `decoded` text.
    ///
    /// A `priority` of zero keeps the word from ever being split.
    #[must_use]
    pub fn new(
        decoded: impl Into<String>,
        encoding: WordEncoding,
        must_encode: bool,
        priority: u32,
    ) -> Self {
        Self {
            decoded: decoded.into(),
            encoding,
            must_encode,
            priority,
        }
    }

    /// Rebuilds a forced word from a literal encoded word.
    #[must_use]
    pub fn from_encoded_word(word: &str) -> Option<Self> {
        let (encoding, decoded) = codec::parse_encoded_word(word)?;
        Some(Self::new(
            decoded,
            encoding,
            true,
            crate::limits::LEAST_PRIORITY,
        ))
    }

    /// The unencoded text.
    #[must_use]
    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    /// The encoding used when encoding applies.
    #[must_use]
    pub const fn encoding(&self) -> WordEncoding {
        self.encoding
    }

    /// Split priority.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    /// Whether the rendered value is encoded words rather than raw text.
    #[must_use]
    pub fn is_encoded(&self) -> bool {
        self.must_encode || codec::needs_encoding(&self.decoded)
    }

    /// The rendered text.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        if self.is_encoded() {
            Cow::Owned(codec::encode_words(&self.decoded, self.encoding))
        } else {
            Cow::Borrowed(&self.decoded)
        }
    }

    /// Rendered length in octets.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_encoded() {
            codec::encoded_words_len(&self.decoded, self.encoding)
        } else {
            self.decoded.len()
        }
    }

    /// Whether the word renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }

    /// Splits off a single encoded word of at most `budget` octets.
    ///
    /// Returns `None` if the word fits already, if not even the encoded-word
    /// delimiters fit, or if the first character does not fit.
    #[must_use]
    pub fn split(&self, budget: usize) -> Option<Split> {
        if self.len() <= budget {
            return None;
        }
        let limit = budget.min(MAX_ENCODED_WORD_LEN);
        let capacity = limit
            .checked_sub(ENCODED_WORD_OVERHEAD)
            .filter(|capacity| *capacity > 0)?;
        let cut = self.encoding.fitting_prefix(&self.decoded, capacity);
        if cut == 0 {
            return None;
        }
        let (head, rest) = self.decoded.split_at(cut);
        let tail = (!rest.is_empty()).then(|| {
            Fragment::Word(Self {
                decoded: rest.to_owned(),
                encoding: self.encoding,
                must_encode: true,
                priority: self.priority,
            })
        });
        Some(Split {
            head: codec::encode_word(head, self.encoding),
            tail,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_passes_through() {
        let word = WordEncodable::new("foo bar", WordEncoding::Q, false, 2);
        assert!(!word.is_encoded());
        assert_eq!(word.value(), "foo bar");
        assert_eq!(word.len(), 7);
    }

    #[test]
    fn test_non_ascii_is_encoded() {
        let word = WordEncodable::new("éve", WordEncoding::Q, false, 2);
        assert!(word.is_encoded());
        assert_eq!(word.value(), "=?utf-8?q?=C3=A9ve?=");
        assert_eq!(word.len(), word.value().len());
    }

    #[test]
    fn test_split_q() {
        let word = WordEncodable::new("foo bar", WordEncoding::Q, true, 2);
        let split = word.split(13).unwrap();
        assert_eq!(split.head, "=?utf-8?q?f?=");
        assert_eq!(split.tail.unwrap().value(), "=?utf-8?q?oo_bar?=");
    }

    #[test]
    fn test_split_keeps_multibyte_whole() {
        let word = WordEncodable::new("éoo", WordEncoding::Q, true, 2);
        let split = word.split(18).unwrap();
        assert_eq!(split.head, "=?utf-8?q?=C3=A9?=");
        assert_eq!(split.tail.unwrap().value(), "=?utf-8?q?oo?=");
        assert!(word.split(17).is_none());
    }

    #[test]
    fn test_split_b() {
        let word = WordEncodable::new("foo bar", WordEncoding::B, true, 2);
        let split = word.split(16).unwrap();
        assert_eq!(split.head, "=?utf-8?b?Zm9v?=");
        assert_eq!(split.tail.unwrap().value(), "=?utf-8?b?IGJhcg==?=");
        assert!(word.split(9).is_none());
    }

    #[test]
    fn test_split_caps_word_length() {
        let word = WordEncodable::new("i".repeat(200), WordEncoding::Q, false, 2);
        let split = word.split(500);
        assert!(split.is_none(), "fits within the budget");

        let split = word.split(100).unwrap();
        assert_eq!(split.head.len(), 75);
    }

    #[test]
    fn test_split_not_needed_when_fitting() {
        let word = WordEncodable::new("a\u{1}", WordEncoding::Q, false, 2);
        assert_eq!(word.len(), 16);
        let split = word.split(16);
        assert!(split.is_none());
        assert!(WordEncodable::new("", WordEncoding::Q, true, 2).split(0).is_none());
    }

    #[test]
    fn test_from_encoded_word() {
        let word = WordEncodable::from_encoded_word("=?utf-8?b?Zm9v?=").unwrap();
        assert_eq!(word.decoded(), "foo");
        assert_eq!(word.encoding(), WordEncoding::B);
        assert!(word.is_encoded());
        assert!(WordEncodable::from_encoded_word("foo").is_none());
    }
}
