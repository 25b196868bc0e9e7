//! Fragments: the pieces of header text the folder lays out.

use std::borrow::Cow;

use super::{MimeParam, WordEncodable};
use crate::codec;
use crate::limits::LEAST_PRIORITY;

/// A piece of header text.
///
/// Text is emitted verbatim. Words and parameters know how to render
/// themselves and how to split when they do not fit on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text.
    Text(String),
    /// Text that may be carried in RFC 2047 encoded words.
    Word(WordEncodable),
    /// A MIME parameter that may be split into RFC 2231 continuations.
    Param(MimeParam),
}

/// Result of splitting a fragment to fit a line budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Text for the current line, no longer than the budget.
    pub head: String,
    /// What continues on the next line, if anything is left.
    pub tail: Option<Fragment>,
}

impl Fragment {
    /// The rendered text.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Word(word) => word.value(),
            Self::Param(param) => Cow::Owned(param.value()),
        }
    }

    /// Rendered length in octets.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Word(word) => word.len(),
            Self::Param(param) => param.len(),
        }
    }

    /// Whether this fragment renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split priority; zero means the fragment never splits.
    ///
    /// Literal text splits only when it is itself an encoded word, and then
    /// only as a last resort.
    #[must_use]
    pub fn priority(&self) -> u32 {
        match self {
            Self::Text(text) if codec::parse_encoded_word(text).is_some() => LEAST_PRIORITY,
            Self::Text(_) => 0,
            Self::Word(word) => word.priority(),
            Self::Param(param) => param.priority(),
        }
    }

    /// Splits so the head is at most `budget` octets.
    ///
    /// Returns `None` when the fragment fits already or cannot be split that
    /// small.
    #[must_use]
    pub fn split(&self, budget: usize) -> Option<Split> {
        match self {
            Self::Text(text) => WordEncodable::from_encoded_word(text)?.split(budget),
            Self::Word(word) => word.split(budget),
            Self::Param(param) => param.split(budget),
        }
    }

    /// Whether the rendered text has anything other than white space.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.value().bytes().any(|b| !crate::syntax::is_wsp(b))
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<WordEncodable> for Fragment {
    fn from(word: WordEncodable) -> Self {
        Self::Word(word)
    }
}

impl From<MimeParam> for Fragment {
    fn from(param: MimeParam) -> Self {
        Self::Param(param)
    }
}
