//! Priority-driven line folding.
//!
//! A header is written to a [`Folder`] as a stream of [`Token`]s: fragments
//! of text interleaved with priority markers. Markers are the places a line
//! may break; lower numbers are preferred, zero never breaks. When a line
//! would exceed 78 octets the folder breaks at the best legal marker, or
//! splits a [`WordEncodable`] or [`MimeParam`] fragment across lines.
//!
//! ```ignore
//! use mailfold_header::fold::{Folder, Token};
//! use mailfold_header::tokens;
//!
//! let mut folder = Folder::new(Vec::new());
//! folder.write(tokens!["Subject:", 1, " ", "hello"]);
//! let raw = folder.finish()?;
//! assert_eq!(raw, b"Subject: hello\r\n");
//! ```

mod folder;
mod fragment;
mod param;
mod word;

pub use folder::Folder;
pub use fragment::{Fragment, Split};
pub use param::MimeParam;
pub use word::WordEncodable;

/// One element of the stream written to a [`Folder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A place the line may break; lower values are preferred.
    Priority(u32),
    /// Header text.
    Fragment(Fragment),
}

impl Token {
    /// Folding white space: a single space preceded by a break opportunity.
    #[must_use]
    pub fn fws(priority: u32) -> [Self; 2] {
        [Self::Priority(priority), Self::Fragment(Fragment::from(" "))]
    }
}

impl From<u32> for Token {
    fn from(priority: u32) -> Self {
        Self::Priority(priority)
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::Fragment(text.into())
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self::Fragment(text.into())
    }
}

impl From<Fragment> for Token {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<WordEncodable> for Token {
    fn from(word: WordEncodable) -> Self {
        Self::Fragment(word.into())
    }
}

impl From<MimeParam> for Token {
    fn from(param: MimeParam) -> Self {
        Self::Fragment(param.into())
    }
}

/// Builds a token array from mixed priorities, strings, words and params.
///
/// ```ignore
/// folder.write(tokens!["To:", 1, " ", "<a@b>"]);
/// ```
#[macro_export]
macro_rules! tokens {
    ($($token:expr),+ $(,)?) => {
        [$($crate::fold::Token::from($token)),+]
    };
}
