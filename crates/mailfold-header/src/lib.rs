//! # mailfold-header
//!
//! RFC 5322 header rendering with priority-driven line folding.
//!
//! ## Features
//!
//! - **Folding**: Lines kept within 78 octets, breaking at the most natural
//!   place first
//! - **Encoded words**: RFC 2047 `Q` and `B` words, split across lines
//! - **Parameters**: RFC 2231 extended values and continuations
//! - **Fields**: Addresses, subject, dates, message ids, MIME fields and
//!   custom fields, each with grammar validation
//!
//! ## Quick Start
//!
//! ### Rendering Fields
//!
//! ```ignore
//! use mailfold_header::{Address, AddressField, HeaderField, Subject};
//!
//! let to = Address::new(AddressField::To, "Alice <alice@example.com>, bob@example.com");
//! to.validate()?;
//! print!("{}", to.render());
//!
//! let subject = Subject::new("Grüße aus Köln");
//! assert_eq!(
//!     subject.render(),
//!     "Subject: =?utf-8?q?Gr=C3=BC=C3=9Fe_aus_K=C3=B6ln?=\r\n"
//! );
//! ```
//!
//! ### Folding Custom Tokens
//!
//! ```ignore
//! use mailfold_header::fold::{Folder, Token};
//!
//! let mut folder = Folder::new(std::io::stdout());
//! folder.write(["X-Long:"]);
//! for word in words {
//!     folder.write(Token::fws(1));
//!     folder.write([word]);
//! }
//! folder.finish()?;
//! ```
//!
//! ### Decoding
//!
//! ```ignore
//! use mailfold_header::codec::decode_header;
//!
//! assert_eq!(decode_header("=?utf-8?q?caf=C3=A9?="), "café");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;

pub mod codec;
pub mod field;
pub mod fold;
pub mod limits;
pub mod syntax;

pub use error::{Error, Result};
pub use field::{
    Address, AddressField, ContentDisposition, ContentId, ContentTransferEncoding, ContentType,
    CustomHeader, Date, HeaderField, Mailbox, MessageId, MimeVersion, Subject, TransferEncoding,
};
pub use fold::{Folder, Token};
