//! # mailfold-mime
//!
//! MIME entity assembly on top of `mailfold-header`.
//!
//! ## Features
//!
//! - **Entities**: Header blocks and bodies rendered with CRLF line endings
//! - **Multipart**: Mixed, alternative and related bodies with random
//!   boundaries sized to keep the `Content-Type` line unfolded
//! - **Attachments**: Base64 parts with sniffed content types, inline or not
//! - **Messages**: [`Email`] picks the multipart layout from what is present
//!
//! ## Quick Start
//!
//! ### Building a Message
//!
//! ```ignore
//! use mailfold_mime::{Attachment, Email};
//!
//! let mut email = Email::new();
//! email.from = "sender@example.com".into();
//! email.to = "recipient@example.com".into();
//! email.subject = "Quarterly report".into();
//! email.body = "Please find the report attached.".into();
//! email.attach(Attachment::from_file("report.pdf")?);
//!
//! print!("{}", email.raw()?);
//! ```
//!
//! ### Assembling Entities Directly
//!
//! ```ignore
//! use mailfold_mime::{Entity, Headers, Multipart};
//! use mailfold_mime::header::ContentType;
//!
//! let alternative = Multipart::alternative(vec![
//!     Entity::new(ContentType::text_plain(), "Hello"),
//!     Entity::new(ContentType::text_html(), "<p>Hello</p>"),
//! ])?;
//! let entity = alternative.into_entity(Headers::new());
//! ```
//!
//! ### Content Sniffing
//!
//! ```ignore
//! use mailfold_mime::detect_content_type;
//!
//! assert_eq!(detect_content_type(b"%PDF-1.7"), ("application/pdf", None));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod email;
mod entity;
mod error;
mod headers;
mod sniff;

pub mod multipart;

pub use mailfold_header as header;

pub use attachment::Attachment;
pub use email::Email;
pub use entity::{Body, Entity};
pub use error::{Error, Result};
pub use headers::Headers;
pub use multipart::Multipart;
pub use sniff::{detect_content_type, sniff_content_type};
