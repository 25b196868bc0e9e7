//! Protocol limits and fixed tokens shared by the renderers.

/// Maximum octets on a physical header line, excluding the CRLF (RFC 5322 §2.1.1).
pub const MAX_LINE_LEN: usize = 78;

/// Maximum octets in a single encoded word (RFC 2047 §2).
pub const MAX_ENCODED_WORD_LEN: usize = 75;

/// Octets an encoded word spends on `=?utf-8?q?` and `?=`.
pub const ENCODED_WORD_OVERHEAD: usize = 12;

/// Charset declared by encoded words and extended parameters.
pub const CHARSET: &str = "utf-8";

/// Line terminator.
pub const CRLF: &str = "\r\n";

/// Soft line break inserted when folding.
pub const FOLD: &str = "\r\n ";

/// Priority of the gaps between adjacent encoded words found in literal text.
pub const LEAST_PRIORITY: u32 = u32::MAX;

/// Local-part limit (RFC 5321 §4.5.3.1.1).
pub const MAX_LOCAL_PART_LEN: usize = 64;

/// Domain limit (RFC 5321 §4.5.3.1.2).
pub const MAX_DOMAIN_LEN: usize = 255;

/// Longest msg-id. A msg-id may only be folded before it, so it must fit on a
/// continuation line.
pub const MAX_MSG_ID_LEN: usize = MAX_LINE_LEN - 1;

/// Longest field name, leaving room for the colon.
pub const MAX_FIELD_NAME_LEN: usize = MAX_LINE_LEN - 1;

/// Longest multipart boundary (RFC 2046 §5.1.1).
pub const MAX_BOUNDARY_LEN: usize = 70;

/// Encoded body line length for base64 and quoted-printable (RFC 2045 §6).
pub const BODY_LINE_LEN: usize = 76;

/// Longest line a `7bit` body may carry (RFC 5322 §2.1.1).
pub const MAX_BODY_LINE_LEN: usize = 998;
