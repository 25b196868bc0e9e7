//! Encoders and decoders for header and body text.
//!
//! Covers RFC 2047 encoded words, RFC 2231 parameter values and the RFC 2045
//! body transfer encodings.

use std::borrow::Cow;
use std::fmt::Write as _;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::{Error, Result};
use crate::limits::{
    BODY_LINE_LEN, CHARSET, CRLF, ENCODED_WORD_OVERHEAD, MAX_BODY_LINE_LEN, MAX_ENCODED_WORD_LEN,
};

/// Encoding applied to the text of an RFC 2047 encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WordEncoding {
    /// The "Q" encoding, a header-safe variant of quoted-printable.
    #[default]
    Q,
    /// The "B" encoding, identical to base64.
    B,
}

impl WordEncoding {
    /// The lowercase letter naming this encoding in an encoded word.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Q => 'q',
            Self::B => 'b',
        }
    }

    /// Octets `c` occupies in encoded text. Only meaningful for Q; B text is
    /// sized in whole groups by [`Self::fitting_prefix`].
    #[must_use]
    pub const fn char_len(self, c: char) -> usize {
        match self {
            Self::Q if is_q_literal(c) => 1,
            Self::Q => 3 * c.len_utf8(),
            Self::B => c.len_utf8(),
        }
    }

    /// Byte length of the longest prefix of `text` whose encoded text fits in
    /// `capacity` octets. The prefix never ends inside a multibyte character.
    #[must_use]
    pub fn fitting_prefix(self, text: &str, capacity: usize) -> usize {
        let budget = match self {
            Self::Q => capacity,
            Self::B => capacity / 4 * 3,
        };
        let mut used = 0;
        let mut cut = 0;
        for c in text.chars() {
            let cost = self.char_len(c);
            if used + cost > budget {
                break;
            }
            used += cost;
            cut += c.len_utf8();
        }
        cut
    }

    /// Length of the encoded text for `text`, excluding delimiters.
    #[must_use]
    pub fn encoded_text_len(self, text: &str) -> usize {
        match self {
            Self::Q => text.chars().map(|c| self.char_len(c)).sum(),
            Self::B => text.len().div_ceil(3) * 4,
        }
    }
}

const fn is_q_literal(c: char) -> bool {
    matches!(c, ' '..='~') && !matches!(c, '=' | '?' | '_')
}

/// Whether `text` has to be carried in encoded words: anything outside
/// printable US-ASCII other than tab.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.bytes()
        .any(|b| (b < b' ' && b != b'\t') || b > b'~')
}

/// Encodes `text` as one encoded word, whatever its length.
#[must_use]
pub fn encode_word(text: &str, encoding: WordEncoding) -> String {
    let mut out =
        String::with_capacity(ENCODED_WORD_OVERHEAD + encoding.encoded_text_len(text));
    out.push_str("=?");
    out.push_str(CHARSET);
    out.push('?');
    out.push(encoding.letter());
    out.push('?');
    match encoding {
        WordEncoding::Q => {
            for b in text.bytes() {
                match b {
                    b' ' => out.push('_'),
                    b'!'..=b'~' if !matches!(b, b'=' | b'?' | b'_') => out.push(char::from(b)),
                    _ => {
                        let _ = write!(out, "={b:02X}");
                    }
                }
            }
        }
        WordEncoding::B => out.push_str(&STANDARD.encode(text)),
    }
    out.push_str("?=");
    out
}

/// Encodes `text` as space-separated encoded words of at most 75 octets each.
///
/// Empty input yields an empty string.
#[must_use]
pub fn encode_words(text: &str, encoding: WordEncoding) -> String {
    chunk_words(text, encoding)
        .map(|chunk| encode_word(chunk, encoding))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Length of [`encode_words`] output, without building it.
#[must_use]
pub fn encoded_words_len(text: &str, encoding: WordEncoding) -> usize {
    chunk_words(text, encoding)
        .enumerate()
        .map(|(i, chunk)| {
            usize::from(i > 0) + ENCODED_WORD_OVERHEAD + encoding.encoded_text_len(chunk)
        })
        .sum()
}

fn chunk_words(text: &str, encoding: WordEncoding) -> impl Iterator<Item = &str> {
    let capacity = MAX_ENCODED_WORD_LEN - ENCODED_WORD_OVERHEAD;
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        // A single character always fits in an empty word.
        let cut = encoding.fitting_prefix(rest, capacity).max(
            rest.chars().next().map_or(rest.len(), char::len_utf8),
        );
        let (chunk, tail) = rest.split_at(cut);
        rest = tail;
        Some(chunk)
    })
}

/// Recognizes a single `=?utf-8?q?...?=` or `=?utf-8?b?...?=` encoded word
/// and returns its encoding and decoded text.
///
/// `us-ascii` is accepted as a subset of UTF-8. Returns `None` for anything
/// else, including words whose payload is not valid UTF-8.
#[must_use]
pub fn parse_encoded_word(word: &str) -> Option<(WordEncoding, String)> {
    let inner = word.strip_prefix("=?")?.strip_suffix("?=")?;
    let mut parts = inner.splitn(3, '?');
    let charset = parts.next()?;
    let encoding = parts.next()?;
    let text = parts.next()?;
    if !(charset.eq_ignore_ascii_case(CHARSET) || charset.eq_ignore_ascii_case("us-ascii")) {
        return None;
    }
    if text.contains('?') || text.bytes().any(|b| !crate::syntax::is_vchar(b)) {
        return None;
    }
    match encoding {
        "q" | "Q" => decode_q(text).map(|decoded| (WordEncoding::Q, decoded)),
        "b" | "B" => STANDARD
            .decode(text)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(|decoded| (WordEncoding::B, decoded)),
        _ => None,
    }
}

fn decode_q(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => out.push(b' '),
            b'=' => {
                let hex = text.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 2;
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8(out).ok()
}

/// Decodes a single encoded word.
///
/// # Errors
///
/// Returns an error if `word` is not a well-formed UTF-8 encoded word.
pub fn decode_encoded_word(word: &str) -> Result<String> {
    parse_encoded_word(word)
        .map(|(_, decoded)| decoded)
        .ok_or_else(|| Error::InvalidEncoding(format!("not an encoded word: {word:?}")))
}

/// Removes folding: every CRLF immediately followed by white space.
#[must_use]
pub fn unfold(value: &str) -> Cow<'_, str> {
    if value.contains("\r\n") {
        Cow::Owned(value.replace("\r\n ", " ").replace("\r\n\t", "\t"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Unfolds a header body and decodes its encoded words.
///
/// White space between two adjacent encoded words is dropped. Words that
/// look encoded but do not decode are kept verbatim.
#[must_use]
pub fn decode_header(value: &str) -> String {
    let unfolded = unfold(value);
    let mut out = String::with_capacity(unfolded.len());
    let mut prev_encoded = false;
    let mut rest: &str = &unfolded;
    while !rest.is_empty() {
        let ws_end = rest.find(|c: char| c != ' ' && c != '\t').unwrap_or(rest.len());
        let (ws, tail) = rest.split_at(ws_end);
        if tail.is_empty() {
            out.push_str(ws);
            break;
        }
        let word_end = tail.find([' ', '\t']).unwrap_or(tail.len());
        let (word, tail) = tail.split_at(word_end);
        rest = tail;
        if let Some((_, decoded)) = parse_encoded_word(word) {
            if !prev_encoded {
                out.push_str(ws);
            }
            out.push_str(&decoded);
            prev_encoded = true;
        } else {
            out.push_str(ws);
            out.push_str(word);
            prev_encoded = false;
        }
    }
    out
}

/// Octets percent-encoded in RFC 2231 extended values: everything outside
/// `attribute-char`.
const ATTRIBUTE_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'*')
    .add(b'\'')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'@')
    .add(b',')
    .add(b';')
    .add(b':')
    .add(b'\\')
    .add(b'"')
    .add(b'/')
    .add(b'[')
    .add(b']')
    .add(b'?')
    .add(b'=');

/// Percent-encodes a parameter value for an RFC 2231 extended parameter.
#[must_use]
pub fn percent_encode_param(value: &str) -> String {
    utf8_percent_encode(value, ATTRIBUTE_ESCAPES).to_string()
}

/// Octets `c` occupies once percent-encoded.
#[must_use]
pub fn percent_encoded_len(c: char) -> usize {
    let mut buf = [0; 4];
    utf8_percent_encode(c.encode_utf8(&mut buf), ATTRIBUTE_ESCAPES)
        .map(str::len)
        .sum()
}

/// Decodes a percent-encoded RFC 2231 value.
///
/// # Errors
///
/// Returns an error if the decoded octets are not UTF-8.
pub fn percent_decode_param(value: &str) -> Result<String> {
    percent_decode_str(value)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| Error::InvalidEncoding(format!("invalid percent-encoded UTF-8: {e}")))
}

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 wrapped at 76 columns with CRLF.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BODY_LINE_LEN * 2);
    let mut rest = encoded.as_str();
    while rest.len() > BODY_LINE_LEN {
        let (line, tail) = rest.split_at(BODY_LINE_LEN);
        out.push_str(line);
        out.push_str(CRLF);
        rest = tail;
    }
    out.push_str(rest);
    out
}

/// Decodes Base64 data, ignoring line breaks.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact).map_err(Into::into)
}

/// Whether `text` can go out as a `7bit` body: US-ASCII without NUL, bare
/// CR or LF, and no line longer than 998 octets.
#[must_use]
pub fn is_7bit_safe(text: &str) -> bool {
    text.split('\n').all(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.len() <= MAX_BODY_LINE_LEN
            && line.bytes().all(|b| b != 0 && b != b'\r' && b.is_ascii())
    })
}

/// Encodes text using Quoted-Printable (RFC 2045 §6.7).
///
/// Line breaks in the input become hard CRLF breaks; soft breaks keep every
/// encoded line within 76 octets.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str(CRLF);
        }
        encode_qp_line(line.strip_suffix('\r').unwrap_or(line), &mut out);
    }
    out
}

fn encode_qp_line(line: &str, out: &mut String) {
    let bytes = line.as_bytes();
    let mut column = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let last = i + 1 == bytes.len();
        // Trailing white space would be stripped in transit.
        let literal = matches!(b, b'!'..=b'<' | b'>'..=b'~') || (!last && matches!(b, b' ' | b'\t'));
        let width = if literal { 1 } else { 3 };
        let limit = if last { BODY_LINE_LEN } else { BODY_LINE_LEN - 1 };
        if column + width > limit {
            out.push_str("=\r\n");
            column = 0;
        }
        if literal {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "={b:02X}");
        }
        column += width;
    }
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences or the
/// decoded octets are not UTF-8.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'=' {
            result.push(bytes[i]);
            i += 1;
            continue;
        }
        let rest = &text[i + 1..];
        if rest.starts_with("\r\n") {
            i += 3;
        } else if rest.starts_with('\n') {
            i += 2;
        } else {
            let hex = rest
                .get(..2)
                .ok_or_else(|| Error::InvalidEncoding("incomplete escape sequence".to_string()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|e| Error::InvalidEncoding(format!("invalid hex: {e}")))?;
            result.push(byte);
            i += 3;
        }
    }
    String::from_utf8(result).map_err(Into::into)
}
