//! Character classes and small grammar productions from RFC 5322 and RFC 2045.
//!
//! All predicates work on octets; anything outside US-ASCII fails the
//! ASCII-only productions.

/// `VCHAR = %d33-126`
#[must_use]
pub const fn is_vchar(b: u8) -> bool {
    matches!(b, b'!'..=b'~')
}

/// `WSP = SP / HTAB`
#[must_use]
pub const fn is_wsp(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

/// RFC 5322 `specials`.
#[must_use]
pub const fn is_special(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b':' | b';' | b'@' | b'\\' | b',' | b'.' | b'"'
    )
}

/// `atext`: any VCHAR that is not a special.
#[must_use]
pub const fn is_atext(b: u8) -> bool {
    is_vchar(b) && !is_special(b)
}

/// `dtext = %d33-90 / %d94-126`
#[must_use]
pub const fn is_dtext(b: u8) -> bool {
    is_vchar(b) && !matches!(b, b'[' | b']' | b'\\')
}

/// RFC 2045 `tspecials`.
#[must_use]
pub const fn is_tspecial(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'[' | b']' | b'?' | b'='
    )
}

/// `dot-atom-text = 1*atext *("." 1*atext)`
#[must_use]
pub fn is_dot_atom_text(s: &str) -> bool {
    !s.is_empty()
        && s
            .split('.')
            .all(|atom| !atom.is_empty() && atom.bytes().all(is_atext))
}

/// `no-fold-literal = "[" *dtext "]"`
#[must_use]
pub fn is_no_fold_literal(s: &str) -> bool {
    s.strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .is_some_and(|inner| inner.bytes().all(is_dtext))
}

/// `msg-id = "<" id-left "@" id-right ">"`
///
/// An empty id-right is accepted, so `<x@>` is a valid id.
#[must_use]
pub fn is_msg_id(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('<').and_then(|s| s.strip_suffix('>')) else {
        return false;
    };
    let Some((left, right)) = inner.split_once('@') else {
        return false;
    };
    is_dot_atom_text(left)
        && (right.is_empty() || is_dot_atom_text(right) || is_no_fold_literal(right))
}

/// RFC 2045 `token`: one or more VCHARs, none of them tspecials.
#[must_use]
pub fn is_mime_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| is_vchar(b) && !is_tspecial(b))
}

/// Whether `s` contains at least one tspecial.
#[must_use]
pub fn contains_tspecials(s: &str) -> bool {
    s.bytes().any(is_tspecial)
}

/// RFC 5322 `quoted-string` without surrounding CFWS.
#[must_use]
pub fn is_quoted_string(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return false;
    };
    let mut bytes = inner.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => match bytes.next() {
                Some(escaped) if is_vchar(escaped) || is_wsp(escaped) => {}
                _ => return false,
            },
            b'"' => return false,
            _ if is_vchar(b) || is_wsp(b) => {}
            _ => return false,
        }
    }
    true
}

/// Whether `s` can be wrapped in double quotes, escaping `"` and `\`, to form
/// a quoted-string.
#[must_use]
pub fn is_quotable(s: &str) -> bool {
    s.bytes().all(|b| is_vchar(b) || is_wsp(b))
}

/// Wraps `s` in double quotes, escaping `"` and `\`.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Removes the quotes and backslash escapes of a quoted-string, returning
/// any other input unchanged.
#[must_use]
pub fn dequote(s: &str) -> String {
    if !is_quoted_string(s) {
        return s.to_owned();
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// `ftext = %d33-57 / %d59-126`, one or more.
#[must_use]
pub fn is_ftext(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| is_vchar(b) && b != b':')
}

/// Whether `s` is printable text or white space, and so may be carried in
/// encoded words. Line breaks and other controls are rejected.
#[must_use]
pub fn is_word_encodable(s: &str) -> bool {
    s.chars()
        .all(|c| c == '\t' || c == ' ' || !(c.is_control() || c.is_whitespace()))
}
