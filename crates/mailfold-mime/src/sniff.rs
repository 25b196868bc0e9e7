//! Content type detection from leading bytes.

use mailfold_header::ContentType;

/// Only this many leading bytes are examined.
const SNIFF_LEN: usize = 512;

/// Tags that mark a document as HTML when followed by space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Exact magic numbers.
const MAGIC: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
];

/// Detects the media type and charset of `data`.
///
/// Returns `("application/octet-stream", None)` when nothing matches.
#[must_use]
pub fn detect_content_type(data: &[u8]) -> (&'static str, Option<&'static str>) {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if data.starts_with(b"\xfe\xff") {
        return ("text/plain", Some("utf-16be"));
    }
    if data.starts_with(b"\xff\xfe") {
        return ("text/plain", Some("utf-16le"));
    }
    if data.starts_with(b"\xef\xbb\xbf") {
        return ("text/plain", Some("utf-8"));
    }

    let trimmed = trim_leading_ws(data);
    if HTML_TAGS.iter().any(|tag| matches_tag(trimmed, tag)) {
        return ("text/html", Some("utf-8"));
    }
    if trimmed.starts_with(b"<?xml") {
        return ("text/xml", Some("utf-8"));
    }
    if let Some((_, media_type)) = MAGIC.iter().find(|(magic, _)| data.starts_with(magic)) {
        return (*media_type, None);
    }
    if data.iter().any(|&b| is_binary(b)) {
        return ("application/octet-stream", None);
    }
    ("text/plain", Some("utf-8"))
}

/// [`detect_content_type`] as a `Content-Type` field.
#[must_use]
pub fn sniff_content_type(data: &[u8]) -> ContentType {
    let (media_type, charset) = detect_content_type(data);
    let (main_type, sub_type) = media_type
        .split_once('/')
        .unwrap_or(("application", "octet-stream"));
    let content_type = ContentType::new(main_type, sub_type);
    match charset {
        Some(charset) => content_type.with_parameter("charset", charset),
        None => content_type,
    }
}

fn trim_leading_ws(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|&b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Case-insensitive prefix match followed by a tag terminator.
fn matches_tag(data: &[u8], tag: &[u8]) -> bool {
    data.len() > tag.len()
        && data[..tag.len()].eq_ignore_ascii_case(tag)
        && matches!(data[tag.len()], b' ' | b'>')
}

/// Control bytes that never appear in text.
const fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html() {
        assert_eq!(
            detect_content_type(b"<b>attack at dawn</b>"),
            ("text/html", Some("utf-8"))
        );
        assert_eq!(
            detect_content_type(b"\r\n  <!doctype html><html></html>"),
            ("text/html", Some("utf-8"))
        );
        assert_eq!(
            detect_content_type(b"<bold>not a tag we know"),
            ("text/plain", Some("utf-8"))
        );
    }

    #[test]
    fn test_magic() {
        assert_eq!(detect_content_type(b"%PDF-1.7\n"), ("application/pdf", None));
        assert_eq!(
            detect_content_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            ("image/png", None)
        );
        assert_eq!(detect_content_type(b"GIF89a\x01\0"), ("image/gif", None));
        assert_eq!(detect_content_type(b"\xff\xd8\xff\xe0"), ("image/jpeg", None));
        assert_eq!(detect_content_type(b"<?xml version=\"1.0\"?>"), ("text/xml", Some("utf-8")));
    }

    #[test]
    fn test_text_and_binary() {
        assert_eq!(detect_content_type(b"Hello World"), ("text/plain", Some("utf-8")));
        assert_eq!(detect_content_type("héllo".as_bytes()), ("text/plain", Some("utf-8")));
        assert_eq!(detect_content_type(b""), ("text/plain", Some("utf-8")));
        assert_eq!(detect_content_type(b"\0\x01\x02"), ("application/octet-stream", None));
    }

    #[test]
    fn test_only_leading_bytes_examined() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0);
        assert_eq!(detect_content_type(&data), ("text/plain", Some("utf-8")));
    }

    #[test]
    fn test_sniff_content_type() {
        assert_eq!(
            sniff_content_type(b"hi").to_string(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(sniff_content_type(b"%PDF-").to_string(), "application/pdf");
    }
}
