//! Multipart bodies (RFC 2046 §5.1) and boundary generation.

use std::fmt;

use mailfold_header::ContentType;
use mailfold_header::limits::{MAX_BOUNDARY_LEN, MAX_LINE_LEN};
use rand::Rng;

use crate::entity::{Body, Entity};
use crate::error::{Error, Result};
use crate::headers::Headers;

/// `bcharsnospace`: boundary characters allowed in the last position.
const BCHARS_NO_SPACE: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789'()+_,-./:=?";

/// Generates a boundary of `len` characters, clamped to `1..=70`.
///
/// Any `bchars` character may appear, including space, except in the last
/// position.
#[must_use]
pub fn random_boundary<R: Rng>(rng: &mut R, len: usize) -> String {
    let len = len.clamp(1, MAX_BOUNDARY_LEN);
    let mut boundary = String::with_capacity(len);
    for _ in 1..len {
        // One past the end stands for space.
        let index = rng.gen_range(0..=BCHARS_NO_SPACE.len());
        boundary.push(BCHARS_NO_SPACE.get(index).map_or(' ', |&b| char::from(b)));
    }
    let index = rng.gen_range(0..BCHARS_NO_SPACE.len());
    boundary.push(char::from(BCHARS_NO_SPACE[index]));
    boundary
}

/// Whether `boundary` is 1 to 70 `bchars` not ending in space.
#[must_use]
pub fn is_valid_boundary(boundary: &str) -> bool {
    (1..=MAX_BOUNDARY_LEN).contains(&boundary.len())
        && boundary
            .bytes()
            .all(|b| b == b' ' || BCHARS_NO_SPACE.contains(&b))
        && !boundary.ends_with(' ')
}

/// Boundary length that keeps `Content-Type: multipart/<subtype>;
/// boundary="<boundary>"` on one line.
fn boundary_len(subtype: &str) -> usize {
    let prefix = format!("Content-Type: multipart/{subtype}; boundary=");
    MAX_LINE_LEN
        .saturating_sub(prefix.len())
        .min(MAX_BOUNDARY_LEN)
        .saturating_sub(2)
}

/// A multipart body.
///
/// Renders as `--boundary CRLF part`, then `CRLF --boundary CRLF part` for
/// each further part, closed by `CRLF --boundary--`. No preamble or
/// epilogue is written.
#[derive(Debug, Clone)]
pub struct Multipart {
    subtype: String,
    boundary: String,
    parts: Vec<Entity>,
}

impl Multipart {
    /// Creates a multipart body with a random boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty.
    pub fn new(subtype: impl Into<String>, parts: Vec<Entity>) -> Result<Self> {
        Self::with_rng(subtype, parts, &mut rand::thread_rng())
    }

    /// Creates a multipart body with a boundary drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty.
    pub fn with_rng<R: Rng>(
        subtype: impl Into<String>,
        parts: Vec<Entity>,
        rng: &mut R,
    ) -> Result<Self> {
        let subtype = subtype.into();
        let boundary = random_boundary(rng, boundary_len(&subtype));
        Self::with_boundary(subtype, boundary, parts)
    }

    /// Creates a multipart body with a fixed boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty or the boundary is invalid.
    pub fn with_boundary(
        subtype: impl Into<String>,
        boundary: impl Into<String>,
        parts: Vec<Entity>,
    ) -> Result<Self> {
        let subtype = subtype.into();
        let boundary = boundary.into();
        if parts.is_empty() {
            return Err(Error::InvalidMultipart(format!(
                "multipart/{subtype} needs at least one part"
            )));
        }
        if !is_valid_boundary(&boundary) {
            return Err(Error::InvalidMultipart(format!(
                "invalid boundary {boundary:?}"
            )));
        }
        tracing::debug!(%subtype, parts = parts.len(), "assembled multipart body");
        Ok(Self {
            subtype,
            boundary,
            parts,
        })
    }

    /// `multipart/mixed` with a random boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty.
    pub fn mixed(parts: Vec<Entity>) -> Result<Self> {
        Self::new("mixed", parts)
    }

    /// `multipart/alternative` with a random boundary. Parts go from least
    /// to most preferred.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty.
    pub fn alternative(parts: Vec<Entity>) -> Result<Self> {
        Self::new("alternative", parts)
    }

    /// `multipart/related` with a random boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty.
    pub fn related(parts: Vec<Entity>) -> Result<Self> {
        Self::new("related", parts)
    }

    /// The multipart subtype, e.g. `mixed`.
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The parts.
    #[must_use]
    pub fn parts(&self) -> &[Entity] {
        &self.parts
    }

    /// `multipart/<subtype>; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        ContentType::multipart(self.subtype.as_str(), self.boundary.as_str())
    }

    /// Wraps this body in an entity, appending its `Content-Type` after
    /// `headers`.
    #[must_use]
    pub fn into_entity(self, mut headers: Headers) -> Entity {
        headers.add(self.content_type());
        Entity::with_headers(headers, Body::Multipart(self))
    }
}

impl fmt::Display for Multipart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let boundary = &self.boundary;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str("\r\n")?;
            }
            write!(f, "--{boundary}\r\n{part}")?;
        }
        write!(f, "\r\n--{boundary}--")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn text(content_type: ContentType, data: &str) -> Entity {
        Entity::new(content_type, data)
    }

    fn alternative() -> Vec<Entity> {
        vec![
            text(
                ContentType::new("text", "plain").with_parameter("charset", "us-ascii"),
                "foo bar",
            ),
            text(ContentType::text_html(), "<b>foo bar</b>"),
        ]
    }

    #[test]
    fn test_random_boundary() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [1, 2, 36, 70] {
            let boundary = random_boundary(&mut rng, len);
            assert_eq!(boundary.len(), len);
            assert!(is_valid_boundary(&boundary), "{boundary:?}");
        }
        assert_eq!(random_boundary(&mut rng, 0).len(), 1);
        assert_eq!(random_boundary(&mut rng, 500).len(), 70);
    }

    #[test]
    fn test_boundary_len() {
        assert_eq!(boundary_len("mixed"), 36);
        assert_eq!(boundary_len("alternative"), 30);
        assert_eq!(boundary_len("related"), 34);
        assert_eq!(boundary_len(&"x".repeat(80)), 0);
    }

    #[test]
    fn test_is_valid_boundary() {
        assert!(is_valid_boundary("simple boundary"));
        assert!(is_valid_boundary("'()+_,-./:=?"));
        assert!(!is_valid_boundary(""));
        assert!(!is_valid_boundary("trailing "));
        assert!(!is_valid_boundary("semi;colon"));
        assert!(!is_valid_boundary(&"b".repeat(71)));
    }

    #[test]
    fn test_render() {
        let multipart = Multipart::with_boundary("alternative", "b1", alternative()).unwrap();
        let entity = multipart.into_entity(Headers::new());
        assert_eq!(
            entity.to_string(),
            "Content-Type: multipart/alternative; boundary=b1\r\n\
             \r\n\
             --b1\r\n\
             Content-Type: text/plain; charset=us-ascii\r\n\
             \r\n\
             foo bar\r\n\
             --b1\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             \r\n\
             <b>foo bar</b>\r\n\
             --b1--"
        );
    }

    #[test]
    fn test_nested() {
        let inner = Multipart::with_boundary("alternative", "inner", alternative())
            .unwrap()
            .into_entity(Headers::new());
        let outer = Multipart::with_boundary("mixed", "outer", vec![inner.clone()])
            .unwrap()
            .into_entity(Headers::new());
        assert_eq!(
            outer.to_string(),
            format!(
                "Content-Type: multipart/mixed; boundary=outer\r\n\r\n--outer\r\n{inner}\r\n--outer--"
            )
        );
    }

    #[test]
    fn test_random_boundary_fits_header_line() {
        let mut rng = StdRng::seed_from_u64(42);
        for subtype in ["mixed", "alternative", "related"] {
            let multipart = Multipart::with_rng(subtype, alternative(), &mut rng).unwrap();
            assert_eq!(multipart.boundary().len(), boundary_len(subtype));
            let entity = multipart.into_entity(Headers::new());
            let rendered = entity.to_string();
            let header = rendered.split("\r\n").next().unwrap();
            assert!(header.len() <= 78, "{header}");
        }
    }

    #[test]
    fn test_seeded_boundary_is_reproducible() {
        let a = Multipart::with_rng("mixed", alternative(), &mut StdRng::seed_from_u64(1)).unwrap();
        let b = Multipart::with_rng("mixed", alternative(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a.boundary(), b.boundary());
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert!(matches!(
            Multipart::mixed(Vec::new()),
            Err(Error::InvalidMultipart(_))
        ));
        assert!(Multipart::with_boundary("mixed", "bad;", alternative()).is_err());
    }
}
