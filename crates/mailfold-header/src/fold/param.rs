use super::{Fragment, Split};
use crate::codec;
use crate::limits::CHARSET;
use crate::syntax;

/// A MIME parameter, `attribute=value`, as found in `Content-Type` and
/// `Content-Disposition`.
///
/// Values that are neither a token nor a quoted-string, and cannot simply be
/// quoted, switch to the RFC 2231 extended form `attribute*=utf-8''...`.
/// Long values split into numbered continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MimeParam {
    attribute: String,
    value: String,
    priority: u32,
    /// Continuation number for segments after the first. Continuations hold
    /// already dequoted text and always use the extended form.
    section: Option<usize>,
}

impl MimeParam {
    /// Creates a parameter. A `priority` of zero keeps it from ever being split.
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>, priority: u32) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            priority,
            section: None,
        }
    }

    /// Attribute name.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The value as given, before quoting or encoding.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    /// Split priority.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    fn is_empty_value(&self) -> bool {
        self.value.is_empty() || self.value == "\"\""
    }

    /// Whether the value needs the RFC 2231 extended form.
    #[must_use]
    pub fn is_extended(&self) -> bool {
        self.section.is_some()
            || !(self.is_empty_value()
                || syntax::is_mime_token(&self.value)
                || syntax::is_quoted_string(&self.value)
                || syntax::is_quotable(&self.value))
    }

    /// The rendered `attribute=value` text.
    #[must_use]
    pub fn value(&self) -> String {
        let attribute = &self.attribute;
        if let Some(section) = self.section {
            let encoded = codec::percent_encode_param(&self.value);
            return format!("{attribute}*{section}*={encoded}");
        }
        if self.is_extended() {
            let encoded = codec::percent_encode_param(&syntax::dequote(&self.value));
            return format!("{attribute}*={CHARSET}''{encoded}");
        }
        if self.is_empty_value()
            || syntax::is_mime_token(&self.value)
            || syntax::is_quoted_string(&self.value)
        {
            format!("{attribute}={}", self.value)
        } else {
            format!("{attribute}={}", syntax::quote(&self.value))
        }
    }

    /// Rendered length in octets.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.value().len()
    }

    /// Splits into an RFC 2231 continuation segment of at most `budget`
    /// octets and the parameter holding the rest.
    ///
    /// The first segment is `attribute*0*=utf-8''...`, later ones
    /// `attribute*N*=...`. If everything fits in the first segment it
    /// collapses to `attribute*=utf-8''...`. Empty values never split.
    #[must_use]
    pub fn split(&self, budget: usize) -> Option<Split> {
        if self.len() <= budget || self.is_empty_value() {
            return None;
        }
        let (section, remaining) = match self.section {
            Some(section) => (section, self.value.clone()),
            None => (0, syntax::dequote(&self.value)),
        };
        let prefix = if section == 0 {
            format!("{}*0*={CHARSET}''", self.attribute)
        } else {
            format!("{}*{section}*=", self.attribute)
        };
        let room = budget.checked_sub(prefix.len())?;

        let mut used = 0;
        let mut cut = 0;
        for c in remaining.chars() {
            let width = codec::percent_encoded_len(c);
            if used + width > room {
                break;
            }
            used += width;
            cut += c.len_utf8();
        }
        if cut == 0 {
            return None;
        }

        let (head, rest) = remaining.split_at(cut);
        let encoded = codec::percent_encode_param(head);
        if rest.is_empty() && section == 0 {
            return Some(Split {
                head: format!("{}*={CHARSET}''{encoded}", self.attribute),
                tail: None,
            });
        }
        let tail = (!rest.is_empty()).then(|| {
            Fragment::Param(Self {
                attribute: self.attribute.clone(),
                value: rest.to_owned(),
                priority: self.priority,
                section: Some(section + 1),
            })
        });
        Some(Split {
            head: format!("{prefix}{encoded}"),
            tail,
        })
    }
}
