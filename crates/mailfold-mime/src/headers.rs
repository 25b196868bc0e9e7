//! Ordered header field collections.

use std::fmt;

use mailfold_header::HeaderField;

/// Header fields of one entity, rendered in insertion order.
///
/// Lookups compare field names case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: Vec<Box<dyn HeaderField>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn add(&mut self, field: impl HeaderField + 'static) {
        self.fields.push(Box::new(field));
    }

    /// Appends an already boxed field.
    pub fn add_boxed(&mut self, field: Box<dyn HeaderField>) {
        self.fields.push(field);
    }

    /// Inserts a field before all others.
    pub fn prepend(&mut self, field: impl HeaderField + 'static) {
        self.fields.insert(0, Box::new(field));
    }

    /// Sets a field, replacing every field of the same name. The new field
    /// takes the place of the first one replaced.
    pub fn set(&mut self, field: impl HeaderField + 'static) {
        let name = field.name().to_owned();
        let position = self.position(&name);
        self.remove(&name);
        let field: Box<dyn HeaderField> = Box::new(field);
        match position {
            Some(index) => self.fields.insert(index, field),
            None => self.fields.push(field),
        }
    }

    /// Gets the first field with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn HeaderField> {
        self.position(name).map(|index| self.fields[index].as_ref())
    }

    /// Gets all fields with this name.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&dyn HeaderField> {
        self.iter()
            .filter(|field| field.name().eq_ignore_ascii_case(name))
            .collect()
    }

    /// Whether a field with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes all fields with this name.
    pub fn remove(&mut self, name: &str) {
        self.fields
            .retain(|field| !field.name().eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all fields.
    pub fn iter(&self) -> impl Iterator<Item = &dyn HeaderField> {
        self.fields.iter().map(AsRef::as_ref)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates every field, collecting the failures.
    #[must_use]
    pub fn validate(&self) -> Vec<mailfold_header::Error> {
        self.iter().filter_map(|field| field.validate().err()).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            f.write_str(&field.render())?;
        }
        Ok(())
    }
}

impl Extend<Box<dyn HeaderField>> for Headers {
    fn extend<I: IntoIterator<Item = Box<dyn HeaderField>>>(&mut self, iter: I) {
        self.fields.extend(iter);
    }
}

impl FromIterator<Box<dyn HeaderField>> for Headers {
    fn from_iter<I: IntoIterator<Item = Box<dyn HeaderField>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Headers {
    type Item = Box<dyn HeaderField>;
    type IntoIter = std::vec::IntoIter<Box<dyn HeaderField>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailfold_header::{Address, AddressField, CustomHeader, MimeVersion, Subject};

    fn sample() -> Headers {
        let mut headers = Headers::new();
        headers.add(Address::new(AddressField::From, "a@a.com"));
        headers.add(Subject::new("Foo Bar"));
        headers.add(CustomHeader::new("X-Tag", "one"));
        headers.add(CustomHeader::new("x-tag", "two"));
        headers
    }

    #[test]
    fn test_render_in_order() {
        let mut headers = sample();
        headers.prepend(MimeVersion);
        assert_eq!(
            headers.to_string(),
            "MIME-Version: 1.0\r\nFrom: <a@a.com>\r\nSubject: Foo Bar\r\nX-Tag: one\r\nx-tag: two\r\n"
        );
    }

    #[test]
    fn test_get_case_insensitive() {
        let headers = sample();
        assert_eq!(headers.get("SUBJECT").unwrap().render(), "Subject: Foo Bar\r\n");
        assert_eq!(headers.get_all("X-TAG").len(), 2);
        assert!(headers.contains("from"));
        assert!(headers.get("Cc").is_none());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut headers = sample();
        headers.set(CustomHeader::new("X-Tag", "three"));
        assert_eq!(headers.len(), 3);
        assert_eq!(
            headers.to_string(),
            "From: <a@a.com>\r\nSubject: Foo Bar\r\nX-Tag: three\r\n"
        );

        headers.set(CustomHeader::new("X-New", "appended"));
        assert_eq!(headers.iter().last().unwrap().name(), "X-New");
    }

    #[test]
    fn test_remove() {
        let mut headers = sample();
        headers.remove("x-tag");
        assert_eq!(headers.len(), 2);
        headers.remove("missing");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut headers = sample();
        assert!(headers.validate().is_empty());
        headers.add(Address::new(AddressField::To, "broken"));
        headers.add(CustomHeader::new("Bad:Name", "x"));
        assert_eq!(headers.validate().len(), 2);
    }

    #[test]
    fn test_collect_and_iterate() {
        let fields: Vec<Box<dyn HeaderField>> =
            vec![Box::new(MimeVersion), Box::new(Subject::new("hi"))];
        let headers: Headers = fields.into_iter().collect();
        let names: Vec<&str> = headers.iter().map(|field| field.name()).collect();
        assert_eq!(names, ["MIME-Version", "Subject"]);
        assert_eq!(headers.into_iter().count(), 2);
    }
}
