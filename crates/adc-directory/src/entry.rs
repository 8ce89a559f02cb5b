//! Directory entries and attribute values.

use serde::{Deserialize, Serialize};

/// A named, multi-valued attribute.
///
/// Used both for attributes read from an entry and for attributes sent
/// with add and modify operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute values, in directory order.
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates an attribute with the given values.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a single-valued attribute.
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![value.into()],
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A read-only snapshot of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Distinguished Name.
    pub dn: String,
    /// Attributes in the order the directory returned them.
    pub attributes: Vec<Attribute>,
}

impl Entry {
    /// Creates an entry.
    pub fn new(dn: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    /// Looks up an attribute by name.
    ///
    /// Attribute names are compared ASCII-case-insensitively, as LDAP does.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Attribute::first)
    }

    /// Gets all values of an attribute (empty if absent).
    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        match self.attribute(name) {
            Some(attribute) => &attribute.values,
            None => &[],
        }
    }

    /// Checks if the entry has an attribute.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

impl From<ldap3::SearchEntry> for Entry {
    fn from(entry: ldap3::SearchEntry) -> Self {
        // ldap3 collects attributes into a map; sort for a stable order.
        let mut attributes: Vec<Attribute> = entry
            .attrs
            .into_iter()
            .map(|(name, values)| Attribute { name, values })
            .collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            dn: entry.dn,
            attributes,
        }
    }
}
