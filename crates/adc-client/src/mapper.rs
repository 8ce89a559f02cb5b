//! Raw entries to typed records, and back to attribute lists.

use adc_directory::{Attribute, Entry};

use crate::model::{Attributes, Group, Member, User, UserGroup};

/// Maps directory entries to typed records.
///
/// Multi-valued attributes keep their first value only. Relations are not
/// read from the entry; they come from a separate search.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryMapper;

impl EntryMapper {
    /// Maps an entry to a [`User`] with no groups.
    #[must_use]
    pub fn to_user(entry: &Entry, id_attribute: &str) -> User {
        User {
            dn: entry.dn.clone(),
            id: Self::id(entry, id_attribute),
            attributes: Self::flatten(entry),
            groups: Vec::new(),
        }
    }

    /// Maps an entry to a [`Group`] with no members.
    #[must_use]
    pub fn to_group(entry: &Entry, id_attribute: &str) -> Group {
        Group {
            dn: entry.dn.clone(),
            id: Self::id(entry, id_attribute),
            attributes: Self::flatten(entry),
            members: Vec::new(),
        }
    }

    /// Maps a relation search result to a group reference.
    #[must_use]
    pub fn to_user_group(entry: &Entry, id_attribute: &str) -> UserGroup {
        UserGroup {
            dn: entry.dn.clone(),
            id: Self::id(entry, id_attribute),
        }
    }

    /// Maps a relation search result to a member reference.
    #[must_use]
    pub fn to_member(entry: &Entry, id_attribute: &str) -> Member {
        Member {
            dn: entry.dn.clone(),
            id: Self::id(entry, id_attribute),
        }
    }

    /// Returns the first value of the id attribute, or `""`.
    #[must_use]
    pub fn id(entry: &Entry, id_attribute: &str) -> String {
        entry
            .first_value(id_attribute)
            .unwrap_or_default()
            .to_string()
    }

    /// Flattens every attribute to its first value.
    #[must_use]
    pub fn flatten(entry: &Entry) -> Attributes {
        entry
            .attributes
            .iter()
            .map(|a| (a.name.clone(), a.first().unwrap_or_default().to_string()))
            .collect()
    }

    /// Groups `name=value` pairs into attributes.
    ///
    /// Repeated names become one multi-valued attribute. Attributes keep the
    /// order in which their names first appear.
    #[must_use]
    pub fn collect_attributes<I, N, V>(pairs: I) -> Vec<Attribute>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut attributes: Vec<Attribute> = Vec::new();
        for (name, value) in pairs {
            let name = name.into();
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.values.push(value.into()),
                None => attributes.push(Attribute::single(name, value)),
            }
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry::new(
            "OU=user1,DC=company,DC=com",
            vec![
                Attribute::single("sAMAccountName", "user1"),
                Attribute::new("proxyAddresses", ["smtp:a@company.com", "smtp:b@company.com"]),
                Attribute::new("description", Vec::<String>::new()),
            ],
        )
    }

    #[test]
    fn user_keeps_first_values() {
        let user = EntryMapper::to_user(&entry(), "sAMAccountName");

        assert_eq!(user.dn, "OU=user1,DC=company,DC=com");
        assert_eq!(user.id, "user1");
        assert_eq!(user.string_attribute("proxyAddresses"), "smtp:a@company.com");
        assert_eq!(user.attributes.get("description").map(String::as_str), Some(""));
        assert!(user.groups.is_empty());
    }

    #[test]
    fn missing_id_attribute_gives_empty_id() {
        let group = EntryMapper::to_group(&entry(), "cn");
        assert_eq!(group.id, "");
        assert_eq!(group.attributes.len(), 3);
    }

    #[test]
    fn collects_repeated_names() {
        let attributes = EntryMapper::collect_attributes([
            ("objectClass", "top"),
            ("cn", "group3"),
            ("objectClass", "group"),
        ]);

        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].values, vec!["top", "group"]);
        assert_eq!(attributes[1].first(), Some("group3"));
    }
}
