//! Typed user and group records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flattened attributes: each name mapped to its first value.
pub type Attributes = BTreeMap<String, String>;

/// A user entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Distinguished Name.
    pub dn: String,
    /// Value of the configured id attribute, empty if absent.
    pub id: String,
    /// Returned attributes.
    pub attributes: Attributes,
    /// Groups listing this user. Empty when the group search was skipped.
    #[serde(default)]
    pub groups: Vec<UserGroup>,
}

/// A group reference on a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    /// Group DN.
    pub dn: String,
    /// Group id.
    pub id: String,
}

/// A group entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Distinguished Name.
    pub dn: String,
    /// Value of the configured id attribute, empty if absent.
    pub id: String,
    /// Returned attributes.
    pub attributes: Attributes,
    /// Members of the group. Empty when the member search was skipped.
    #[serde(default)]
    pub members: Vec<Member>,
}

/// A member reference on a [`Group`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member DN.
    pub dn: String,
    /// Member id.
    pub id: String,
}

fn string_attribute<'a>(attributes: &'a Attributes, name: &str) -> &'a str {
    attributes
        .get(name)
        .or_else(|| {
            attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map_or("", String::as_str)
}

impl User {
    /// Returns an attribute value, or `""` if absent.
    #[must_use]
    pub fn string_attribute(&self, name: &str) -> &str {
        string_attribute(&self.attributes, name)
    }

    /// Checks the user's groups for a group id.
    #[must_use]
    pub fn is_group_member(&self, group_id: &str) -> bool {
        self.groups.iter().any(|g| g.id == group_id)
    }

    /// Checks the user's groups for a group DN, ignoring ASCII case.
    #[must_use]
    pub fn is_in_group_dn(&self, group_dn: &str) -> bool {
        self.groups.iter().any(|g| g.dn.eq_ignore_ascii_case(group_dn))
    }

    /// Returns the DNs of the user's groups.
    #[must_use]
    pub fn group_dns(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.dn.as_str()).collect()
    }

    /// Returns the ids of the user's groups.
    #[must_use]
    pub fn group_ids(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.id.as_str()).collect()
    }
}

impl Group {
    /// Returns an attribute value, or `""` if absent.
    #[must_use]
    pub fn string_attribute(&self, name: &str) -> &str {
        string_attribute(&self.attributes, name)
    }

    /// Checks the member list for a DN, ignoring ASCII case.
    #[must_use]
    pub fn has_member_dn(&self, dn: &str) -> bool {
        self.members.iter().any(|m| m.dn.eq_ignore_ascii_case(dn))
    }

    /// Returns member DNs in directory order.
    #[must_use]
    pub fn member_dns(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.dn.as_str()).collect()
    }

    /// Returns member ids in directory order.
    #[must_use]
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.id.as_str()).collect()
    }
}
