//! Lookup and listing requests.
//!
//! ## Security
//!
//! Ids and DNs are escaped before they are substituted into filter
//! templates. An explicit filter is used as given; the caller owns its
//! escaping.

use adc_directory::render_escaped;
use serde::{Deserialize, Serialize};

use crate::config::EntityConfig;
use crate::error::{ClientError, ClientResult};

/// How a point lookup selects its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lookup {
    /// Entity id.
    pub id: String,
    /// Entity DN. Takes precedence over `id`.
    pub dn: String,
    /// Raw filter. Takes precedence over `dn` and `id`.
    pub filter: String,
    /// Attributes overriding the configured list.
    pub attributes: Option<Vec<String>>,
}

impl Lookup {
    /// Rejects a lookup with no id, DN or filter.
    pub fn validate(&self) -> ClientResult<()> {
        if self.id.is_empty() && self.dn.is_empty() && self.filter.is_empty() {
            return Err(ClientError::validation("neither of id, dn or filter provided"));
        }
        Ok(())
    }

    /// Builds the search filter: filter, then DN, then id.
    #[must_use]
    pub fn filter(&self, entity: &EntityConfig) -> String {
        if !self.filter.is_empty() {
            self.filter.clone()
        } else if !self.dn.is_empty() {
            render_escaped(&entity.filter_by_dn, &self.dn)
        } else {
            render_escaped(&entity.filter_by_id, &self.id)
        }
    }

    /// Returns the attributes to request.
    #[must_use]
    pub fn attributes(&self, entity: &EntityConfig) -> Vec<String> {
        self.attributes
            .clone()
            .unwrap_or_else(|| entity.attributes.clone())
    }

    /// Describes the lookup target for errors and logs.
    #[must_use]
    pub fn target(&self) -> &str {
        [&self.filter, &self.dn, &self.id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or("", String::as_str)
    }
}

/// User lookup request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserQuery {
    /// Entry selection.
    #[serde(flatten)]
    pub lookup: Lookup,
    /// Skips the search for the user's groups.
    pub skip_groups_search: bool,
}

impl UserQuery {
    /// Looks up by id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::from(Lookup {
            id: id.into(),
            ..Lookup::default()
        })
    }

    /// Looks up by DN.
    pub fn by_dn(dn: impl Into<String>) -> Self {
        Self::from(Lookup {
            dn: dn.into(),
            ..Lookup::default()
        })
    }

    /// Looks up by raw filter.
    pub fn by_filter(filter: impl Into<String>) -> Self {
        Self::from(Lookup {
            filter: filter.into(),
            ..Lookup::default()
        })
    }

    /// Overrides the attributes to return.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.lookup.attributes = Some(attributes);
        self
    }

    /// Skips the group search.
    #[must_use]
    pub const fn skip_groups(mut self) -> Self {
        self.skip_groups_search = true;
        self
    }
}

impl From<Lookup> for UserQuery {
    fn from(lookup: Lookup) -> Self {
        Self {
            lookup,
            skip_groups_search: false,
        }
    }
}

/// Group lookup request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupQuery {
    /// Entry selection.
    #[serde(flatten)]
    pub lookup: Lookup,
    /// Skips the search for the group's members.
    pub skip_members_search: bool,
}

impl GroupQuery {
    /// Looks up by id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::from(Lookup {
            id: id.into(),
            ..Lookup::default()
        })
    }

    /// Looks up by DN.
    pub fn by_dn(dn: impl Into<String>) -> Self {
        Self::from(Lookup {
            dn: dn.into(),
            ..Lookup::default()
        })
    }

    /// Looks up by raw filter.
    pub fn by_filter(filter: impl Into<String>) -> Self {
        Self::from(Lookup {
            filter: filter.into(),
            ..Lookup::default()
        })
    }

    /// Overrides the attributes to return.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.lookup.attributes = Some(attributes);
        self
    }

    /// Skips the member search.
    #[must_use]
    pub const fn skip_members(mut self) -> Self {
        self.skip_members_search = true;
        self
    }
}

impl From<Lookup> for GroupQuery {
    fn from(lookup: Lookup) -> Self {
        Self {
            lookup,
            skip_members_search: false,
        }
    }
}

/// Listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Filter overriding the configured listing filter.
    pub filter: Option<String>,
    /// Attributes overriding the configured list.
    pub attributes: Option<Vec<String>>,
    /// Page size overriding the configured one.
    pub page_size: Option<u32>,
}

impl ListQuery {
    /// Lists with a custom filter.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Returns the filter to run.
    #[must_use]
    pub fn filter(&self, entity: &EntityConfig) -> String {
        match &self.filter {
            Some(filter) if !filter.is_empty() => filter.clone(),
            _ => entity.filter_list.clone(),
        }
    }

    /// Returns the attributes to request.
    #[must_use]
    pub fn attributes(&self, entity: &EntityConfig) -> Vec<String> {
        self.attributes
            .clone()
            .unwrap_or_else(|| entity.attributes.clone())
    }
}
