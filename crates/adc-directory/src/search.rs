//! Search requests, paging state and search results.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// LDAP search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchScope {
    /// Search only the base DN.
    Base,
    /// Search one level below the base DN.
    OneLevel,
    /// Search the entire subtree.
    #[default]
    Subtree,
}

impl SearchScope {
    /// Converts to ldap3 scope.
    #[must_use]
    pub const fn to_ldap3(self) -> ldap3::Scope {
        match self {
            Self::Base => ldap3::Scope::Base,
            Self::OneLevel => ldap3::Scope::OneLevel,
            Self::Subtree => ldap3::Scope::Subtree,
        }
    }
}

/// Alias dereferencing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerefAliases {
    /// Never dereference aliases.
    #[default]
    Never,
    /// Dereference while searching below the base.
    InSearching,
    /// Dereference when locating the base.
    FindingBase,
    /// Always dereference.
    Always,
}

impl DerefAliases {
    /// Converts to ldap3 alias dereferencing.
    #[must_use]
    pub const fn to_ldap3(self) -> ldap3::DerefAliases {
        match self {
            Self::Never => ldap3::DerefAliases::Never,
            Self::InSearching => ldap3::DerefAliases::Searching,
            Self::FindingBase => ldap3::DerefAliases::Finding,
            Self::Always => ldap3::DerefAliases::Always,
        }
    }
}

/// An immutable search request.
///
/// Paging is not part of a `SearchSpec`; it is attached per page by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Base DN of the search.
    pub base_dn: String,
    /// Search scope.
    pub scope: SearchScope,
    /// Alias dereferencing policy.
    pub deref_aliases: DerefAliases,
    /// Server-side time limit in seconds (0 means no limit).
    pub time_limit_secs: i32,
    /// Filter string. Values from untrusted input must already be escaped.
    pub filter: String,
    /// Attributes to return. Empty returns the server default set.
    pub attributes: Vec<String>,
}

impl SearchSpec {
    /// Creates a whole-subtree search that never dereferences aliases.
    pub fn subtree(base_dn: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            scope: SearchScope::Subtree,
            deref_aliases: DerefAliases::Never,
            time_limit_secs: 0,
            filter: filter.into(),
            attributes: Vec::new(),
        }
    }

    /// Sets the server-side time limit.
    #[must_use]
    pub const fn with_time_limit(mut self, secs: i32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the attributes to return.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Simple paged results state.
///
/// The cookie starts empty. A cookie returned by the server must be sent
/// with the next request; an empty returned cookie ends the search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingState {
    /// Requested page size.
    pub page_size: u32,
    /// Opaque continuation cookie.
    pub cookie: Vec<u8>,
}

impl PagingState {
    /// Creates the initial paging state.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            page_size,
            cookie: Vec::new(),
        }
    }

    /// Returns true if the server signalled the last page.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cookie.is_empty()
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Entries returned on this page.
    pub entries: Vec<Entry>,
    /// Paging control returned by the server, if any.
    pub paging: Option<PagingState>,
}

impl SearchPage {
    /// Creates an unpaged result.
    #[must_use]
    pub const fn unpaged(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            paging: None,
        }
    }
}
