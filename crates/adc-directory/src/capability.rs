//! The directory capability consumed by the client.
//!
//! Two implementations ship with this crate: [`crate::LdapDirectory`] over a
//! real `ldap3` connection and [`crate::FixtureDirectory`] over an in-memory
//! entry table. Callers choose one at construction time.

use async_trait::async_trait;

use crate::entry::Attribute;
use crate::error::DirectoryResult;
use crate::search::{PagingState, SearchPage, SearchSpec};

/// Operations against a directory session.
///
/// ## Implementation Notes
///
/// - Implementations must be safe for concurrent use: the membership
///   reconciler issues point lookups from many tasks at once over one
///   session and does no serialisation of its own.
/// - `bind` (re)establishes the session. Calling it after `unbind` or after
///   a connection failure must produce a fresh session.
/// - Implementations never retry. Retry policy belongs to the session layer.
#[async_trait]
pub trait DirectoryCapability: Send + Sync {
    /// Authenticates the session as `dn`.
    async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<()>;

    /// Runs a search, optionally carrying a paging control.
    async fn search(
        &self,
        spec: &SearchSpec,
        paging: Option<&PagingState>,
    ) -> DirectoryResult<SearchPage>;

    /// Creates an entry.
    async fn add(&self, dn: &str, attributes: &[Attribute]) -> DirectoryResult<()>;

    /// Replaces attribute values on an entry.
    ///
    /// An attribute with no values is removed from the entry.
    async fn modify(&self, dn: &str, replacements: &[Attribute]) -> DirectoryResult<()>;

    /// Renames an entry.
    async fn modify_dn(&self, dn: &str, new_rdn: &str, delete_old_rdn: bool)
        -> DirectoryResult<()>;

    /// Closes the session.
    async fn unbind(&self) -> DirectoryResult<()>;
}
