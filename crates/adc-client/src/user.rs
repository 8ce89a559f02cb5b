//! User operations.

use adc_directory::{render_escaped, Attribute, DirectoryCapability};

use crate::client::DirectoryClient;
use crate::config::EntityKind;
use crate::error::ClientResult;
use crate::mapper::EntryMapper;
use crate::model::{User, UserGroup};
use crate::query::{ListQuery, UserQuery};

impl<D: DirectoryCapability + 'static> DirectoryClient<D> {
    /// Looks up one user.
    ///
    /// Returns `Ok(None)` when nothing matches. When several entries match,
    /// the first one in directory order wins.
    pub async fn get_user(&self, query: &UserQuery) -> ClientResult<Option<User>> {
        query.lookup.validate()?;

        let users = self.entity(EntityKind::Users);
        let spec = self.search_spec(
            EntityKind::Users,
            query.lookup.filter(users),
            query.lookup.attributes(users),
        );

        let Some(entry) = self.search_first("get user", &spec).await? else {
            tracing::debug!(lookup = query.lookup.target(), "user not found");
            return Ok(None);
        };

        let mut user = EntryMapper::to_user(&entry, &users.id_attribute);
        if !query.skip_groups_search {
            user.groups = self.user_groups(&user.dn).await?;
        }
        Ok(Some(user))
    }

    /// Lists users page by page. Groups are not resolved.
    pub async fn list_users(&self, query: &ListQuery) -> ClientResult<Vec<User>> {
        let users = self.entity(EntityKind::Users);
        let spec = self.search_spec(
            EntityKind::Users,
            query.filter(users),
            query.attributes(users),
        );

        let entries = self.search_all("list users", &spec, query.page_size).await?;
        Ok(entries
            .iter()
            .map(|e| EntryMapper::to_user(e, &users.id_attribute))
            .collect())
    }

    /// Creates a user entry.
    pub async fn create_user(&self, dn: &str, attributes: &[Attribute]) -> ClientResult<()> {
        self.add_entry("create user", dn, attributes).await
    }

    /// Replaces attributes on a user. Empty value lists remove attributes.
    pub async fn update_user(&self, dn: &str, attributes: &[Attribute]) -> ClientResult<()> {
        self.modify_entry("update user", dn, attributes).await
    }

    /// Renames a user, deleting the old RDN value.
    pub async fn rename_user(&self, dn: &str, new_rdn: &str) -> ClientResult<()> {
        self.rename_entry("rename user", dn, new_rdn).await
    }

    /// Finds the groups listing `dn` as a member.
    async fn user_groups(&self, dn: &str) -> ClientResult<Vec<UserGroup>> {
        let users = self.entity(EntityKind::Users);
        let groups = self.entity(EntityKind::Groups);
        let spec = self.search_spec(
            EntityKind::Groups,
            render_escaped(&users.filter_relations_by_dn, dn),
            vec![groups.id_attribute.clone()],
        );

        let entries = self.search("get user groups", &spec).await?;
        Ok(entries
            .iter()
            .map(|e| EntryMapper::to_user_group(e, &groups.id_attribute))
            .collect())
    }
}
