//! Group operations.

use adc_directory::{render_escaped, Attribute, DirectoryCapability};

use crate::client::DirectoryClient;
use crate::config::EntityKind;
use crate::error::ClientResult;
use crate::mapper::EntryMapper;
use crate::model::{Group, Member};
use crate::query::{GroupQuery, ListQuery};

impl<D: DirectoryCapability + 'static> DirectoryClient<D> {
    /// Looks up one group.
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub async fn get_group(&self, query: &GroupQuery) -> ClientResult<Option<Group>> {
        query.lookup.validate()?;

        let groups = self.entity(EntityKind::Groups);
        let spec = self.search_spec(
            EntityKind::Groups,
            query.lookup.filter(groups),
            query.lookup.attributes(groups),
        );

        let Some(entry) = self.search_first("get group", &spec).await? else {
            tracing::debug!(lookup = query.lookup.target(), "group not found");
            return Ok(None);
        };

        let mut group = EntryMapper::to_group(&entry, &groups.id_attribute);
        if !query.skip_members_search {
            group.members = self.group_members(&group.dn).await?;
        }
        Ok(Some(group))
    }

    /// Lists groups page by page. Members are not resolved.
    pub async fn list_groups(&self, query: &ListQuery) -> ClientResult<Vec<Group>> {
        let groups = self.entity(EntityKind::Groups);
        let spec = self.search_spec(
            EntityKind::Groups,
            query.filter(groups),
            query.attributes(groups),
        );

        let entries = self.search_all("list groups", &spec, query.page_size).await?;
        Ok(entries
            .iter()
            .map(|e| EntryMapper::to_group(e, &groups.id_attribute))
            .collect())
    }

    /// Creates a group entry.
    pub async fn create_group(&self, dn: &str, attributes: &[Attribute]) -> ClientResult<()> {
        self.add_entry("create group", dn, attributes).await
    }

    /// Replaces attributes on a group. Empty value lists remove attributes.
    pub async fn update_group(&self, dn: &str, attributes: &[Attribute]) -> ClientResult<()> {
        self.modify_entry("update group", dn, attributes).await
    }

    /// Renames a group, deleting the old RDN value.
    pub async fn rename_group(&self, dn: &str, new_rdn: &str) -> ClientResult<()> {
        self.rename_entry("rename group", dn, new_rdn).await
    }

    /// Finds the members of the group at `dn`.
    async fn group_members(&self, dn: &str) -> ClientResult<Vec<Member>> {
        let users = self.entity(EntityKind::Users);
        let groups = self.entity(EntityKind::Groups);
        let spec = self.search_spec(
            EntityKind::Users,
            render_escaped(&groups.filter_relations_by_dn, dn),
            vec![users.id_attribute.clone()],
        );

        let entries = self.search("get group members", &spec).await?;
        Ok(entries
            .iter()
            .map(|e| EntryMapper::to_member(e, &users.id_attribute))
            .collect())
    }
}
