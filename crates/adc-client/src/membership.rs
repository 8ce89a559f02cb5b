//! Batched group membership changes.
//!
//! A change resolves every member id concurrently, one task per id, then
//! writes the group's `member` attribute once. Any resolution failure
//! aborts the change before the write.

use std::collections::HashMap;

use adc_directory::{Attribute, DirectoryCapability};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::client::DirectoryClient;
use crate::error::{ClientError, ClientResult};
use crate::model::{Group, User};
use crate::query::{GroupQuery, UserQuery};

/// Group attribute listing member DNs.
pub const MEMBER_ATTRIBUTE: &str = "member";

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// Add members.
    Add,
    /// Remove members.
    Remove,
}

impl MembershipChange {
    const fn operation(self) -> &'static str {
        match self {
            Self::Add => "add group members",
            Self::Remove => "remove group members",
        }
    }
}

/// DNs to add or remove in one change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    /// DNs to append to the member list.
    pub to_add: Vec<String>,
    /// DNs to drop from the member list.
    pub to_remove: Vec<String>,
}

impl MembershipDelta {
    /// Computes the delta for resolved users, in the order given.
    ///
    /// Membership is decided by DN only: the group lists the user's DN, or
    /// the user's groups include the group's DN. Ids are not unique, so a
    /// different group sharing the id never counts. Users resolving to the
    /// same DN count once.
    #[must_use]
    pub fn compute<'a, I>(group: &Group, users: I, change: MembershipChange) -> Self
    where
        I: IntoIterator<Item = &'a User>,
    {
        let mut delta = Self::default();
        for user in users {
            let is_member = group.has_member_dn(&user.dn) || user.is_in_group_dn(&group.dn);
            let target = match change {
                MembershipChange::Add if is_member => {
                    tracing::debug!(user = %user.id, group = %group.dn, "already a member");
                    continue;
                }
                MembershipChange::Remove if !is_member => {
                    tracing::debug!(user = %user.id, group = %group.dn, "not a member");
                    continue;
                }
                MembershipChange::Add => &mut delta.to_add,
                MembershipChange::Remove => &mut delta.to_remove,
            };
            if !target.iter().any(|dn| dn.eq_ignore_ascii_case(&user.dn)) {
                target.push(user.dn.clone());
            }
        }
        delta
    }

    /// Returns true if nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Number of DNs added or removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Applies the delta to the group's current member DNs.
    ///
    /// Existing members keep their order; added members follow.
    #[must_use]
    pub fn apply(&self, group: &Group) -> Vec<String> {
        group
            .members
            .iter()
            .map(|m| &m.dn)
            .filter(|dn| !self.to_remove.iter().any(|r| r.eq_ignore_ascii_case(dn)))
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }
}

impl<D: DirectoryCapability + 'static> DirectoryClient<D> {
    /// Adds users to a group by id. Returns the number added.
    ///
    /// Unknown ids and users already in the group are skipped. Nothing is
    /// written when nothing changes.
    ///
    /// ## Errors
    ///
    /// - [`ClientError::GroupNotFound`] if the group does not exist.
    /// - [`ClientError::MemberResolution`] if any id lookup fails; the
    ///   group is left untouched.
    /// - The write error, surfaced as is.
    pub async fn add_group_members<I, S>(&self, group_id: &str, member_ids: I) -> ClientResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_members(group_id, member_ids, MembershipChange::Add)
            .await
    }

    /// Removes users from a group by id. Returns the number removed.
    ///
    /// Unknown ids and users not in the group are skipped. Errors as for
    /// [`DirectoryClient::add_group_members`].
    pub async fn remove_group_members<I, S>(
        &self,
        group_id: &str,
        member_ids: I,
    ) -> ClientResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_members(group_id, member_ids, MembershipChange::Remove)
            .await
    }

    async fn change_members<I, S>(
        &self,
        group_id: &str,
        member_ids: I,
        change: MembershipChange,
    ) -> ClientResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = Vec::new();
        for id in member_ids {
            let id = id.into();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let group = self
            .get_group(&GroupQuery::by_id(group_id))
            .await?
            .ok_or_else(|| ClientError::GroupNotFound(group_id.to_string()))?;

        let users = self.resolve_members(&ids).await?;
        let delta = MembershipDelta::compute(&group, &users, change);
        let members = delta.apply(&group);
        let changed = members.len().abs_diff(group.members.len());
        if changed == 0 {
            tracing::debug!(group = group_id, ?change, "membership unchanged");
            return Ok(0);
        }

        tracing::info!(
            group = group_id,
            ?change,
            old_count = group.members.len(),
            new_count = members.len(),
            "updating group members"
        );

        self.modify_entry(
            change.operation(),
            &group.dn,
            &[Attribute::new(MEMBER_ATTRIBUTE, members)],
        )
        .await?;

        Ok(changed)
    }

    /// Looks up every id concurrently.
    ///
    /// All tasks are joined before any result is inspected. Results are
    /// then read in `ids` order; the first failure wins and unknown ids are
    /// dropped.
    async fn resolve_members(&self, ids: &[String]) -> ClientResult<Vec<User>> {
        let (tx, mut rx) = mpsc::channel(ids.len().max(1));
        let mut tasks = JoinSet::new();

        for id in ids {
            let client = self.clone();
            let tx = tx.clone();
            let id = id.clone();
            tasks.spawn(async move {
                let result = client.get_user(&UserQuery::by_id(id.clone())).await;
                // The receiver outlives every task.
                let _ = tx.send((id, result)).await;
            });
        }
        drop(tx);

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| ClientError::Internal(format!("member lookup task failed: {e}")))?;
        }

        let mut results = HashMap::with_capacity(ids.len());
        while let Some((id, result)) = rx.recv().await {
            results.insert(id, result);
        }

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match results.remove(id) {
                Some(Ok(Some(user))) => users.push(user),
                Some(Ok(None)) => tracing::debug!(user = %id, "member id not found, skipping"),
                Some(Err(e)) => {
                    return Err(ClientError::MemberResolution {
                        id: id.clone(),
                        source: Box::new(e),
                    })
                }
                None => {
                    return Err(ClientError::Internal(format!(
                        "no lookup result for member '{id}'"
                    )))
                }
            }
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Member, UserGroup};

    fn group() -> Group {
        Group {
            dn: "OU=group1,DC=company,DC=com".to_string(),
            id: "group1".to_string(),
            attributes: Attributes::new(),
            members: vec![
                Member {
                    dn: "OU=user1,DC=company,DC=com".to_string(),
                    id: "user1".to_string(),
                },
                Member {
                    dn: "OU=user2,DC=company,DC=com".to_string(),
                    id: "user2".to_string(),
                },
            ],
        }
    }

    fn user(id: &str, groups: &[&str]) -> User {
        User {
            dn: format!("OU={id},DC=company,DC=com"),
            id: id.to_string(),
            attributes: Attributes::new(),
            groups: groups
                .iter()
                .map(|g| UserGroup {
                    dn: format!("OU={g},DC=company,DC=com"),
                    id: (*g).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn add_skips_members_and_duplicates() {
        let users = [user("user1", &[]), user("user3", &[]), user("user3", &[])];

        let delta = MembershipDelta::compute(&group(), &users, MembershipChange::Add);

        assert_eq!(delta.to_add, vec!["OU=user3,DC=company,DC=com"]);
        assert_eq!(delta.len(), 1);
        assert_eq!(
            delta.apply(&group()),
            vec![
                "OU=user1,DC=company,DC=com",
                "OU=user2,DC=company,DC=com",
                "OU=user3,DC=company,DC=com",
            ]
        );
    }

    #[test]
    fn user_group_list_counts_as_membership() {
        let users = [user("user4", &["group1"])];

        let delta = MembershipDelta::compute(&group(), &users, MembershipChange::Add);
        assert!(delta.is_empty());

        let delta = MembershipDelta::compute(&group(), &users, MembershipChange::Remove);
        assert_eq!(delta.to_remove, vec!["OU=user4,DC=company,DC=com"]);
        // The group does not list user4, so the member list stays as is.
        assert_eq!(delta.apply(&group()).len(), group().members.len());
    }

    #[test]
    fn remove_ignores_dn_case() {
        let mut member = user("user2", &[]);
        member.dn = "ou=USER2,dc=company,dc=com".to_string();

        let delta = MembershipDelta::compute(&group(), &[member], MembershipChange::Remove);

        assert_eq!(delta.apply(&group()), vec!["OU=user1,DC=company,DC=com"]);
    }

    #[test]
    fn remove_non_member_is_empty() {
        let users = [user("user3", &[])];
        let delta = MembershipDelta::compute(&group(), &users, MembershipChange::Remove);
        assert!(delta.is_empty());
    }

    #[test]
    fn group_sharing_the_id_is_not_membership() {
        let mut shadowed = user("userToAdd", &[]);
        shadowed.groups.push(UserGroup {
            dn: "OU=group1,OU=Other,DC=company,DC=com".to_string(),
            id: "group1".to_string(),
        });
        let users = [shadowed];

        let delta = MembershipDelta::compute(&group(), &users, MembershipChange::Remove);
        assert!(delta.is_empty());

        let delta = MembershipDelta::compute(&group(), &users, MembershipChange::Add);
        assert_eq!(delta.to_add, vec!["OU=userToAdd,DC=company,DC=com"]);
    }
}
