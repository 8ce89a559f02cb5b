//! Group commands.

use adc_client::{DirectoryClient, Group, GroupQuery, ListQuery, Lookup};
use adc_directory::DirectoryCapability;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GroupCommand;
use crate::config::OutputFormat;
use crate::output::{info, output, output_single, success};
use crate::{CliError, CliResult};

use super::{parse_attributes, update_attributes};

/// Group row for listings.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct GroupRow {
    /// Group id.
    pub id: String,
    /// Description.
    pub description: String,
    /// Distinguished Name.
    #[tabled(rename = "DN")]
    pub dn: String,
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            description: group.string_attribute("description").to_string(),
            dn: group.dn.clone(),
        }
    }
}

/// Result of a membership change, for JSON output.
#[derive(Debug, Serialize)]
struct MembershipResult<'a> {
    group: &'a str,
    changed: usize,
}

/// Runs a group command.
pub async fn run_group<D: DirectoryCapability + 'static>(
    cmd: GroupCommand,
    client: &DirectoryClient<D>,
    format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        GroupCommand::Get {
            lookup,
            skip_members,
        } => {
            let mut query = GroupQuery::from(Lookup::from(lookup));
            query.skip_members_search = skip_members;

            let group = client
                .get_group(&query)
                .await?
                .ok_or_else(|| CliError::NotFound {
                    kind: "group",
                    target: query.lookup.target().to_string(),
                })?;
            output_single(&group, format)
        }
        GroupCommand::List(args) => {
            let groups = client.list_groups(&ListQuery::from(args)).await?;
            let rows: Vec<GroupRow> = groups.iter().map(GroupRow::from).collect();
            output(&rows, format)
        }
        GroupCommand::Create { dn, attributes } => {
            client
                .create_group(&dn, &parse_attributes(&attributes)?)
                .await?;
            success(&format!("Created group {dn}"));
            Ok(())
        }
        GroupCommand::Update {
            dn,
            attributes,
            clear,
        } => {
            client
                .update_group(&dn, &update_attributes(&attributes, &clear)?)
                .await?;
            success(&format!("Updated group {dn}"));
            Ok(())
        }
        GroupCommand::Rename { dn, new_rdn } => {
            client.rename_group(&dn, &new_rdn).await?;
            success(&format!("Renamed group {dn} to {new_rdn}"));
            Ok(())
        }
        GroupCommand::AddMembers {
            group_id,
            member_ids,
        } => {
            let added = client.add_group_members(&group_id, member_ids).await?;
            report(&group_id, added, "Added", format)
        }
        GroupCommand::RemoveMembers {
            group_id,
            member_ids,
        } => {
            let removed = client.remove_group_members(&group_id, member_ids).await?;
            report(&group_id, removed, "Removed", format)
        }
    }
}

fn report(group: &str, changed: usize, verb: &str, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => output_single(&MembershipResult { group, changed }, format),
        OutputFormat::Quiet => Ok(()),
        OutputFormat::Table if changed == 0 => {
            info(&format!("Group {group} unchanged"));
            Ok(())
        }
        OutputFormat::Table => {
            success(&format!("{verb} {changed} member(s) in group {group}"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use adc_client::{ClientConfig, ClientError};
    use adc_directory::FixtureDirectory;

    use super::*;

    async fn client() -> DirectoryClient<FixtureDirectory> {
        let config = ClientConfig::builder()
            .url("ldap://dc1.company.com")
            .bind_dn("validUser")
            .bind_password("validPass")
            .users_base("DC=company,DC=com")
            .groups_base("DC=company,DC=com")
            .build()
            .unwrap();
        DirectoryClient::connect(config, FixtureDirectory::company())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn add_members_writes_group() {
        let client = client().await;

        run_group(
            GroupCommand::AddMembers {
                group_id: "group2".to_string(),
                member_ids: vec!["userToAdd".to_string()],
            },
            &client,
            OutputFormat::Quiet,
        )
        .await
        .unwrap();

        let writes = client.session().directory().modifications();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].dn, "OU=group2,DC=company,DC=com");
    }

    #[tokio::test]
    async fn unknown_group_fails() {
        let client = client().await;

        let err = run_group(
            GroupCommand::RemoveMembers {
                group_id: "noSuchGroup".to_string(),
                member_ids: vec!["user1".to_string()],
            },
            &client,
            OutputFormat::Quiet,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            CliError::Client(ClientError::GroupNotFound(ref id)) if id == "noSuchGroup"
        ));
    }
}
