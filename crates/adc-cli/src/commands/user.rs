//! User commands.

use adc_client::{DirectoryClient, ListQuery, User, UserQuery};
use adc_directory::DirectoryCapability;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::UserCommand;
use crate::config::OutputFormat;
use crate::output::{output, output_single, success};
use crate::{CliError, CliResult};

use super::{parse_attributes, update_attributes};

/// User row for listings.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct UserRow {
    /// User id.
    pub id: String,
    /// Display name.
    #[tabled(rename = "Display Name")]
    pub display_name: String,
    /// Distinguished Name.
    #[tabled(rename = "DN")]
    pub dn: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.string_attribute("displayName").to_string(),
            dn: user.dn.clone(),
        }
    }
}

/// Runs a user command.
pub async fn run_user<D: DirectoryCapability + 'static>(
    cmd: UserCommand,
    client: &DirectoryClient<D>,
    format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        UserCommand::Get {
            lookup,
            skip_groups,
        } => {
            let mut query = UserQuery::from(adc_client::Lookup::from(lookup));
            query.skip_groups_search = skip_groups;

            let user = client
                .get_user(&query)
                .await?
                .ok_or_else(|| CliError::NotFound {
                    kind: "user",
                    target: query.lookup.target().to_string(),
                })?;
            output_single(&user, format)
        }
        UserCommand::List(args) => {
            let users = client.list_users(&ListQuery::from(args)).await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output(&rows, format)
        }
        UserCommand::Create { dn, attributes } => {
            client
                .create_user(&dn, &parse_attributes(&attributes)?)
                .await?;
            success(&format!("Created user {dn}"));
            Ok(())
        }
        UserCommand::Update {
            dn,
            attributes,
            clear,
        } => {
            client
                .update_user(&dn, &update_attributes(&attributes, &clear)?)
                .await?;
            success(&format!("Updated user {dn}"));
            Ok(())
        }
        UserCommand::Rename { dn, new_rdn } => {
            client.rename_user(&dn, &new_rdn).await?;
            success(&format!("Renamed user {dn} to {new_rdn}"));
            Ok(())
        }
    }
}
