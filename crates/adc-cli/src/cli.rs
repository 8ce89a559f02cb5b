//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// adc - Active Directory users, groups and memberships.
#[derive(Debug, Parser)]
#[command(name = "adc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ~/.adc/adc.toml).
    #[arg(short, long, env = "ADC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory URL (overrides config).
    #[arg(long, env = "ADC_URL")]
    pub url: Option<String>,

    /// Bind DN (overrides config).
    #[arg(long, env = "ADC_BIND_DN")]
    pub bind_dn: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// User commands.
    #[command(subcommand)]
    User(UserCommand),

    /// Group commands.
    #[command(subcommand)]
    Group(GroupCommand),

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Entry selection shared by `get` commands.
#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    /// Entry id.
    #[arg(required_unless_present_any = ["dn", "filter"])]
    pub id: Option<String>,

    /// Entry DN (takes precedence over the id).
    #[arg(long)]
    pub dn: Option<String>,

    /// Raw LDAP filter (takes precedence over DN and id).
    #[arg(long)]
    pub filter: Option<String>,

    /// Attributes to return (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub attributes: Option<Vec<String>>,
}

/// Listing options shared by `list` commands.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Raw LDAP filter (overrides the configured listing filter).
    #[arg(long)]
    pub filter: Option<String>,

    /// Page size.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Attributes to return (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub attributes: Option<Vec<String>>,
}

/// Attribute values for create and update.
#[derive(Debug, Clone, Args)]
pub struct AttributeArgs {
    /// Attribute as name=value. Repeat a name for multiple values.
    #[arg(short, long = "attr", value_name = "NAME=VALUE")]
    pub attrs: Vec<String>,
}

/// User commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Get a user and its groups.
    Get {
        /// Entry selection.
        #[command(flatten)]
        lookup: LookupArgs,

        /// Skip the group search.
        #[arg(long)]
        skip_groups: bool,
    },

    /// List users.
    List(ListArgs),

    /// Create a user.
    Create {
        /// User DN.
        dn: String,

        /// Attributes.
        #[command(flatten)]
        attributes: AttributeArgs,
    },

    /// Replace user attributes.
    Update {
        /// User DN.
        dn: String,

        /// Attributes.
        #[command(flatten)]
        attributes: AttributeArgs,

        /// Attributes to remove.
        #[arg(long, value_name = "NAME")]
        clear: Vec<String>,
    },

    /// Rename a user.
    Rename {
        /// User DN.
        dn: String,

        /// New RDN, e.g. CN=New Name.
        new_rdn: String,
    },
}

/// Group commands.
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Get a group and its members.
    Get {
        /// Entry selection.
        #[command(flatten)]
        lookup: LookupArgs,

        /// Skip the member search.
        #[arg(long)]
        skip_members: bool,
    },

    /// List groups.
    List(ListArgs),

    /// Create a group.
    Create {
        /// Group DN.
        dn: String,

        /// Attributes.
        #[command(flatten)]
        attributes: AttributeArgs,
    },

    /// Replace group attributes.
    Update {
        /// Group DN.
        dn: String,

        /// Attributes.
        #[command(flatten)]
        attributes: AttributeArgs,

        /// Attributes to remove.
        #[arg(long, value_name = "NAME")]
        clear: Vec<String>,
    },

    /// Rename a group.
    Rename {
        /// Group DN.
        dn: String,

        /// New RDN, e.g. CN=New Name.
        new_rdn: String,
    },

    /// Add users to a group by id.
    AddMembers {
        /// Group id.
        group_id: String,

        /// User ids.
        #[arg(required = true)]
        member_ids: Vec<String>,
    },

    /// Remove users from a group by id.
    RemoveMembers {
        /// Group id.
        group_id: String,

        /// User ids.
        #[arg(required = true)]
        member_ids: Vec<String>,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,

    /// Print the config file path.
    Path,
}
