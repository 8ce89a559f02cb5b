//! Client configuration.
//!
//! ## Security
//!
//! The bind password is never serialized and is redacted from `Debug`
//! output. Load it from the environment or a prompt, not from a shared
//! config file.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use adc_directory::{LdapSettings, PLACEHOLDER};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Default identifier attribute for users and groups.
pub const DEFAULT_ID_ATTRIBUTE: &str = "sAMAccountName";

/// Default server-side time limit and client operation timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default page size for listing.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

// ============================================================================
// Bind Account
// ============================================================================

/// Service account used to bind the session.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BindAccount {
    /// Bind DN (or UPN / down-level logon name for Active Directory).
    pub dn: String,

    /// Bind password.
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl BindAccount {
    /// Creates a bind account.
    pub fn new(dn: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BindAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindAccount")
            .field("dn", &self.dn)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Entity Configuration
// ============================================================================

/// Which entity an [`EntityConfig`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Person entries.
    Users,
    /// Group entries.
    Groups,
}

impl EntityKind {
    /// Returns the section name used in config files and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Groups => "groups",
        }
    }

    /// Default filter for a lookup by id.
    #[must_use]
    pub const fn default_filter_by_id(self) -> &'static str {
        match self {
            Self::Users => "(&(objectClass=person)(sAMAccountName={}))",
            Self::Groups => "(&(objectClass=group)(sAMAccountName={}))",
        }
    }

    /// Default filter for a lookup by DN.
    #[must_use]
    pub const fn default_filter_by_dn(self) -> &'static str {
        match self {
            Self::Users => "(&(objectClass=person)(distinguishedName={}))",
            Self::Groups => "(&(objectClass=group)(distinguishedName={}))",
        }
    }

    /// Default filter for the relation lookup.
    ///
    /// Users: groups listing a user DN. Groups: members of a group DN.
    #[must_use]
    pub const fn default_filter_relations_by_dn(self) -> &'static str {
        match self {
            Self::Users => "(&(objectClass=group)(member={}))",
            Self::Groups => "(&(objectCategory=person)(memberOf={}))",
        }
    }

    /// Default listing filter.
    #[must_use]
    pub const fn default_filter_list(self) -> &'static str {
        match self {
            Self::Users => "(objectCategory=person)",
            Self::Groups => "(objectClass=group)",
        }
    }

    /// Default attributes returned by lookups and listings.
    #[must_use]
    pub fn default_attributes(self) -> Vec<String> {
        let names: &[&str] = match self {
            Self::Users => &[
                "sAMAccountName",
                "displayName",
                "givenName",
                "sn",
                "mail",
                "userPrincipalName",
                "userAccountControl",
            ],
            Self::Groups => &["sAMAccountName", "cn", "displayName", "description", "groupType"],
        };
        names.iter().map(ToString::to_string).collect()
    }
}

/// Search settings for one entity kind.
///
/// Filter templates contain one `{}` placeholder. Empty fields are filled
/// with the Active Directory defaults of the entity kind on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Base DN for searches.
    pub search_base: String,
    /// Attribute holding the entity id.
    pub id_attribute: String,
    /// Attributes returned by lookups and listings.
    pub attributes: Vec<String>,
    /// Lookup by id.
    pub filter_by_id: String,
    /// Lookup by DN.
    pub filter_by_dn: String,
    /// Relation lookup by DN.
    pub filter_relations_by_dn: String,
    /// Listing filter.
    pub filter_list: String,
}

impl EntityConfig {
    /// Creates a config with the defaults of `kind`.
    pub fn new(kind: EntityKind, search_base: impl Into<String>) -> Self {
        let mut config = Self {
            search_base: search_base.into(),
            ..Self::default()
        };
        config.fill_defaults(kind);
        config
    }

    /// Fills empty fields with the defaults of `kind`.
    pub fn fill_defaults(&mut self, kind: EntityKind) {
        fn fill(field: &mut String, default: &str) {
            if field.is_empty() {
                *field = default.to_string();
            }
        }

        fill(&mut self.id_attribute, DEFAULT_ID_ATTRIBUTE);
        fill(&mut self.filter_by_id, kind.default_filter_by_id());
        fill(&mut self.filter_by_dn, kind.default_filter_by_dn());
        fill(
            &mut self.filter_relations_by_dn,
            kind.default_filter_relations_by_dn(),
        );
        fill(&mut self.filter_list, kind.default_filter_list());
        if self.attributes.is_empty() {
            self.attributes = kind.default_attributes();
        }
    }

    fn validate(&self, kind: EntityKind) -> ClientResult<()> {
        let section = kind.as_str();

        if self.search_base.is_empty() {
            return Err(ClientError::config(format!(
                "{section}.search_base cannot be empty"
            )));
        }
        if self.id_attribute.is_empty() {
            return Err(ClientError::config(format!(
                "{section}.id_attribute cannot be empty"
            )));
        }

        for (name, template) in [
            ("filter_by_id", &self.filter_by_id),
            ("filter_by_dn", &self.filter_by_dn),
            ("filter_relations_by_dn", &self.filter_relations_by_dn),
        ] {
            if !template.contains(PLACEHOLDER) {
                return Err(ClientError::config(format!(
                    "{section}.{name} must contain the '{PLACEHOLDER}' placeholder"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Directory client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server URL (`ldap://` or `ldaps://`).
    pub url: String,

    /// Search time limit and client operation timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size used by listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Ceiling on pages fetched by one listing. Unbounded when absent.
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Service account.
    #[serde(default)]
    pub bind: BindAccount,

    /// User search settings.
    pub users: EntityConfig,

    /// Group search settings.
    pub groups: EntityConfig,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Parses a TOML document and fills entity defaults.
    ///
    /// The result is not validated; the bind password usually arrives later.
    pub fn from_toml_str(content: &str) -> ClientResult<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ClientError::config(format!("failed to parse config: {e}")))?;
        config.users.fill_defaults(EntityKind::Users);
        config.groups.fill_defaults(EntityKind::Groups);
        Ok(config)
    }

    /// Loads a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Serializes to TOML. The bind password is omitted.
    pub fn to_toml_string(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::config(format!("failed to serialize config: {e}")))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.ldap_settings()
            .validate()
            .map_err(|e| ClientError::config(e.to_string()))?;

        if self.bind.dn.is_empty() {
            return Err(ClientError::config("bind.dn cannot be empty"));
        }
        if self.page_size == 0 {
            return Err(ClientError::config("page_size must be greater than 0"));
        }
        if self.max_pages == Some(0) {
            return Err(ClientError::config("max_pages must be greater than 0"));
        }

        self.users.validate(EntityKind::Users)?;
        self.groups.validate(EntityKind::Groups)?;
        Ok(())
    }

    /// Returns the timeout as a duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the server-side search time limit.
    #[must_use]
    pub fn time_limit_secs(&self) -> i32 {
        i32::try_from(self.timeout_secs).unwrap_or(i32::MAX)
    }

    /// Returns connection settings for a live directory.
    #[must_use]
    pub fn ldap_settings(&self) -> LdapSettings {
        LdapSettings::new(self.url.clone()).operation_timeout(self.timeout())
    }

    /// Returns the settings for one entity kind.
    #[must_use]
    pub const fn entity(&self, kind: EntityKind) -> &EntityConfig {
        match kind {
            EntityKind::Users => &self.users,
            EntityKind::Groups => &self.groups,
        }
    }
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    url: Option<String>,
    bind_dn: Option<String>,
    bind_password: Option<String>,
    timeout_secs: u64,
    page_size: u32,
    max_pages: Option<usize>,
    users: Option<EntityConfig>,
    groups: Option<EntityConfig>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            ..Default::default()
        }
    }

    /// Sets the server URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self
    }

    /// Sets the bind password.
    #[must_use]
    pub fn bind_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the listing page size.
    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the page ceiling for listings.
    #[must_use]
    pub const fn max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    /// Sets the users search base with default filters.
    #[must_use]
    pub fn users_base(mut self, search_base: impl Into<String>) -> Self {
        self.users = Some(EntityConfig::new(EntityKind::Users, search_base));
        self
    }

    /// Sets the groups search base with default filters.
    #[must_use]
    pub fn groups_base(mut self, search_base: impl Into<String>) -> Self {
        self.groups = Some(EntityConfig::new(EntityKind::Groups, search_base));
        self
    }

    /// Sets the full users config.
    #[must_use]
    pub fn users(mut self, users: EntityConfig) -> Self {
        self.users = Some(users);
        self
    }

    /// Sets the full groups config.
    #[must_use]
    pub fn groups(mut self, groups: EntityConfig) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// ## Errors
    ///
    /// Returns an error if a required field is missing or validation fails.
    pub fn build(self) -> ClientResult<ClientConfig> {
        let mut users = self
            .users
            .ok_or_else(|| ClientError::config("users search base is required"))?;
        users.fill_defaults(EntityKind::Users);
        let mut groups = self
            .groups
            .ok_or_else(|| ClientError::config("groups search base is required"))?;
        groups.fill_defaults(EntityKind::Groups);

        let config = ClientConfig {
            url: self
                .url
                .ok_or_else(|| ClientError::config("url is required"))?,
            bind: BindAccount {
                dn: self
                    .bind_dn
                    .ok_or_else(|| ClientError::config("bind dn is required"))?,
                password: self.bind_password.unwrap_or_default(),
            },
            timeout_secs: self.timeout_secs,
            page_size: self.page_size,
            max_pages: self.max_pages,
            users,
            groups,
        };

        config.validate()?;
        Ok(config)
    }
}
