//! Common test utilities and fixtures.

use adc_client::{ClientConfig, ClientConfigBuilder, DirectoryClient};
use adc_directory::fixture::{FIXTURE_BIND_DN, FIXTURE_BIND_PASSWORD};
use adc_directory::FixtureDirectory;

/// Search base of the sample company directory.
pub const BASE: &str = "DC=company,DC=com";

/// Builder preloaded with the sample directory's URL, account and bases.
#[must_use]
pub fn config_builder() -> ClientConfigBuilder {
    ClientConfig::builder()
        .url("ldap://dc1.company.com")
        .bind_dn(FIXTURE_BIND_DN)
        .bind_password(FIXTURE_BIND_PASSWORD)
        .users_base(BASE)
        .groups_base(BASE)
}

/// Connects a client to `directory` with `config`.
///
/// # Panics
///
/// Panics if the bind fails.
pub async fn connect(
    config: ClientConfig,
    directory: FixtureDirectory,
) -> DirectoryClient<FixtureDirectory> {
    DirectoryClient::connect(config, directory)
        .await
        .expect("bind to fixture directory")
}

/// Connects to the sample company directory with default settings.
///
/// # Panics
///
/// Panics if the config is invalid or the bind fails.
pub async fn company_client() -> DirectoryClient<FixtureDirectory> {
    let config = config_builder().build().expect("valid config");
    connect(config, FixtureDirectory::company()).await
}

/// Member DNs currently stored on the group entry at `dn`.
#[must_use]
pub fn stored_members(client: &DirectoryClient<FixtureDirectory>, dn: &str) -> Vec<String> {
    client
        .session()
        .directory()
        .entry(dn)
        .map(|e| e.values("member").to_vec())
        .unwrap_or_default()
}
