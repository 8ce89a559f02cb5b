//! The directory client.

use std::sync::Arc;

use adc_directory::{
    Attribute, DirectoryCapability, Entry, LdapDirectory, SearchSpec,
};

use crate::config::{ClientConfig, EntityConfig, EntityKind};
use crate::error::{ClientError, ClientResult};
use crate::paging::PaginatedSearchAggregator;
use crate::session::{SessionManager, SessionState};

/// Typed client over a directory capability.
///
/// Cloning is cheap; clones share one session.
pub struct DirectoryClient<D> {
    inner: Arc<ClientInner<D>>,
}

struct ClientInner<D> {
    config: ClientConfig,
    session: SessionManager<D>,
}

impl<D> Clone for DirectoryClient<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DirectoryClient<LdapDirectory> {
    /// Connects to the live directory named in the config.
    pub async fn connect_ldap(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let directory = LdapDirectory::new(config.ldap_settings())
            .map_err(|e| ClientError::config(e.to_string()))?;
        Self::connect(config, directory).await
    }
}

impl<D: DirectoryCapability + 'static> DirectoryClient<D> {
    /// Validates the config and binds a session on `directory`.
    ///
    /// ## Errors
    ///
    /// Fails on invalid configuration or when the initial bind fails,
    /// including bad credentials.
    pub async fn connect(config: ClientConfig, directory: D) -> ClientResult<Self> {
        config.validate()?;

        let session = SessionManager::new(Arc::new(directory), config.bind.clone());
        session
            .bind()
            .await
            .map_err(|e| ClientError::directory("bind", config.bind.dn.clone(), e))?;

        Ok(Self {
            inner: Arc::new(ClientInner { config, session }),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the session manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager<D> {
        &self.inner.session
    }

    /// Returns the session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.session.state()
    }

    /// Unbinds the session.
    pub async fn close(&self) -> ClientResult<()> {
        self.inner
            .session
            .close()
            .await
            .map_err(|e| ClientError::directory("unbind", self.config().url.clone(), e))
    }

    pub(crate) fn entity(&self, kind: EntityKind) -> &EntityConfig {
        self.inner.config.entity(kind)
    }

    /// Builds a subtree search below the search base of `kind`.
    pub(crate) fn search_spec(
        &self,
        kind: EntityKind,
        filter: String,
        attributes: Vec<String>,
    ) -> SearchSpec {
        SearchSpec::subtree(self.entity(kind).search_base.clone(), filter)
            .with_time_limit(self.inner.config.time_limit_secs())
            .with_attributes(attributes)
    }

    /// Runs one unpaged search.
    pub(crate) async fn search(
        &self,
        operation: &'static str,
        spec: &SearchSpec,
    ) -> ClientResult<Vec<Entry>> {
        self.inner
            .session
            .execute(operation, |d| async move { d.search(spec, None).await })
            .await
            .map(|page| page.entries)
            .map_err(|e| ClientError::directory(operation, spec.filter.clone(), e))
    }

    /// Runs one unpaged search and keeps the first entry.
    pub(crate) async fn search_first(
        &self,
        operation: &'static str,
        spec: &SearchSpec,
    ) -> ClientResult<Option<Entry>> {
        let mut entries = self.search(operation, spec).await?;
        if entries.len() > 1 {
            tracing::debug!(
                filter = %spec.filter,
                count = entries.len(),
                "lookup matched several entries, using the first"
            );
        }
        Ok(if entries.is_empty() {
            None
        } else {
            Some(entries.swap_remove(0))
        })
    }

    /// Runs a paged search to completion.
    pub(crate) async fn search_all(
        &self,
        operation: &'static str,
        spec: &SearchSpec,
        page_size: Option<u32>,
    ) -> ClientResult<Vec<Entry>> {
        let config = &self.inner.config;
        PaginatedSearchAggregator::new(&self.inner.session, page_size.unwrap_or(config.page_size))
            .with_max_pages(config.max_pages)
            .list_all(spec)
            .await
            .map_err(|e| ClientError::directory(operation, spec.filter.clone(), e))
    }

    pub(crate) async fn add_entry(
        &self,
        operation: &'static str,
        dn: &str,
        attributes: &[Attribute],
    ) -> ClientResult<()> {
        if dn.is_empty() {
            return Err(ClientError::validation("dn cannot be empty"));
        }
        self.inner
            .session
            .execute(operation, |d| async move { d.add(dn, attributes).await })
            .await
            .map_err(|e| ClientError::directory(operation, dn, e))?;
        tracing::info!(operation, dn, "entry created");
        Ok(())
    }

    pub(crate) async fn modify_entry(
        &self,
        operation: &'static str,
        dn: &str,
        replacements: &[Attribute],
    ) -> ClientResult<()> {
        if dn.is_empty() {
            return Err(ClientError::validation("dn cannot be empty"));
        }
        self.inner
            .session
            .execute(operation, |d| async move { d.modify(dn, replacements).await })
            .await
            .map_err(|e| ClientError::directory(operation, dn, e))?;
        tracing::info!(operation, dn, count = replacements.len(), "entry modified");
        Ok(())
    }

    pub(crate) async fn rename_entry(
        &self,
        operation: &'static str,
        dn: &str,
        new_rdn: &str,
    ) -> ClientResult<()> {
        if dn.is_empty() || new_rdn.is_empty() {
            return Err(ClientError::validation("dn and new rdn cannot be empty"));
        }
        self.inner
            .session
            .execute(operation, |d| async move { d.modify_dn(dn, new_rdn, true).await })
            .await
            .map_err(|e| ClientError::directory(operation, dn, e))?;
        tracing::info!(operation, dn, new_rdn, "entry renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use adc_directory::{DirectoryError, FixtureDirectory};

    use super::*;

    fn config(password: &str) -> ClientConfig {
        ClientConfig::builder()
            .url("ldap://dc1.company.com")
            .bind_dn("validUser")
            .bind_password(password)
            .users_base("DC=company,DC=com")
            .groups_base("DC=company,DC=com")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn connect_binds_once() {
        let client = DirectoryClient::connect(config("validPass"), FixtureDirectory::company())
            .await
            .unwrap();

        assert_eq!(client.state(), SessionState::Bound);
        assert_eq!(client.session().directory().calls().binds, 1);
    }

    #[tokio::test]
    async fn connect_rejects_bad_credentials() {
        let err = DirectoryClient::connect(config("nope"), FixtureDirectory::company())
            .await
            .err()
            .unwrap();

        assert!(matches!(
            err.directory_error(),
            Some(DirectoryError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn closed_client_reports_not_bound() {
        let client = DirectoryClient::connect(config("validPass"), FixtureDirectory::company())
            .await
            .unwrap();
        client.close().await.unwrap();

        let spec = client.search_spec(EntityKind::Users, "(objectCategory=person)".into(), vec![]);
        let err = client.search("list users", &spec).await.unwrap_err();
        assert!(matches!(err.directory_error(), Some(DirectoryError::NotBound)));
    }

    #[tokio::test]
    async fn search_spec_uses_config() {
        let client = DirectoryClient::connect(config("validPass"), FixtureDirectory::company())
            .await
            .unwrap();

        let spec = client.search_spec(EntityKind::Groups, "(objectClass=group)".into(), vec![]);
        assert_eq!(spec.base_dn, "DC=company,DC=com");
        assert_eq!(spec.time_limit_secs, 30);
    }
}
