//! Live directory over an `ldap3` connection.
//!
//! One connection is held per directory. The `ldap3` handle multiplexes
//! concurrent operations over that connection, so callers clone the handle
//! under a short-lived lock and run their operation outside it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::controls::{Control, ControlType, PagedResults};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, SearchEntry, SearchOptions};
use tokio::sync::Mutex;

use crate::capability::DirectoryCapability;
use crate::entry::{Attribute, Entry};
use crate::error::{DirectoryError, DirectoryResult, RC_INVALID_CREDENTIALS};
use crate::search::{PagingState, SearchPage, SearchSpec};

/// Connection settings for [`LdapDirectory`].
#[derive(Debug, Clone)]
pub struct LdapSettings {
    /// Server URL (`ldap://` or `ldaps://`).
    pub url: String,
    /// Timeout for establishing the connection.
    pub connection_timeout: Duration,
    /// Client-side timeout applied to every operation.
    pub operation_timeout: Duration,
}

impl LdapSettings {
    /// Creates settings with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Validates the URL scheme.
    pub fn validate(&self) -> DirectoryResult<()> {
        let lower = self.url.to_lowercase();
        let rest = lower
            .strip_prefix("ldaps://")
            .or_else(|| lower.strip_prefix("ldap://"))
            .ok_or_else(|| {
                DirectoryError::config(format!(
                    "unsupported directory URL '{}': expected ldap:// or ldaps://",
                    self.url
                ))
            })?;
        if rest.is_empty() {
            return Err(DirectoryError::config("directory URL is missing a host"));
        }
        Ok(())
    }
}

/// Directory backed by a live LDAP server.
pub struct LdapDirectory {
    settings: Arc<LdapSettings>,
    connection: Mutex<Option<Ldap>>,
}

impl LdapDirectory {
    /// Creates an unconnected directory. The connection is opened by `bind`.
    pub fn new(settings: LdapSettings) -> DirectoryResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings: Arc::new(settings),
            connection: Mutex::new(None),
        })
    }

    /// Returns the connection settings.
    #[must_use]
    pub fn settings(&self) -> &LdapSettings {
        &self.settings
    }

    /// Clones the current connection handle.
    async fn handle(&self) -> DirectoryResult<Ldap> {
        let guard = self.connection.lock().await;
        let mut ldap = guard.as_ref().cloned().ok_or(DirectoryError::NotBound)?;
        ldap.with_timeout(self.settings.operation_timeout);
        Ok(ldap)
    }

    /// Opens a new connection.
    async fn connect(&self) -> DirectoryResult<Ldap> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.settings.connection_timeout);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.settings.url)
            .await
            .map_err(|e| DirectoryError::connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection driver error");
            }
        });

        Ok(ldap)
    }
}

#[async_trait]
impl DirectoryCapability for LdapDirectory {
    async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<()> {
        let mut ldap = self.connect().await?;
        ldap.with_timeout(self.settings.operation_timeout);

        let result = ldap.simple_bind(dn, password).await?;
        if result.rc == RC_INVALID_CREDENTIALS {
            return Err(DirectoryError::InvalidCredentials(dn.to_string()));
        }
        if result.rc != 0 {
            let err = DirectoryError::from_result_code(result.rc, result.text);
            return Err(if err.is_transient() {
                err
            } else {
                DirectoryError::Bind(err.to_string())
            });
        }

        let previous = self.connection.lock().await.replace(ldap);
        if let Some(mut old) = previous {
            // Best effort: the old connection may already be gone.
            let _ = old.unbind().await;
        }

        tracing::info!(url = %self.settings.url, bind_dn = %dn, "LDAP session bound");
        Ok(())
    }

    async fn search(
        &self,
        spec: &SearchSpec,
        paging: Option<&PagingState>,
    ) -> DirectoryResult<SearchPage> {
        let mut ldap = self.handle().await?;

        let options = SearchOptions::new()
            .deref(spec.deref_aliases.to_ldap3())
            .timelimit(spec.time_limit_secs);
        ldap.with_search_options(options);

        if let Some(paging) = paging {
            ldap.with_controls(PagedResults {
                size: i32::try_from(paging.page_size).unwrap_or(i32::MAX),
                cookie: paging.cookie.clone(),
            });
        }

        let (rs, result) = ldap
            .search(
                &spec.base_dn,
                spec.scope.to_ldap3(),
                &spec.filter,
                &spec.attributes,
            )
            .await?
            .success()?;

        let entries = rs
            .into_iter()
            .map(SearchEntry::construct)
            .map(Entry::from)
            .collect();

        let next = result.ctrls.iter().find_map(|ctrl| match ctrl {
            Control(Some(ControlType::PagedResults), raw) => {
                let returned: PagedResults = raw.parse();
                Some(PagingState {
                    page_size: paging.map_or(0, |p| p.page_size),
                    cookie: returned.cookie,
                })
            }
            _ => None,
        });

        Ok(SearchPage {
            entries,
            paging: next,
        })
    }

    async fn add(&self, dn: &str, attributes: &[Attribute]) -> DirectoryResult<()> {
        let mut ldap = self.handle().await?;

        let attrs: Vec<(String, HashSet<String>)> = attributes
            .iter()
            .map(|a| (a.name.clone(), a.values.iter().cloned().collect()))
            .collect();

        ldap.add(dn, attrs).await?.success()?;
        Ok(())
    }

    async fn modify(&self, dn: &str, replacements: &[Attribute]) -> DirectoryResult<()> {
        let mut ldap = self.handle().await?;

        let mods: Vec<Mod<String>> = replacements
            .iter()
            .map(|a| Mod::Replace(a.name.clone(), a.values.iter().cloned().collect()))
            .collect();

        ldap.modify(dn, mods).await?.success()?;
        Ok(())
    }

    async fn modify_dn(
        &self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
    ) -> DirectoryResult<()> {
        let mut ldap = self.handle().await?;
        ldap.modifydn(dn, new_rdn, delete_old_rdn, None)
            .await?
            .success()?;
        Ok(())
    }

    async fn unbind(&self) -> DirectoryResult<()> {
        let taken = self.connection.lock().await.take();
        match taken {
            Some(mut ldap) => {
                ldap.unbind().await?;
                tracing::debug!(url = %self.settings.url, "LDAP session closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ldap_and_ldaps() {
        assert!(LdapDirectory::new(LdapSettings::new("ldaps://dc1.example.com:636")).is_ok());
        assert!(LdapDirectory::new(LdapSettings::new("ldap://dc1.example.com")).is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        let err = LdapSettings::new("http://dc1.example.com").validate().unwrap_err();
        assert!(matches!(err, DirectoryError::Configuration(_)));

        let err = LdapSettings::new("ldaps://").validate().unwrap_err();
        assert!(matches!(err, DirectoryError::Configuration(_)));
    }

    #[tokio::test]
    async fn operations_before_bind_fail() {
        let directory = LdapDirectory::new(LdapSettings::new("ldap://dc1.example.com")).unwrap();
        let spec = SearchSpec::subtree("DC=example,DC=com", "(objectClass=*)");

        let err = directory.search(&spec, None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotBound));
        assert!(directory.unbind().await.is_ok());
    }
}
