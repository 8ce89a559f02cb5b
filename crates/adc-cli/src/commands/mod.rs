//! Command implementations.

pub mod config;
pub mod group;
pub mod user;

pub use config::run_config;
pub use group::run_group;
pub use user::run_user;

use adc_client::{ClientConfig, DirectoryClient, EntryMapper, ListQuery, Lookup};
use adc_directory::{Attribute, LdapDirectory};

use crate::cli::{AttributeArgs, ListArgs, LookupArgs};
use crate::{CliError, CliResult};

/// Connects and binds to the configured directory.
pub async fn connect(mut config: ClientConfig) -> CliResult<DirectoryClient<LdapDirectory>> {
    crate::config::resolve_password(&mut config)?;
    tracing::debug!(url = %config.url, bind_dn = %config.bind.dn, "connecting");
    Ok(DirectoryClient::connect_ldap(config).await?)
}

/// Parses `NAME=VALUE` pairs. Repeated names become multi-valued.
pub fn parse_attributes(args: &AttributeArgs) -> CliResult<Vec<Attribute>> {
    let mut pairs = Vec::with_capacity(args.attrs.len());
    for raw in &args.attrs {
        let (name, value) = raw.split_once('=').ok_or_else(|| {
            CliError::InvalidArgument(format!("expected NAME=VALUE, got '{raw}'"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CliError::InvalidArgument(format!(
                "missing attribute name in '{raw}'"
            )));
        }
        pairs.push((name.to_string(), value.to_string()));
    }
    Ok(EntryMapper::collect_attributes(pairs))
}

/// Builds replacements for `update`: the given values plus empty lists for
/// cleared names.
pub fn update_attributes(args: &AttributeArgs, clear: &[String]) -> CliResult<Vec<Attribute>> {
    let mut attributes = parse_attributes(args)?;
    for name in clear {
        if attributes.iter().any(|a| &a.name == name) {
            return Err(CliError::InvalidArgument(format!(
                "attribute '{name}' is both set and cleared"
            )));
        }
        attributes.push(Attribute::new(name.clone(), Vec::<String>::new()));
    }
    if attributes.is_empty() {
        return Err(CliError::InvalidArgument(
            "nothing to update; pass --attr or --clear".to_string(),
        ));
    }
    Ok(attributes)
}

impl From<LookupArgs> for Lookup {
    fn from(args: LookupArgs) -> Self {
        Self {
            id: args.id.unwrap_or_default(),
            dn: args.dn.unwrap_or_default(),
            filter: args.filter.unwrap_or_default(),
            attributes: args.attributes,
        }
    }
}

impl From<ListArgs> for ListQuery {
    fn from(args: ListArgs) -> Self {
        Self {
            filter: args.filter,
            attributes: args.attributes,
            page_size: args.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(values: &[&str]) -> AttributeArgs {
        AttributeArgs {
            attrs: values.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn parses_repeated_names() {
        let attributes =
            parse_attributes(&attrs(&["objectClass=top", "cn=a=b", "objectClass=group"])).unwrap();

        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].values, vec!["top", "group"]);
        assert_eq!(attributes[1].first(), Some("a=b"));
    }

    #[test]
    fn rejects_missing_separator() {
        let err = parse_attributes(&attrs(&["displayName"])).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn clear_adds_empty_values() {
        let attributes =
            update_attributes(&attrs(&["mail=a@company.com"]), &["description".to_string()])
                .unwrap();

        assert_eq!(attributes[1].name, "description");
        assert!(attributes[1].values.is_empty());
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(update_attributes(&attrs(&[]), &[]).is_err());
    }

    #[test]
    fn lookup_args_convert() {
        let lookup = Lookup::from(LookupArgs {
            id: None,
            dn: Some("OU=user1,DC=company,DC=com".to_string()),
            filter: None,
            attributes: None,
        });

        assert!(lookup.id.is_empty());
        assert_eq!(lookup.target(), "OU=user1,DC=company,DC=com");
    }
}
