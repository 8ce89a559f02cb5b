//! CLI configuration.
//!
//! The client config is read from `~/.adc/adc.toml` unless `--config` says
//! otherwise. `ADC_URL` and `ADC_BIND_DN` override the file; the password
//! comes from `ADC_BIND_PASSWORD` or an interactive prompt.

use std::path::PathBuf;

use adc_client::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Environment variable holding the bind password.
pub const PASSWORD_ENV: &str = "ADC_BIND_PASSWORD";

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}

/// Gets the default configuration file path.
pub fn default_config_path() -> CliResult<PathBuf> {
    let home = dirs_next::home_dir()
        .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".adc").join("adc.toml"))
}

/// Gets the configuration file path in effect.
pub fn config_path(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    }
}

/// Loads the config file and applies command-line overrides.
///
/// The password is not resolved here; see [`resolve_password`].
pub fn load(cli: &Cli) -> CliResult<ClientConfig> {
    let path = config_path(cli)?;
    if !path.exists() {
        return Err(CliError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let mut config = ClientConfig::load(&path)?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

/// Applies `--url` and `--bind-dn` (or their environment variables).
pub fn apply_overrides(config: &mut ClientConfig, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.url.clone_from(url);
    }
    if let Some(dn) = &cli.bind_dn {
        config.bind.dn.clone_from(dn);
    }
}

/// Fills the bind password from the environment or a prompt.
pub fn resolve_password(config: &mut ClientConfig) -> CliResult<()> {
    if !config.bind.password.is_empty() {
        return Ok(());
    }

    config.bind.password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => crate::output::prompt_password(&format!("Password for {}: ", config.bind.dn))?,
    };
    Ok(())
}
