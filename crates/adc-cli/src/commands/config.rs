//! Configuration commands.

use crate::cli::{Cli, ConfigCommand};
use crate::config::{config_path, load, OutputFormat};
use crate::output::{info, output_single};

/// Runs a config command.
pub fn run_config(cmd: &ConfigCommand, cli: &Cli) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(cli),
        ConfigCommand::Path => {
            println!("{}", config_path(cli)?.display());
            Ok(())
        }
    }
}

/// Shows the effective configuration. The password is never printed.
fn show_config(cli: &Cli) -> crate::CliResult<()> {
    let config = load(cli)?;

    match cli.output {
        OutputFormat::Table => {
            info(&format!("Configuration file: {}", config_path(cli)?.display()));
            println!();
            print!("{}", config.to_toml_string()?);
            if !config.bind.password.is_empty() {
                println!();
                println!("# bind password: configured");
            }
            Ok(())
        }
        format => output_single(&config, format),
    }
}
