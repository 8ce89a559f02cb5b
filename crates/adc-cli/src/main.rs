//! # adc
//!
//! Command-line tool for Active Directory users, groups and memberships.

#![forbid(unsafe_code)]

use adc_cli::{
    cli::{Cli, Command},
    commands::{connect, run_config, run_group, run_user},
    config,
    output::error,
    CliResult,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    if let Command::Config(cmd) = &cli.command {
        return run_config(cmd, &cli);
    }

    let client = connect(config::load(&cli)?).await?;
    let result = match cli.command {
        Command::User(cmd) => run_user(cmd, &client, cli.output).await,
        Command::Group(cmd) => run_group(cmd, &client, cli.output).await,
        Command::Config(_) => Ok(()),
    };

    if let Err(e) = client.close().await {
        tracing::warn!(error = %e, "unbind failed");
    }
    result
}
