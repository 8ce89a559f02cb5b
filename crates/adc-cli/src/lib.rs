//! # adc-cli
//!
//! Command-line tool for Active Directory administration.
//!
//! This crate provides the `adc` binary for:
//! - User lookup, listing, creation, update and rename
//! - Group lookup, listing, creation, update and rename
//! - Batched group membership changes
//! - Inspecting the client configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
