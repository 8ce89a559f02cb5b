//! # adc-directory
//!
//! Directory capability for the AD client.
//!
//! This crate defines the [`DirectoryCapability`] trait consumed by
//! `adc-client`, the wire-neutral types it speaks (entries, search specs,
//! paging state), the error taxonomy, and two implementations:
//!
//! - [`LdapDirectory`]: a live directory over `ldap3`.
//! - [`FixtureDirectory`]: an in-memory directory keyed by filter string.
//!
//! ## Security
//!
//! - Filter values built from user input must go through
//!   [`escape_filter_value`] (RFC 4515).
//! - Bind passwords are passed through and never logged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod entry;
pub mod error;
pub mod filter;
pub mod fixture;
pub mod live;
pub mod search;

pub use capability::DirectoryCapability;
pub use entry::{Attribute, Entry};
pub use error::{DirectoryError, DirectoryResult};
pub use filter::{escape_filter_value, render_escaped, render_template, PLACEHOLDER};
pub use fixture::{CallCounts, FailureMode, FixtureDirectory, RecordedModify};
pub use live::{LdapDirectory, LdapSettings};
pub use search::{DerefAliases, PagingState, SearchPage, SearchScope, SearchSpec};
