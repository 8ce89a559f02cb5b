//! # adc-client
//!
//! Typed Active Directory client.
//!
//! [`DirectoryClient`] wraps any [`adc_directory::DirectoryCapability`]:
//!
//! - Point lookups of users and groups by id, DN or raw filter, with their
//!   group or member relations.
//! - Paged listings through [`PaginatedSearchAggregator`].
//! - Create, update and rename of entries.
//! - Batched membership changes, resolved concurrently and written once.
//!
//! Every directory call runs through [`SessionManager`], which rebinds and
//! retries once on a transient connection failure.
//!
//! ## Example
//!
//! ```no_run
//! use adc_client::{ClientConfig, DirectoryClient, GroupQuery};
//!
//! # async fn example() -> adc_client::ClientResult<()> {
//! let config = ClientConfig::builder()
//!     .url("ldaps://dc1.company.com:636")
//!     .bind_dn("CN=svc-adc,OU=Service,DC=company,DC=com")
//!     .bind_password("secret")
//!     .users_base("OU=People,DC=company,DC=com")
//!     .groups_base("OU=Groups,DC=company,DC=com")
//!     .build()?;
//!
//! let client = DirectoryClient::connect_ldap(config).await?;
//! let added = client.add_group_members("admins", ["jdoe", "asmith"]).await?;
//! let group = client.get_group(&GroupQuery::by_id("admins")).await?;
//! # let _ = (added, group);
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
mod group;
pub mod mapper;
pub mod membership;
pub mod model;
pub mod paging;
pub mod query;
pub mod session;
mod user;

pub use client::DirectoryClient;
pub use config::{BindAccount, ClientConfig, ClientConfigBuilder, EntityConfig, EntityKind};
pub use error::{ClientError, ClientResult};
pub use mapper::EntryMapper;
pub use membership::{MembershipChange, MembershipDelta};
pub use model::{Attributes, Group, Member, User, UserGroup};
pub use paging::PaginatedSearchAggregator;
pub use query::{GroupQuery, ListQuery, Lookup, UserQuery};
pub use session::{SessionManager, SessionState};
