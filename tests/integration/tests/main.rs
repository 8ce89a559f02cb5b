//! End-to-end tests for the directory client.
//!
//! Every test runs against the in-memory sample company directory, so no
//! server is needed.

mod common;
mod groups;
mod membership;
mod paging;
mod session;
mod users;
