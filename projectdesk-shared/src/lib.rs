//! # projectdesk shared library
//!
//! The authorization and resource-scoping core of projectdesk: who may see
//! which projects, tasks and comments, and who may change them.
//!
//! ## Module Organization
//!
//! - `models`: database models and their queries
//! - `auth`: principal, bearer tokens, visibility scoping, policy table
//! - `validation`: field and cross-field payload rules
//! - `hierarchy`: parent resolution for nested creation, cascading deletes
//! - `service`: the operation surface used by the API server
//! - `error`: the domain error taxonomy
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod service;
pub mod validation;

/// Current version of the projectdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
