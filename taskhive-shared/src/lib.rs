//! # Taskhive Shared Library
//!
//! Shared types and business logic for the taskhive API server: database
//! models, authentication primitives, and the ownership rules that decide
//! which rows a caller may see or mutate.
//!
//! ## Module Organization
//!
//! - `models`: Database models (companies, users, tasks) and their CRUD operations
//! - `auth`: Password hashing, bearer tokens, request middleware, ownership rules
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the taskhive shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
