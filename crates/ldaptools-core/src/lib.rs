//! # ldaptools-core
//!
//! Core types and utilities shared by the ldaptools crates.
//!
//! This crate provides the error taxonomy, the identifier pool types and the configuration model
//! used when provisioning POSIX accounts in an LDAP directory.
//!
//! ## Modules
//!
//! - [`error`] - Error types and exit code mapping
//! - [`types`] - Identifier kinds and pools
//! - [`config`] - Configuration file model, defaults and loading

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::LdapToolsConfig;
pub use error::{Error, Result};
pub use types::{IdentifierKind, IdentifierPool};
