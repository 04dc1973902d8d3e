//! LDIF generation for POSIX user and group accounts.
//!
//! This crate provides the distinguished name and LDIF document models, allocation of numeric
//! user/group identifiers, password hashing, the record builders that assemble complete change
//! documents, and the sink that hands finished documents to the OpenLDAP client utilities.

#![deny(missing_docs)]

mod context;
mod dn;
mod group;
mod ids;
mod ldif;
mod passwd;
mod sink;
mod user;

pub use context::RecordContext;
pub use dn::{
    domain_components, DistinguishedName, DistinguishedNameError, DnAttribute, DnComponent,
};
pub use group::{
    add_members, create_group, delete_group, modify_group, remove_members, GroupChanges, NewGroup,
};
pub use ids::{allocate, lowest_free, IdentifierSource, SystemAccountDatabase};
pub use ldif::{
    ChangeOperation, LdifAttribute, LdifDocument, LdifEntry, Modification, LINE_SEPARATOR,
};
pub use passwd::{
    generate_password, resolve, PasswordHasher, Slappasswd, DEFAULT_PASSWORD_LENGTH,
};
pub use sink::{DirectoryMutationSink, LdapUtilities};
pub use user::{
    create_user, delete_user, expand_home, full_name, modify_user, NewUser, UserChanges, UserDetails,
};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = ldaptools_core::Result<T>;
