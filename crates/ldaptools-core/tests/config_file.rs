//! Integration tests for loading configuration files.

use std::path::PathBuf;

use ldaptools_core::config::{LdapToolsConfig, DEFAULT_LDAPDELETE, DEFAULT_LDAPMODIFY};
use ldaptools_core::{IdentifierKind, IdentifierPool};

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture() -> LdapToolsConfig {
    let path = fixtures_dir().join("ldaptools.toml");
    LdapToolsConfig::load(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

#[test]
fn test_common_section() {
    let config = load_fixture();
    assert_eq!(config.domain(None).unwrap(), "ad.example.org");
    assert_eq!(config.master(None).unwrap(), "Manager");
}

#[test]
fn test_user_section() {
    let config = load_fixture();
    assert_eq!(config.user.ou, "Staff");
    assert_eq!(config.user.shell, "/bin/zsh");
    assert_eq!(config.user.home, "/srv/home/{name}");
    assert_eq!(
        config.user.classes,
        vec![
            "top",
            "person",
            "organizationalPerson",
            "inetOrgPerson",
            "posixAccount",
            "shadowAccount"
        ]
    );
    assert_eq!(
        config.pool(IdentifierKind::User),
        IdentifierPool::new(10000, 20000)
    );
}

#[test]
fn test_group_section() {
    let config = load_fixture();
    assert_eq!(config.group.ou, "Groups");
    assert_eq!(config.group.classes, vec!["top", "posixGroup"]);
    assert_eq!(
        config.pool(IdentifierKind::Group),
        IdentifierPool::new(10000, 11000)
    );
}

#[test]
fn test_binaries_section_mixes_overrides_and_defaults() {
    let config = load_fixture();
    assert_eq!(
        config.binaries.slappasswd,
        PathBuf::from("/usr/sbin/slappasswd")
    );
    assert_eq!(
        config.binaries.ldapadd,
        PathBuf::from("/opt/openldap/bin/ldapadd")
    );
    assert_eq!(config.binaries.ldapmodify, PathBuf::from(DEFAULT_LDAPMODIFY));
    assert_eq!(config.binaries.ldapdelete, PathBuf::from(DEFAULT_LDAPDELETE));
}
