//! Integration tests comparing built records against LDIF fixtures.
//!
//! Identifiers are allocated from the passwd and group fixtures, so these tests exercise the
//! file-backed account database end to end.

use std::fs;
use std::path::PathBuf;

use ldaptools_core::{Error, IdentifierKind, IdentifierPool, LdapToolsConfig};
use ldaptools_ldif::{
    add_members, allocate, create_group, create_user, modify_user, LdifDocument, NewGroup,
    NewUser, PasswordHasher, RecordContext, SystemAccountDatabase, UserChanges, UserDetails,
    LINE_SEPARATOR,
};
use secrecy::{ExposeSecret, SecretString};

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load an LDIF fixture, normalized to the platform line separator.
fn load_ldif_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    let text = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read LDIF fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    text.lines().collect::<Vec<_>>().join(LINE_SEPARATOR)
}

fn account_database() -> SystemAccountDatabase {
    SystemAccountDatabase::files(fixtures_dir().join("passwd"), fixtures_dir().join("group"))
}

/// Deterministic stand-in for `slappasswd`.
struct PrefixHasher;

impl PasswordHasher for PrefixHasher {
    fn hash(&self, secret: &SecretString) -> ldaptools_ldif::Result<String> {
        Ok(format!("{{SSHA}}hashed:{}", secret.expose_secret()))
    }
}

fn config() -> LdapToolsConfig {
    LdapToolsConfig::default()
        .with_domain("example.com")
        .with_master("Manager")
}

fn assert_matches_fixture(document: &LdifDocument, fixture: &str) {
    assert_eq!(
        document.to_text(),
        load_ldif_fixture(fixture),
        "record does not match {fixture}"
    );
}

#[test]
fn test_create_user_matches_fixture() {
    let config = config();
    let database = account_database();
    let ctx = RecordContext::new(&config, &PrefixHasher, &database);

    let user = NewUser::new("mmuster", "Max", "Mustermann")
        .password(SecretString::from("changeme".to_string()))
        .details(UserDetails {
            title: Some("Systems Engineer".to_string()),
            phone: Some("+49 30 1234567".to_string()),
            ..UserDetails::default()
        });
    let document = create_user(&ctx, &user).expect("user record");

    assert_matches_fixture(&document, "create_user.ldif");
}

#[test]
fn test_modify_user_matches_fixture() {
    let config = config();
    let database = account_database();
    let ctx = RecordContext::new(&config, &PrefixHasher, &database);

    let changes = UserChanges::new("jdoe")
        .first_name("Jane")
        .last_name("Roe")
        .shell("/bin/zsh")
        .details(UserDetails {
            description: Some("On leave".to_string()),
            ..UserDetails::default()
        });
    let document = modify_user(&ctx, &changes).expect("modify record");

    assert_matches_fixture(&document, "modify_user.ldif");
}

#[test]
fn test_create_group_matches_fixture() {
    let config = config();
    let database = account_database();
    let ctx = RecordContext::new(&config, &PrefixHasher, &database);

    let group = NewGroup::new("developers")
        .description("Software developers")
        .add_member("jdoe")
        .add_member("asmith");
    let document = create_group(&ctx, &group).expect("group record");

    assert_matches_fixture(&document, "create_group.ldif");
}

#[test]
fn test_add_member_matches_fixture() {
    let config = config();
    let database = account_database();
    let ctx = RecordContext::new(&config, &PrefixHasher, &database);

    let document = add_members(&ctx, "staff", &["mmuster".to_string()], None, None)
        .expect("membership record");

    assert_matches_fixture(&document, "add_member.ldif");
}

#[test]
fn test_allocation_skips_fixture_identifiers() {
    let database = account_database();

    let uid = allocate(&database, IdentifierKind::User, IdentifierPool::DEFAULT).unwrap();
    assert_eq!(uid, 2002);

    let gid = allocate(&database, IdentifierKind::Group, IdentifierPool::new(2000, 2003)).unwrap();
    assert_eq!(gid, 2001);

    let err = allocate(&database, IdentifierKind::User, IdentifierPool::new(2000, 2002))
        .unwrap_err();
    assert_eq!(
        err,
        Error::IdentifiersExhausted {
            kind: IdentifierKind::User,
            pool: IdentifierPool::new(2000, 2002),
        }
    );
}
