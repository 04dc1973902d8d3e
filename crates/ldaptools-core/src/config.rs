//! Configuration structures for ldaptools.
//!
//! The configuration file is TOML with four sections:
//!
//! ```toml
//! [common]
//! domain = "example.com"
//! master = "admin"
//!
//! [user]
//! ou = "People"
//! shell = "/bin/bash"
//! home = "/home/{}"
//! classes = "top, person, organizationalPerson, inetOrgPerson, posixAccount, shadowAccount"
//! min_uid = 2000
//! max_uid = 65545
//!
//! [group]
//! ou = "Group"
//! classes = ["top", "posixGroup"]
//! min_gid = 2000
//! max_gid = 65545
//!
//! [binaries]
//! slappasswd = "/usr/bin/slappasswd"
//! ```
//!
//! Every key is optional. Builder parameters resolve from an explicit argument first, then from
//! this configuration, then from the built-in defaults.

use crate::types::{IdentifierKind, IdentifierPool, DEFAULT_MAX_ID, DEFAULT_MIN_ID};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::{Validate, ValidationError};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ldaptools.toml";

/// Default organizational unit for users.
pub const DEFAULT_USER_OU: &str = "People";
/// Default login shell.
pub const DEFAULT_SHELL: &str = "/bin/bash";
/// Default home directory template.
pub const DEFAULT_HOME: &str = "/home/{}";
/// Default object classes of user entries.
pub const DEFAULT_USER_CLASSES: &[&str] = &[
    "top",
    "person",
    "organizationalPerson",
    "inetOrgPerson",
    "posixAccount",
    "shadowAccount",
];

/// Default organizational unit for groups.
pub const DEFAULT_GROUP_OU: &str = "Group";
/// Default object classes of group entries.
pub const DEFAULT_GROUP_CLASSES: &[&str] = &["top", "posixGroup"];

/// Default path of the password hashing utility.
pub const DEFAULT_SLAPPASSWD: &str = "/usr/bin/slappasswd";
/// Default path of the entry creation utility.
pub const DEFAULT_LDAPADD: &str = "/usr/bin/ldapadd";
/// Default path of the entry modification utility.
pub const DEFAULT_LDAPMODIFY: &str = "/usr/bin/ldapmodify";
/// Default path of the entry deletion utility.
pub const DEFAULT_LDAPDELETE: &str = "/usr/bin/ldapdelete";

/// Complete ldaptools configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LdapToolsConfig {
    /// Settings shared by users and groups
    #[validate(nested)]
    pub common: CommonSection,

    /// User entry settings
    #[validate(nested)]
    pub user: UserSection,

    /// Group entry settings
    #[validate(nested)]
    pub group: GroupSection,

    /// Paths of the external utilities
    pub binaries: BinariesSection,
}

impl LdapToolsConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the text is not valid TOML or fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::ConfigError(format!("failed to read {}: {err}", path.display()))
        })?;
        debug!("loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Loads the configuration file at `path`, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file exists but cannot be read or is invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} not found, using built-in defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(Error::ConfigError(format!(
                "failed to access {}: {err}",
                path.display()
            ))),
        }
    }

    /// Resolves the LDAP domain, preferring `explicit` over `common.domain`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if neither is set.
    pub fn domain<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .or(self.common.domain.as_deref())
            .ok_or_else(|| missing_key("common.domain"))
    }

    /// Resolves the administrator common name, preferring `explicit` over `common.master`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if neither is set.
    pub fn master<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .or(self.common.master.as_deref())
            .ok_or_else(|| missing_key("common.master"))
    }

    /// Returns the configured identifier pool for `kind`.
    #[must_use]
    pub const fn pool(&self, kind: IdentifierKind) -> IdentifierPool {
        match kind {
            IdentifierKind::User => self.user.uid_pool(),
            IdentifierKind::Group => self.group.gid_pool(),
        }
    }

    /// Set the LDAP domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.common.domain = Some(domain.into());
        self
    }

    /// Set the administrator common name.
    #[must_use]
    pub fn with_master(mut self, master: impl Into<String>) -> Self {
        self.common.master = Some(master.into());
        self
    }
}

fn missing_key(key: &str) -> Error {
    Error::ConfigError(format!("`{key}` is not configured"))
}

/// The `[common]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommonSection {
    /// Dotted LDAP domain, e.g. `example.com`
    #[validate(length(min = 1))]
    pub domain: Option<String>,

    /// Common name of the administrative bind entry
    #[validate(length(min = 1))]
    pub master: Option<String>,
}

/// The `[user]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_uid_range"))]
pub struct UserSection {
    /// Organizational unit holding user entries
    #[validate(length(min = 1))]
    pub ou: String,

    /// Default login shell
    #[validate(length(min = 1))]
    pub shell: String,

    /// Home directory template, `{}` or `{name}` is replaced with the login
    #[validate(length(min = 1))]
    pub home: String,

    /// Object classes of new user entries
    #[validate(length(min = 1))]
    #[serde(deserialize_with = "deserialize_classes")]
    pub classes: Vec<String>,

    /// Lowest allocatable UID (inclusive)
    pub min_uid: u32,

    /// Highest allocatable UID (exclusive)
    pub max_uid: u32,
}

impl UserSection {
    /// UID allocation pool.
    #[must_use]
    pub const fn uid_pool(&self) -> IdentifierPool {
        IdentifierPool::new(self.min_uid, self.max_uid)
    }
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            ou: DEFAULT_USER_OU.to_string(),
            shell: DEFAULT_SHELL.to_string(),
            home: DEFAULT_HOME.to_string(),
            classes: owned(DEFAULT_USER_CLASSES),
            min_uid: DEFAULT_MIN_ID,
            max_uid: DEFAULT_MAX_ID,
        }
    }
}

/// The `[group]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_gid_range"))]
pub struct GroupSection {
    /// Organizational unit holding group entries
    #[validate(length(min = 1))]
    pub ou: String,

    /// Object classes of new group entries
    #[validate(length(min = 1))]
    #[serde(deserialize_with = "deserialize_classes")]
    pub classes: Vec<String>,

    /// Lowest allocatable GID (inclusive)
    pub min_gid: u32,

    /// Highest allocatable GID (exclusive)
    pub max_gid: u32,
}

impl GroupSection {
    /// GID allocation pool.
    #[must_use]
    pub const fn gid_pool(&self) -> IdentifierPool {
        IdentifierPool::new(self.min_gid, self.max_gid)
    }
}

impl Default for GroupSection {
    fn default() -> Self {
        Self {
            ou: DEFAULT_GROUP_OU.to_string(),
            classes: owned(DEFAULT_GROUP_CLASSES),
            min_gid: DEFAULT_MIN_ID,
            max_gid: DEFAULT_MAX_ID,
        }
    }
}

/// The `[binaries]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinariesSection {
    /// Password hashing utility
    pub slappasswd: PathBuf,
    /// Entry creation utility
    pub ldapadd: PathBuf,
    /// Entry modification utility
    pub ldapmodify: PathBuf,
    /// Entry deletion utility
    pub ldapdelete: PathBuf,
}

impl Default for BinariesSection {
    fn default() -> Self {
        Self {
            slappasswd: PathBuf::from(DEFAULT_SLAPPASSWD),
            ldapadd: PathBuf::from(DEFAULT_LDAPADD),
            ldapmodify: PathBuf::from(DEFAULT_LDAPMODIFY),
            ldapdelete: PathBuf::from(DEFAULT_LDAPDELETE),
        }
    }
}

fn validate_uid_range(section: &UserSection) -> std::result::Result<(), ValidationError> {
    validate_range(section.min_uid, section.max_uid)
}

fn validate_gid_range(section: &GroupSection) -> std::result::Result<(), ValidationError> {
    validate_range(section.min_gid, section.max_gid)
}

fn validate_range(min: u32, max: u32) -> std::result::Result<(), ValidationError> {
    if min <= max {
        Ok(())
    } else {
        Err(ValidationError::new("identifier_range")
            .with_message(Cow::Owned(format!("inverted identifier range [{min}, {max})"))))
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Normalizes a list of object class names.
///
/// Names are trimmed, empty names are dropped and repeated names keep their first position.
pub fn normalize_classes<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classes: Vec<String> = Vec::new();
    for item in items {
        let name = item.as_ref().trim();
        if !name.is_empty() && !classes.iter().any(|known| known == name) {
            classes.push(name.to_string());
        }
    }
    classes
}

/// Accepts either a TOML array or a comma separated string.
fn deserialize_classes<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Classes {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Classes::deserialize(deserializer)? {
        Classes::List(items) => normalize_classes(items),
        Classes::Csv(text) => normalize_classes(text.split(',')),
    })
}
