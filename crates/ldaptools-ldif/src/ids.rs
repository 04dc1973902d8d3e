//! Allocation of numeric user and group identifiers.
//!
//! Allocation is a point-in-time check against the system account databases. Nothing is
//! reserved, so two concurrent runs against the same pool can pick the same identifier.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use ldaptools_core::{Error, IdentifierKind, IdentifierPool};
use tracing::{debug, warn};

use crate::Result;

/// Source of identifiers that are already in use.
#[cfg_attr(test, mockall::automock)]
pub trait IdentifierSource {
    /// Returns a snapshot of every identifier of `kind` currently in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying database cannot be read.
    fn used_identifiers(&self, kind: IdentifierKind) -> Result<BTreeSet<u32>>;
}

/// The local passwd and group databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemAccountDatabase {
    /// Enumerate through the name service switch with `getent`, so accounts served by LDAP or
    /// other NSS modules are included.
    Nss,
    /// Read colon-separated database files directly.
    Files {
        /// Path of the passwd file.
        passwd: PathBuf,
        /// Path of the group file.
        group: PathBuf,
    },
}

impl SystemAccountDatabase {
    /// Uses `getent passwd` and `getent group`.
    #[must_use]
    pub const fn nss() -> Self {
        Self::Nss
    }

    /// Reads the given passwd and group files.
    #[must_use]
    pub fn files(passwd: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
        Self::Files {
            passwd: passwd.into(),
            group: group.into(),
        }
    }

    fn read(&self, kind: IdentifierKind) -> Result<(String, String)> {
        match self {
            Self::Nss => {
                let database = nss_database(kind);
                let output = Command::new("getent").arg(database).output()?;
                if !output.status.success() {
                    return Err(Error::tool_failure(
                        "getent",
                        output.status.code(),
                        &output.stderr,
                    ));
                }
                Ok((
                    format!("getent {database}"),
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                ))
            }
            Self::Files { passwd, group } => {
                let path = match kind {
                    IdentifierKind::User => passwd,
                    IdentifierKind::Group => group,
                };
                let text = fs::read_to_string(path).map_err(|err| {
                    Error::Io(format!("failed to read {}: {err}", path.display()))
                })?;
                Ok((path.display().to_string(), text))
            }
        }
    }
}

impl Default for SystemAccountDatabase {
    fn default() -> Self {
        Self::nss()
    }
}

impl IdentifierSource for SystemAccountDatabase {
    fn used_identifiers(&self, kind: IdentifierKind) -> Result<BTreeSet<u32>> {
        let (origin, text) = self.read(kind)?;
        let used = parse_database(&origin, &text);
        debug!("{} {kind}s in use according to {origin}", used.len());
        Ok(used)
    }
}

const fn nss_database(kind: IdentifierKind) -> &'static str {
    match kind {
        IdentifierKind::User => "passwd",
        IdentifierKind::Group => "group",
    }
}

/// Collects the third field of every `name:x:id:...` line.
fn parse_database(origin: &str, text: &str) -> BTreeSet<u32> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .filter_map(|(index, line)| match line.split(':').nth(2).map(str::parse::<u32>) {
            Some(Ok(id)) => Some(id),
            _ => {
                warn!("Skipping malformed entry at {origin}:{}", index + 1);
                None
            }
        })
        .collect()
}

/// Returns the lowest identifier in `pool` that is not in `used`.
#[must_use]
pub fn lowest_free(pool: IdentifierPool, used: &BTreeSet<u32>) -> Option<u32> {
    pool.iter().find(|id| !used.contains(id))
}

/// Allocates the lowest free identifier of `kind` in `pool`.
///
/// A fresh snapshot of used identifiers is taken on every call. An empty pool fails without
/// consulting the source.
///
/// # Errors
///
/// Returns [`Error::IdentifiersExhausted`] if every identifier in the pool is taken, or the
/// source's error if the snapshot cannot be read.
pub fn allocate(
    source: &dyn IdentifierSource,
    kind: IdentifierKind,
    pool: IdentifierPool,
) -> Result<u32> {
    if pool.is_empty() {
        return Err(Error::IdentifiersExhausted { kind, pool });
    }
    let used = source.used_identifiers(kind)?;
    let id = lowest_free(pool, &used).ok_or(Error::IdentifiersExhausted { kind, pool })?;
    debug!("Allocated {kind} {id} from {pool}");
    Ok(id)
}
