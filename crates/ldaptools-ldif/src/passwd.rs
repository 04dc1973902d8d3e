//! Password hashing and credential resolution.

use std::path::PathBuf;
use std::process::Command;

use ldaptools_core::{Error, LdapToolsConfig};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::Result;

/// Length of generated passwords.
pub const DEFAULT_PASSWORD_LENGTH: usize = 8;

/// Turns a plaintext secret into a value suitable for `userPassword`.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher {
    /// Hashes `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalToolFailure`] if the hashing tool fails.
    fn hash(&self, secret: &SecretString) -> Result<String>;
}

/// Hashes passwords with OpenLDAP's `slappasswd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slappasswd {
    binary: PathBuf,
}

impl Slappasswd {
    /// Uses the `slappasswd` binary at `binary`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Uses `binaries.slappasswd` from the configuration.
    #[must_use]
    pub fn from_config(config: &LdapToolsConfig) -> Self {
        Self::new(&config.binaries.slappasswd)
    }

    fn tool_name(&self) -> String {
        self.binary.display().to_string()
    }
}

impl PasswordHasher for Slappasswd {
    fn hash(&self, secret: &SecretString) -> Result<String> {
        debug!("Hashing password with {}", self.binary.display());
        let output = Command::new(&self.binary)
            .arg("-s")
            .arg(secret.expose_secret())
            .output()
            .map_err(|err| Error::Io(format!("failed to run {}: {err}", self.tool_name())))?;

        if !output.status.success() {
            return Err(Error::tool_failure(
                self.tool_name(),
                output.status.code(),
                &output.stderr,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

/// Resolves the `userPassword` value from exactly one of a plaintext password or a hash.
///
/// A plaintext password is hashed with `hasher`; a hash is returned unchanged.
///
/// # Errors
///
/// Returns [`Error::AmbiguousCredentialInput`] if both or neither are given, and propagates
/// hashing failures.
pub fn resolve(
    hasher: &dyn PasswordHasher,
    passwd: Option<&SecretString>,
    pwhash: Option<&str>,
) -> Result<String> {
    match (passwd, pwhash) {
        (Some(secret), None) => hasher.hash(secret),
        (None, Some(hash)) => Ok(hash.to_string()),
        _ => Err(Error::AmbiguousCredentialInput),
    }
}

/// Generates a random alphanumeric password.
#[must_use]
pub fn generate_password(length: usize) -> SecretString {
    let password: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    SecretString::from(password)
}
