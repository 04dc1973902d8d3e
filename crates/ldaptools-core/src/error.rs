//! Error types for ldaptools operations.
//!
//! Every failure in the record builders, the identifier allocator, the password hash provider and
//! the directory mutation sink surfaces as one [`Error`] variant. The command line layer maps each
//! variant to a process exit code via [`Error::exit_code`].

use thiserror::Error;

use crate::types::{IdentifierKind, IdentifierPool};

/// Main error type for ldaptools operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A distinguished name had an invalid, unknown or duplicated component
    #[error("Malformed distinguished name: {0}")]
    MalformedDistinguishedName(String),

    /// Every identifier in the pool is already in use
    #[error("{kind}s exhausted: no free identifier in {pool}")]
    IdentifiersExhausted {
        /// Kind of identifier that was requested
        kind: IdentifierKind,
        /// Pool that was searched
        pool: IdentifierPool,
    },

    /// Zero or both of plaintext password and password hash were supplied
    #[error("Must specify either a password or a password hash, but not both")]
    AmbiguousCredentialInput,

    /// Only one of first and last name was supplied for a name change
    #[error("Must specify both first and last name or neither")]
    IncompleteNameUpdate,

    /// An external tool exited unsuccessfully
    #[error("{tool} failed{}: {}", exit_suffix(.code.as_ref()), .stderr.trim_end())]
    ExternalToolFailure {
        /// Tool that was invoked
        tool: String,
        /// Exit code, `None` if the process was killed by a signal
        code: Option<i32>,
        /// Captured error output
        stderr: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O failure while spawning a tool or writing a temporary file
    #[error("I/O error: {0}")]
    Io(String),
}

fn exit_suffix(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

/// Specialized result type for ldaptools operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedDistinguishedName(_) => "MALFORMED_DISTINGUISHED_NAME",
            Self::IdentifiersExhausted { .. } => "IDENTIFIERS_EXHAUSTED",
            Self::AmbiguousCredentialInput => "AMBIGUOUS_CREDENTIAL_INPUT",
            Self::IncompleteNameUpdate => "INCOMPLETE_NAME_UPDATE",
            Self::ExternalToolFailure { .. } => "EXTERNAL_TOOL_FAILURE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Process exit code the command line should terminate with.
    ///
    /// A failing external tool propagates its own exit code unchanged.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalToolFailure { code: Some(code), .. } => *code,
            Self::ExternalToolFailure { code: None, .. } => 1,
            Self::ConfigError(_) => 2,
            Self::MalformedDistinguishedName(_)
            | Self::AmbiguousCredentialInput
            | Self::IncompleteNameUpdate => 3,
            Self::IdentifiersExhausted { .. } => 4,
            Self::Io(_) => 5,
        }
    }

    /// Creates an [`Error::ExternalToolFailure`] from a finished process.
    #[must_use]
    pub fn tool_failure(tool: impl Into<String>, code: Option<i32>, stderr: &[u8]) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            code,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

// Conversions from external error types
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::MalformedDistinguishedName("x".to_string()).error_code(),
            "MALFORMED_DISTINGUISHED_NAME"
        );
        assert_eq!(
            Error::IdentifiersExhausted {
                kind: IdentifierKind::User,
                pool: IdentifierPool::DEFAULT,
            }
            .error_code(),
            "IDENTIFIERS_EXHAUSTED"
        );
        assert_eq!(
            Error::AmbiguousCredentialInput.error_code(),
            "AMBIGUOUS_CREDENTIAL_INPUT"
        );
        assert_eq!(
            Error::IncompleteNameUpdate.error_code(),
            "INCOMPLETE_NAME_UPDATE"
        );
        assert_eq!(
            Error::tool_failure("ldapadd", Some(68), b"").error_code(),
            "EXTERNAL_TOOL_FAILURE"
        );
        assert_eq!(Error::ConfigError("x".to_string()).error_code(), "CONFIG_ERROR");
        assert_eq!(Error::Io("x".to_string()).error_code(), "IO_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = Error::IdentifiersExhausted {
            kind: IdentifierKind::Group,
            pool: IdentifierPool::new(2000, 2005),
        };
        assert_eq!(err.to_string(), "GIDs exhausted: no free identifier in [2000, 2005)");

        let err = Error::tool_failure("/usr/bin/ldapadd", Some(68), b"Already exists (68)\n");
        assert_eq!(
            err.to_string(),
            "/usr/bin/ldapadd failed with exit code 68: Already exists (68)"
        );

        let err = Error::tool_failure("slappasswd", None, b"");
        assert_eq!(err.to_string(), "slappasswd failed (terminated by signal): ");
    }

    #[test]
    fn test_exit_code_propagates_tool_status() {
        assert_eq!(Error::tool_failure("ldapmodify", Some(32), b"").exit_code(), 32);
        assert_eq!(Error::tool_failure("ldapmodify", None, b"").exit_code(), 1);
    }

    #[test]
    fn test_exit_codes_by_kind() {
        assert_eq!(Error::ConfigError("x".to_string()).exit_code(), 2);
        assert_eq!(Error::AmbiguousCredentialInput.exit_code(), 3);
        assert_eq!(Error::IncompleteNameUpdate.exit_code(), 3);
        assert_eq!(
            Error::MalformedDistinguishedName("x".to_string()).exit_code(),
            3
        );
        assert_eq!(
            Error::IdentifiersExhausted {
                kind: IdentifierKind::User,
                pool: IdentifierPool::DEFAULT,
            }
            .exit_code(),
            4
        );
        assert_eq!(Error::Io("x".to_string()).exit_code(), 5);
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let converted: Error = err.into();
        assert!(matches!(converted, Error::Io(_)));
    }

    #[test]
    fn test_from_toml_error() {
        let err = toml::from_str::<toml::Table>("not = [valid").unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::ConfigError(_)));
    }

    #[test]
    fn test_error_clone() {
        let err = Error::tool_failure("ldapdelete", Some(32), b"No such object");
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
