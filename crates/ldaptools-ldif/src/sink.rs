//! Hand-off of finished records to the directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use ldaptools_core::{Error, LdapToolsConfig};
use tokio::process::Command;
use tracing::{debug, info};

use crate::dn::DistinguishedName;
use crate::ldif::LdifDocument;
use crate::Result;

/// Applies add, modify and delete operations to the directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryMutationSink: Send + Sync {
    /// Adds the entry described by `document`, binding as `bind`.
    async fn add(&self, bind: &DistinguishedName, document: &LdifDocument) -> Result<()>;

    /// Applies the modify record `document`, binding as `bind`.
    async fn modify(&self, bind: &DistinguishedName, document: &LdifDocument) -> Result<()>;

    /// Deletes the entry `target`, binding as `bind`.
    async fn delete(&self, bind: &DistinguishedName, target: &DistinguishedName) -> Result<()>;
}

/// Sink backed by the OpenLDAP `ldapadd`, `ldapmodify` and `ldapdelete` utilities.
///
/// Each tool is asked to prompt for the bind password (`-W`), so stdin and stdout stay attached
/// to the terminal. Only stderr is captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapUtilities {
    ldapadd: PathBuf,
    ldapmodify: PathBuf,
    ldapdelete: PathBuf,
}

impl LdapUtilities {
    /// Uses the given tool binaries.
    #[must_use]
    pub fn new(
        ldapadd: impl Into<PathBuf>,
        ldapmodify: impl Into<PathBuf>,
        ldapdelete: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ldapadd: ldapadd.into(),
            ldapmodify: ldapmodify.into(),
            ldapdelete: ldapdelete.into(),
        }
    }

    /// Uses the binaries from the `[binaries]` section.
    #[must_use]
    pub fn from_config(config: &LdapToolsConfig) -> Self {
        let binaries = &config.binaries;
        Self::new(&binaries.ldapadd, &binaries.ldapmodify, &binaries.ldapdelete)
    }

    async fn apply_document(
        binary: &Path,
        bind: &DistinguishedName,
        document: &LdifDocument,
    ) -> Result<()> {
        // Removed when dropped, after the tool has exited.
        let file = document.write_temp_file()?;
        let bind = bind.to_string();
        run(
            binary,
            &[
                OsStr::new("-D"),
                OsStr::new(&bind),
                OsStr::new("-W"),
                OsStr::new("-f"),
                file.path().as_os_str(),
            ],
        )
        .await
    }
}

#[async_trait]
impl DirectoryMutationSink for LdapUtilities {
    async fn add(&self, bind: &DistinguishedName, document: &LdifDocument) -> Result<()> {
        Self::apply_document(&self.ldapadd, bind, document).await?;
        info!("Added {}", document.dn().unwrap_or("entry"));
        Ok(())
    }

    async fn modify(&self, bind: &DistinguishedName, document: &LdifDocument) -> Result<()> {
        Self::apply_document(&self.ldapmodify, bind, document).await?;
        info!("Modified {}", document.dn().unwrap_or("entry"));
        Ok(())
    }

    async fn delete(&self, bind: &DistinguishedName, target: &DistinguishedName) -> Result<()> {
        let bind = bind.to_string();
        let target = target.to_string();
        run(
            &self.ldapdelete,
            &[
                OsStr::new("-D"),
                OsStr::new(&bind),
                OsStr::new(&target),
                OsStr::new("-W"),
            ],
        )
        .await?;
        info!("Deleted {target}");
        Ok(())
    }
}

async fn run(binary: &Path, args: &[&OsStr]) -> Result<()> {
    let tool = binary.display().to_string();
    debug!("Running {tool} {args:?}");

    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| Error::Io(format!("failed to run {tool}: {err}")))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::tool_failure(
            tool,
            output.status.code(),
            &output.stderr,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind() -> DistinguishedName {
        DistinguishedName::for_admin("Manager", "example.com")
    }

    fn document() -> LdifDocument {
        let dn = DistinguishedName::for_group("staff", "Group", "example.com");
        let mut document = LdifDocument::for_entry(&dn);
        document.append("cn", "staff");
        document
    }

    #[test]
    fn from_config_uses_binaries_section() {
        let config = LdapToolsConfig::default();
        let sink = LdapUtilities::from_config(&config);
        assert_eq!(
            sink,
            LdapUtilities::new(
                &config.binaries.ldapadd,
                &config.binaries.ldapmodify,
                &config.binaries.ldapdelete
            )
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_tools_report_success() {
        let sink = LdapUtilities::new("true", "true", "true");
        sink.add(&bind(), &document()).await.unwrap();
        sink.modify(&bind(), &document()).await.unwrap();
        let target = DistinguishedName::for_user("jdoe", "People", "example.com");
        sink.delete(&bind(), &target).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_surfaces_exit_code() {
        let sink = LdapUtilities::new("false", "false", "false");
        let err = sink.add(&bind(), &document()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::ExternalToolFailure { code: Some(1), .. }
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_captures_stderr() {
        // `ls` on a missing path writes to stderr and exits non-zero
        let sink = LdapUtilities::new("true", "true", "ls");
        let target = DistinguishedName::for_user("jdoe", "People", "example.com");
        let err = sink.delete(&bind(), &target).await.unwrap_err();
        match err {
            Error::ExternalToolFailure { stderr, code, .. } => {
                assert!(code.is_some_and(|code| code != 0));
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_an_io_error() {
        let sink = LdapUtilities::new("/nonexistent/ldapadd", "true", "true");
        let err = sink.add(&bind(), &document()).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn mock_sink_receives_document() {
        let mut sink = MockDirectoryMutationSink::new();
        sink.expect_add()
            .withf(|bind, document| {
                bind.to_string() == "cn=Manager,dc=example,dc=com"
                    && document.dn() == Some("cn=staff,ou=Group,dc=example,dc=com")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        sink.add(&bind(), &document()).await.unwrap();
    }
}
