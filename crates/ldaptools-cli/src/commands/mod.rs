//! Subcommand implementations.

use ldaptools_core::{LdapToolsConfig, Result};
use ldaptools_ldif::{
    DirectoryMutationSink, DistinguishedName, LdapUtilities, LdifDocument, RecordContext,
    Slappasswd, SystemAccountDatabase,
};

use crate::dry_run::DryRunSink;

pub mod group;
pub mod user;

/// Collaborators and global options shared by every subcommand.
pub struct Session {
    config: LdapToolsConfig,
    hasher: Slappasswd,
    ids: SystemAccountDatabase,
    sink: Box<dyn DirectoryMutationSink>,
    domain: Option<String>,
    ou: Option<String>,
}

impl Session {
    /// Creates a session that applies records with the configured LDAP utilities, or only prints
    /// them when `dry_run` is set.
    pub fn new(
        config: LdapToolsConfig,
        dry_run: bool,
        domain: Option<String>,
        ou: Option<String>,
    ) -> Self {
        let sink: Box<dyn DirectoryMutationSink> = if dry_run {
            Box::new(DryRunSink)
        } else {
            Box::new(LdapUtilities::from_config(&config))
        };
        Self::with_sink(config, sink, domain, ou)
    }

    fn with_sink(
        config: LdapToolsConfig,
        sink: Box<dyn DirectoryMutationSink>,
        domain: Option<String>,
        ou: Option<String>,
    ) -> Self {
        Self {
            hasher: Slappasswd::from_config(&config),
            ids: SystemAccountDatabase::nss(),
            config,
            sink,
            domain,
            ou,
        }
    }

    pub fn context(&self) -> RecordContext<'_> {
        RecordContext::new(&self.config, &self.hasher, &self.ids)
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn ou(&self) -> Option<&str> {
        self.ou.as_deref()
    }

    fn bind_dn(&self) -> Result<DistinguishedName> {
        self.context().bind_dn(self.domain())
    }

    pub async fn add(&self, document: &LdifDocument) -> Result<()> {
        let bind = self.bind_dn()?;
        self.sink.add(&bind, document).await
    }

    pub async fn modify(&self, document: &LdifDocument) -> Result<()> {
        let bind = self.bind_dn()?;
        self.sink.modify(&bind, document).await
    }

    pub async fn delete(&self, target: &DistinguishedName) -> Result<()> {
        let bind = self.bind_dn()?;
        self.sink.delete(&bind, target).await
    }
}
