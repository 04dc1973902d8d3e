//! Shared collaborators for the record builders.

use ldaptools_core::{IdentifierKind, LdapToolsConfig};
use secrecy::SecretString;

use crate::dn::DistinguishedName;
use crate::ids::{self, IdentifierSource};
use crate::passwd::{self, PasswordHasher};
use crate::Result;

/// Collaborators shared by every record builder.
///
/// The context borrows the configuration together with the password hasher and identifier
/// source. Builders resolve call-site arguments against it once per call.
#[derive(Clone, Copy)]
pub struct RecordContext<'a> {
    config: &'a LdapToolsConfig,
    hasher: &'a dyn PasswordHasher,
    ids: &'a dyn IdentifierSource,
}

impl<'a> RecordContext<'a> {
    /// Creates a context from its collaborators.
    #[must_use]
    pub fn new(
        config: &'a LdapToolsConfig,
        hasher: &'a dyn PasswordHasher,
        ids: &'a dyn IdentifierSource,
    ) -> Self {
        Self {
            config,
            hasher,
            ids,
        }
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &'a LdapToolsConfig {
        self.config
    }

    /// Resolves the domain, preferring `explicit` over `common.domain`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no domain is available.
    pub fn domain<'b>(&'b self, explicit: Option<&'b str>) -> Result<&'b str> {
        self.config.domain(explicit)
    }

    /// Resolves the `userPassword` value from a plaintext password or a hash.
    ///
    /// # Errors
    ///
    /// See [`passwd::resolve`].
    pub fn password_hash(
        &self,
        passwd: Option<&SecretString>,
        pwhash: Option<&str>,
    ) -> Result<String> {
        passwd::resolve(self.hasher, passwd, pwhash)
    }

    /// Returns `explicit` if set, otherwise allocates an identifier from the configured pool.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures.
    pub fn identifier(&self, kind: IdentifierKind, explicit: Option<u32>) -> Result<u32> {
        match explicit {
            Some(id) => Ok(id),
            None => ids::allocate(self.ids, kind, self.config.pool(kind)),
        }
    }

    /// Administrative bind DN, `cn=<common.master>,dc=...`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the domain or `common.master` is not available.
    pub fn bind_dn(&self, domain: Option<&str>) -> Result<DistinguishedName> {
        let master = self.config.master(None)?;
        Ok(DistinguishedName::for_admin(master, self.domain(domain)?).validated()?)
    }
}

#[cfg(test)]
mod tests {
    use ldaptools_core::Error;

    use super::*;
    use crate::ids::MockIdentifierSource;
    use crate::passwd::MockPasswordHasher;

    #[test]
    fn explicit_identifier_skips_allocation() {
        let config = LdapToolsConfig::default();
        let hasher = MockPasswordHasher::new();
        let mut ids = MockIdentifierSource::new();
        ids.expect_used_identifiers().never();

        let ctx = RecordContext::new(&config, &hasher, &ids);
        assert_eq!(ctx.identifier(IdentifierKind::User, Some(5000)).unwrap(), 5000);
    }

    #[test]
    fn identifier_is_allocated_from_configured_pool() {
        let mut config = LdapToolsConfig::default();
        config.group.min_gid = 3000;
        config.group.max_gid = 4000;
        let hasher = MockPasswordHasher::new();
        let mut ids = MockIdentifierSource::new();
        ids.expect_used_identifiers()
            .returning(|_| Ok([3000, 3001].into_iter().collect()));

        let ctx = RecordContext::new(&config, &hasher, &ids);
        assert_eq!(ctx.identifier(IdentifierKind::Group, None).unwrap(), 3002);
    }

    #[test]
    fn bind_dn_uses_master() {
        let config = LdapToolsConfig::default()
            .with_domain("example.com")
            .with_master("Manager");
        let hasher = MockPasswordHasher::new();
        let ids = MockIdentifierSource::new();

        let ctx = RecordContext::new(&config, &hasher, &ids);
        assert_eq!(
            ctx.bind_dn(None).unwrap().to_string(),
            "cn=Manager,dc=example,dc=com"
        );
        assert_eq!(
            ctx.bind_dn(Some("corp.example.net")).unwrap().to_string(),
            "cn=Manager,dc=corp,dc=example,dc=net"
        );
    }

    #[test]
    fn bind_dn_requires_master() {
        let config = LdapToolsConfig::default().with_domain("example.com");
        let hasher = MockPasswordHasher::new();
        let ids = MockIdentifierSource::new();

        let ctx = RecordContext::new(&config, &hasher, &ids);
        assert!(matches!(ctx.bind_dn(None), Err(Error::ConfigError(_))));
    }

    #[test]
    fn bind_dn_rejects_master_with_separators() {
        let config = LdapToolsConfig::default()
            .with_domain("example.com")
            .with_master("Manager,ou=Admins");
        let hasher = MockPasswordHasher::new();
        let ids = MockIdentifierSource::new();

        let ctx = RecordContext::new(&config, &hasher, &ids);
        assert!(matches!(
            ctx.bind_dn(None),
            Err(Error::MalformedDistinguishedName(_))
        ));
    }
}
