//! Change records for POSIX user accounts.

use ldaptools_core::{Error, IdentifierKind};
use secrecy::SecretString;
use tracing::debug;

use crate::context::RecordContext;
use crate::dn::DistinguishedName;
use crate::ldif::{LdifDocument, Modification};
use crate::Result;

/// Descriptive attributes that are only written when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetails {
    /// Job title (`title`).
    pub title: Option<String>,
    /// Phone number (`telephoneNumber`).
    pub phone: Option<String>,
    /// Mobile number (`mobile`).
    pub mobile: Option<String>,
    /// Postal address (`postalAddress`).
    pub address: Option<String>,
    /// Free-form description (`description`).
    pub description: Option<String>,
    /// Website (`labeledURI`).
    pub website: Option<String>,
}

impl UserDetails {
    /// Attribute names paired with their values, in serialization order.
    fn attributes(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("title", self.title.as_deref()),
            ("telephoneNumber", self.phone.as_deref()),
            ("mobile", self.mobile.as_deref()),
            ("postalAddress", self.address.as_deref()),
            ("description", self.description.as_deref()),
            ("labeledURI", self.website.as_deref()),
        ]
    }
}

/// Request to create a user entry.
#[derive(Debug)]
pub struct NewUser {
    login: String,
    first_name: String,
    last_name: String,
    passwd: Option<SecretString>,
    pwhash: Option<String>,
    uid_number: Option<u32>,
    gid_number: Option<u32>,
    shell: Option<String>,
    home: Option<String>,
    ou: Option<String>,
    domain: Option<String>,
    details: UserDetails,
}

impl NewUser {
    /// Starts a request for `login` with the given first and last name.
    #[must_use]
    pub fn new(
        login: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            passwd: None,
            pwhash: None,
            uid_number: None,
            gid_number: None,
            shell: None,
            home: None,
            ou: None,
            domain: None,
            details: UserDetails::default(),
        }
    }

    /// Sets the plaintext password, hashed when the record is built.
    #[must_use]
    pub fn password(mut self, passwd: SecretString) -> Self {
        self.passwd = Some(passwd);
        self
    }

    /// Sets an already hashed password.
    #[must_use]
    pub fn password_hash(mut self, pwhash: impl Into<String>) -> Self {
        self.pwhash = Some(pwhash.into());
        self
    }

    /// Sets the user ID instead of allocating one.
    #[must_use]
    pub fn uid_number(mut self, uid: u32) -> Self {
        self.uid_number = Some(uid);
        self
    }

    /// Sets the primary group ID instead of allocating one.
    #[must_use]
    pub fn gid_number(mut self, gid: u32) -> Self {
        self.gid_number = Some(gid);
        self
    }

    /// Overrides the login shell.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Overrides the home directory template.
    #[must_use]
    pub fn home(mut self, home: impl Into<String>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Overrides the organizational unit.
    #[must_use]
    pub fn ou(mut self, ou: impl Into<String>) -> Self {
        self.ou = Some(ou.into());
        self
    }

    /// Overrides the domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the descriptive attributes.
    #[must_use]
    pub fn details(mut self, details: UserDetails) -> Self {
        self.details = details;
        self
    }
}

/// Request to change attributes of an existing user.
///
/// Only fields that are set produce a change.
#[derive(Debug)]
pub struct UserChanges {
    login: String,
    new_login: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    passwd: Option<SecretString>,
    pwhash: Option<String>,
    uid_number: Option<u32>,
    gid_number: Option<u32>,
    shell: Option<String>,
    home: Option<String>,
    ou: Option<String>,
    domain: Option<String>,
    details: UserDetails,
}

impl UserChanges {
    /// Starts an empty change set for `login`.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            new_login: None,
            first_name: None,
            last_name: None,
            passwd: None,
            pwhash: None,
            uid_number: None,
            gid_number: None,
            shell: None,
            home: None,
            ou: None,
            domain: None,
            details: UserDetails::default(),
        }
    }

    /// Renames the login.
    #[must_use]
    pub fn rename(mut self, new_login: impl Into<String>) -> Self {
        self.new_login = Some(new_login.into());
        self
    }

    /// Sets the new first name.
    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Sets the new last name.
    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Sets a new plaintext password.
    #[must_use]
    pub fn password(mut self, passwd: SecretString) -> Self {
        self.passwd = Some(passwd);
        self
    }

    /// Sets a new hashed password.
    #[must_use]
    pub fn password_hash(mut self, pwhash: impl Into<String>) -> Self {
        self.pwhash = Some(pwhash.into());
        self
    }

    /// Sets a new user ID.
    #[must_use]
    pub fn uid_number(mut self, uid: u32) -> Self {
        self.uid_number = Some(uid);
        self
    }

    /// Sets a new primary group ID.
    #[must_use]
    pub fn gid_number(mut self, gid: u32) -> Self {
        self.gid_number = Some(gid);
        self
    }

    /// Sets a new login shell.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Sets a new home directory. The value is written as given.
    #[must_use]
    pub fn home(mut self, home: impl Into<String>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Overrides the organizational unit of the entry.
    #[must_use]
    pub fn ou(mut self, ou: impl Into<String>) -> Self {
        self.ou = Some(ou.into());
        self
    }

    /// Overrides the domain of the entry.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets descriptive attributes to replace.
    #[must_use]
    pub fn details(mut self, details: UserDetails) -> Self {
        self.details = details;
        self
    }
}

/// Joins first and last name into a common name.
///
/// # Errors
///
/// Returns [`Error::IncompleteNameUpdate`] if exactly one of the two is given.
pub fn full_name(first_name: Option<&str>, last_name: Option<&str>) -> Result<Option<String>> {
    match (first_name, last_name) {
        (Some(first), Some(last)) => Ok(Some(format!("{first} {last}"))),
        (None, None) => Ok(None),
        _ => Err(Error::IncompleteNameUpdate),
    }
}

/// Substitutes `login` into a home directory template.
///
/// Both `{}` and `{name}` placeholders are replaced.
#[must_use]
pub fn expand_home(template: &str, login: &str) -> String {
    template.replace("{name}", login).replace("{}", login)
}

fn user_dn(
    ctx: &RecordContext<'_>,
    login: &str,
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<DistinguishedName> {
    let ou = ou.unwrap_or(&ctx.config().user.ou);
    Ok(DistinguishedName::for_user(login, ou, ctx.domain(domain)?).validated()?)
}

/// Builds the add record for a new user.
///
/// # Errors
///
/// Fails on ambiguous credentials, a missing domain, a login or OU that does not form a valid
/// distinguished name, or when identifier allocation or password
/// hashing fails.
pub fn create_user(ctx: &RecordContext<'_>, user: &NewUser) -> Result<LdifDocument> {
    let config = ctx.config();
    let dn = user_dn(ctx, &user.login, user.ou.as_deref(), user.domain.as_deref())?;
    let password = ctx.password_hash(user.passwd.as_ref(), user.pwhash.as_deref())?;
    let uid = ctx.identifier(IdentifierKind::User, user.uid_number)?;
    let gid = ctx.identifier(IdentifierKind::Group, user.gid_number)?;
    let shell = user.shell.as_deref().unwrap_or(&config.user.shell);
    let home = expand_home(user.home.as_deref().unwrap_or(&config.user.home), &user.login);

    let mut document = LdifDocument::for_entry(&dn);
    document
        .append_values("objectClass", &config.user.classes)
        .append("uid", &user.login)
        .append("cn", format!("{} {}", user.first_name, user.last_name))
        .append("sn", &user.last_name)
        .append("givenName", &user.first_name)
        .append("userPassword", password)
        .append("loginShell", shell)
        .append(IdentifierKind::User.attribute(), uid)
        .append(IdentifierKind::Group.attribute(), gid)
        .append("homeDirectory", home);
    for (name, value) in user.details.attributes() {
        document.append_optional(name, value);
    }

    debug!("Built add record for {dn} with uidNumber {uid}");
    Ok(document)
}

/// Builds the modify record for an existing user.
///
/// Changes are emitted in a fixed order: `uid`, `cn`, `sn`, `givenName`, `userPassword`,
/// `loginShell`, `uidNumber`, `gidNumber`, `homeDirectory`, then the descriptive attributes.
///
/// # Errors
///
/// Returns [`Error::IncompleteNameUpdate`] if only one of first and last name is given,
/// [`Error::AmbiguousCredentialInput`] if both a password and a hash are given, and propagates
/// hashing failures.
pub fn modify_user(ctx: &RecordContext<'_>, changes: &UserChanges) -> Result<LdifDocument> {
    let dn = user_dn(ctx, &changes.login, changes.ou.as_deref(), changes.domain.as_deref())?;
    let cn = full_name(changes.first_name.as_deref(), changes.last_name.as_deref())?;
    let password = if changes.passwd.is_some() || changes.pwhash.is_some() {
        Some(ctx.password_hash(changes.passwd.as_ref(), changes.pwhash.as_deref())?)
    } else {
        None
    };

    let mut modifications = Vec::new();
    let mut replace = |attribute: &str, value: Option<String>| {
        if let Some(value) = value {
            modifications.push(Modification::replace(attribute, value));
        }
    };
    replace("uid", changes.new_login.clone());
    replace("cn", cn);
    replace("sn", changes.last_name.clone());
    replace("givenName", changes.first_name.clone());
    replace("userPassword", password);
    replace("loginShell", changes.shell.clone());
    replace(
        IdentifierKind::User.attribute(),
        changes.uid_number.map(|uid| uid.to_string()),
    );
    replace(
        IdentifierKind::Group.attribute(),
        changes.gid_number.map(|gid| gid.to_string()),
    );
    replace("homeDirectory", changes.home.clone());
    for (name, value) in changes.details.attributes() {
        replace(name, value.map(str::to_string));
    }

    let mut document = LdifDocument::modify(&dn);
    for modification in &modifications {
        document.append_modification(modification);
    }

    debug!("Built modify record for {dn} with {} change(s)", modifications.len());
    Ok(document)
}

/// Returns the DN of the user entry to delete.
///
/// # Errors
///
/// Returns a configuration error if no domain is available, and
/// [`Error::MalformedDistinguishedName`] if the login or OU does not form a valid name.
pub fn delete_user(
    ctx: &RecordContext<'_>,
    login: &str,
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<DistinguishedName> {
    user_dn(ctx, login, ou, domain)
}
