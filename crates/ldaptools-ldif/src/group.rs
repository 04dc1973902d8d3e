//! Change records for POSIX groups.

use ldaptools_core::IdentifierKind;
use tracing::debug;

use crate::context::RecordContext;
use crate::dn::DistinguishedName;
use crate::ldif::{ChangeOperation, LdifDocument, Modification};
use crate::Result;

const MEMBER_ATTRIBUTE: &str = "memberUid";

/// Request to create a group entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    name: String,
    gid_number: Option<u32>,
    description: Option<String>,
    members: Vec<String>,
    ou: Option<String>,
    domain: Option<String>,
}

impl NewGroup {
    /// Starts a request for the group `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gid_number: None,
            description: None,
            members: Vec::new(),
            ou: None,
            domain: None,
        }
    }

    /// Sets the group ID instead of allocating one.
    #[must_use]
    pub fn gid_number(mut self, gid: u32) -> Self {
        self.gid_number = Some(gid);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a member login.
    #[must_use]
    pub fn add_member(mut self, member: impl Into<String>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Replaces the member list.
    #[must_use]
    pub fn members<I>(mut self, members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
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
}

/// Request to change attributes of an existing group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChanges {
    name: String,
    new_name: Option<String>,
    gid_number: Option<u32>,
    description: Option<String>,
    ou: Option<String>,
    domain: Option<String>,
}

impl GroupChanges {
    /// Starts an empty change set for the group `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_name: None,
            gid_number: None,
            description: None,
            ou: None,
            domain: None,
        }
    }

    /// Renames the group.
    #[must_use]
    pub fn rename(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    /// Sets a new group ID.
    #[must_use]
    pub fn gid_number(mut self, gid: u32) -> Self {
        self.gid_number = Some(gid);
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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
}

fn group_dn(
    ctx: &RecordContext<'_>,
    name: &str,
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<DistinguishedName> {
    let ou = ou.unwrap_or(&ctx.config().group.ou);
    Ok(DistinguishedName::for_group(name, ou, ctx.domain(domain)?).validated()?)
}

/// Builds the add record for a new group.
///
/// # Errors
///
/// Fails if no domain is available or identifier allocation fails.
pub fn create_group(ctx: &RecordContext<'_>, group: &NewGroup) -> Result<LdifDocument> {
    let dn = group_dn(ctx, &group.name, group.ou.as_deref(), group.domain.as_deref())?;
    let gid = ctx.identifier(IdentifierKind::Group, group.gid_number)?;

    let mut document = LdifDocument::for_entry(&dn);
    document
        .append("cn", &group.name)
        .append(IdentifierKind::Group.attribute(), gid)
        .append_values("objectClass", &ctx.config().group.classes)
        .append_optional("description", group.description.as_deref());
    if !group.members.is_empty() {
        document.append_values(MEMBER_ATTRIBUTE, &group.members);
    }

    debug!("Built add record for {dn} with gidNumber {gid}");
    Ok(document)
}

/// Builds the modify record for an existing group.
///
/// Changes are emitted as `cn`, `gidNumber`, `description`, for those that are set.
///
/// # Errors
///
/// Returns a configuration error if no domain is available.
pub fn modify_group(ctx: &RecordContext<'_>, changes: &GroupChanges) -> Result<LdifDocument> {
    let dn = group_dn(ctx, &changes.name, changes.ou.as_deref(), changes.domain.as_deref())?;

    let mut document = LdifDocument::modify(&dn);
    if let Some(new_name) = &changes.new_name {
        document.append_modification(&Modification::replace("cn", new_name));
    }
    if let Some(gid) = changes.gid_number {
        document.append_modification(&Modification::replace(
            IdentifierKind::Group.attribute(),
            gid,
        ));
    }
    if let Some(description) = &changes.description {
        document.append_modification(&Modification::replace("description", description));
    }
    Ok(document)
}

fn membership_change(
    ctx: &RecordContext<'_>,
    operation: ChangeOperation,
    name: &str,
    members: &[String],
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<LdifDocument> {
    let dn = group_dn(ctx, name, ou, domain)?;
    let mut document = LdifDocument::modify(&dn);
    if !members.is_empty() {
        document.append_modification(&Modification::new(operation, MEMBER_ATTRIBUTE, members));
    }
    debug!(
        "Built {} record for {} member(s) of {dn}",
        operation.as_str(),
        members.len()
    );
    Ok(document)
}

/// Builds a modify record that adds `members` to the group.
///
/// # Errors
///
/// Returns a configuration error if no domain is available.
pub fn add_members(
    ctx: &RecordContext<'_>,
    name: &str,
    members: &[String],
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<LdifDocument> {
    membership_change(ctx, ChangeOperation::Add, name, members, ou, domain)
}

/// Builds a modify record that removes `members` from the group.
///
/// # Errors
///
/// Returns a configuration error if no domain is available.
pub fn remove_members(
    ctx: &RecordContext<'_>,
    name: &str,
    members: &[String],
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<LdifDocument> {
    membership_change(ctx, ChangeOperation::Delete, name, members, ou, domain)
}

/// Returns the DN of the group entry to delete.
///
/// # Errors
///
/// Returns a configuration error if no domain is available, and a malformed name error if the
/// group name or OU does not form a valid distinguished name.
pub fn delete_group(
    ctx: &RecordContext<'_>,
    name: &str,
    ou: Option<&str>,
    domain: Option<&str>,
) -> Result<DistinguishedName> {
    group_dn(ctx, name, ou, domain)
}
