//! `ldaptools group` subcommands.

use clap::{Args, Subcommand};
use ldaptools_core::Result;
use ldaptools_ldif::{
    add_members, create_group, delete_group, modify_group, remove_members, GroupChanges, NewGroup,
};

use super::Session;

/// Group management commands
#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Add a group
    Add(AddArgs),
    /// Modify a group
    Modify(ModifyArgs),
    /// Delete a group
    Delete(DeleteArgs),
    /// Add members to a group
    AddMember(MemberArgs),
    /// Remove members from a group
    RemoveMember(MemberArgs),
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// The group name
    pub group: String,

    /// Initial member user names
    pub members: Vec<String>,

    /// The group ID
    #[arg(short, long)]
    pub gid: Option<u32>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for the modify command
#[derive(Args, Debug)]
pub struct ModifyArgs {
    /// The group name
    pub group: String,

    /// Rename the group
    #[arg(long)]
    pub new_name: Option<String>,

    /// The new group ID
    #[arg(short, long)]
    pub gid: Option<u32>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// The group name
    pub group: String,
}

/// Arguments for membership changes
#[derive(Args, Debug)]
pub struct MemberArgs {
    /// The group name
    pub group: String,

    /// Member user names
    #[arg(required = true)]
    pub members: Vec<String>,
}

fn new_group(session: &Session, args: AddArgs) -> NewGroup {
    let mut group = NewGroup::new(args.group).members(args.members);
    if let Some(gid) = args.gid {
        group = group.gid_number(gid);
    }
    if let Some(description) = args.description {
        group = group.description(description);
    }
    if let Some(ou) = session.ou() {
        group = group.ou(ou);
    }
    if let Some(domain) = session.domain() {
        group = group.domain(domain);
    }
    group
}

fn group_changes(session: &Session, args: ModifyArgs) -> GroupChanges {
    let mut changes = GroupChanges::new(args.group);
    if let Some(new_name) = args.new_name {
        changes = changes.rename(new_name);
    }
    if let Some(gid) = args.gid {
        changes = changes.gid_number(gid);
    }
    if let Some(description) = args.description {
        changes = changes.description(description);
    }
    if let Some(ou) = session.ou() {
        changes = changes.ou(ou);
    }
    if let Some(domain) = session.domain() {
        changes = changes.domain(domain);
    }
    changes
}

/// Runs a `group` subcommand.
pub async fn execute(session: &Session, args: GroupArgs) -> Result<()> {
    let ctx = session.context();
    let (ou, domain) = (session.ou(), session.domain());
    match args.command {
        GroupCommands::Add(args) => {
            let document = create_group(&ctx, &new_group(session, args))?;
            session.add(&document).await
        }
        GroupCommands::Modify(args) => {
            let document = modify_group(&ctx, &group_changes(session, args))?;
            session.modify(&document).await
        }
        GroupCommands::Delete(args) => {
            let dn = delete_group(&ctx, &args.group, ou, domain)?;
            session.delete(&dn).await
        }
        GroupCommands::AddMember(args) => {
            let document = add_members(&ctx, &args.group, &args.members, ou, domain)?;
            session.modify(&document).await
        }
        GroupCommands::RemoveMember(args) => {
            let document = remove_members(&ctx, &args.group, &args.members, ou, domain)?;
            session.modify(&document).await
        }
    }
}
