//! `ldaptools user` subcommands.

use clap::{Args, Subcommand};
use ldaptools_core::Result;
use ldaptools_ldif::{
    create_user, delete_user, generate_password, modify_user, NewUser, UserChanges, UserDetails,
    DEFAULT_PASSWORD_LENGTH,
};
use secrecy::{ExposeSecret, SecretString};

use super::Session;

/// User management commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a user
    Add(AddArgs),
    /// Modify a user
    Modify(ModifyArgs),
    /// Delete a user
    Delete(DeleteArgs),
}

/// Password options, at most one of which may be given
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// The user's password, hashed with slappasswd
    #[arg(short, long, conflicts_with_all = ["pwhash", "generate_password"])]
    pub passwd: Option<String>,

    /// An already hashed password
    #[arg(long, conflicts_with = "generate_password")]
    pub pwhash: Option<String>,

    /// Generate a random password and print it
    #[arg(long)]
    pub generate_password: bool,
}

impl CredentialArgs {
    /// Returns the plaintext password, generating and printing one if requested.
    fn plaintext(&self) -> Option<SecretString> {
        if self.generate_password {
            let password = generate_password(DEFAULT_PASSWORD_LENGTH);
            println!("Generated password: {}", password.expose_secret());
            return Some(password);
        }
        self.passwd.clone().map(SecretString::from)
    }
}

/// Optional descriptive attributes
#[derive(Args, Debug, Default)]
pub struct DetailArgs {
    /// Job title
    #[arg(long)]
    pub title: Option<String>,

    /// Telephone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Mobile number
    #[arg(long)]
    pub mobile: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Website
    #[arg(long)]
    pub website: Option<String>,
}

impl From<DetailArgs> for UserDetails {
    fn from(args: DetailArgs) -> Self {
        Self {
            title: args.title,
            phone: args.phone,
            mobile: args.mobile,
            address: args.address,
            description: args.description,
            website: args.website,
        }
    }
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// The user name
    pub login: String,

    /// The user's first name
    pub first_name: String,

    /// The user's last name
    pub last_name: String,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// The user's user ID
    #[arg(short, long)]
    pub uid: Option<u32>,

    /// The user's group ID
    #[arg(short, long)]
    pub gid: Option<u32>,

    /// The user's shell
    #[arg(short, long)]
    pub shell: Option<String>,

    /// The user's home directory, `{}` is replaced by the user name
    #[arg(short = 'd', long)]
    pub home: Option<String>,

    #[command(flatten)]
    pub details: DetailArgs,
}

/// Arguments for the modify command
#[derive(Args, Debug)]
pub struct ModifyArgs {
    /// The user name
    pub login: String,

    /// The user's new first name
    pub first_name: Option<String>,

    /// The user's new last name
    pub last_name: Option<String>,

    /// Rename the user
    #[arg(long)]
    pub new_name: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// The user's new user ID
    #[arg(short, long)]
    pub uid: Option<u32>,

    /// The user's new group ID
    #[arg(short, long)]
    pub gid: Option<u32>,

    /// The user's new shell
    #[arg(short, long)]
    pub shell: Option<String>,

    /// The user's new home directory
    #[arg(short = 'd', long)]
    pub home: Option<String>,

    #[command(flatten)]
    pub details: DetailArgs,
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// The user name
    pub login: String,
}

fn new_user(session: &Session, args: AddArgs) -> NewUser {
    let mut user = NewUser::new(args.login, args.first_name, args.last_name)
        .details(args.details.into());
    if let Some(passwd) = args.credentials.plaintext() {
        user = user.password(passwd);
    }
    if let Some(pwhash) = args.credentials.pwhash {
        user = user.password_hash(pwhash);
    }
    if let Some(uid) = args.uid {
        user = user.uid_number(uid);
    }
    if let Some(gid) = args.gid {
        user = user.gid_number(gid);
    }
    if let Some(shell) = args.shell {
        user = user.shell(shell);
    }
    if let Some(home) = args.home {
        user = user.home(home);
    }
    if let Some(ou) = session.ou() {
        user = user.ou(ou);
    }
    if let Some(domain) = session.domain() {
        user = user.domain(domain);
    }
    user
}

fn user_changes(session: &Session, args: ModifyArgs) -> UserChanges {
    let mut changes = UserChanges::new(args.login).details(args.details.into());
    if let Some(new_name) = args.new_name {
        changes = changes.rename(new_name);
    }
    if let Some(first_name) = args.first_name {
        changes = changes.first_name(first_name);
    }
    if let Some(last_name) = args.last_name {
        changes = changes.last_name(last_name);
    }
    if let Some(passwd) = args.credentials.plaintext() {
        changes = changes.password(passwd);
    }
    if let Some(pwhash) = args.credentials.pwhash {
        changes = changes.password_hash(pwhash);
    }
    if let Some(uid) = args.uid {
        changes = changes.uid_number(uid);
    }
    if let Some(gid) = args.gid {
        changes = changes.gid_number(gid);
    }
    if let Some(shell) = args.shell {
        changes = changes.shell(shell);
    }
    if let Some(home) = args.home {
        changes = changes.home(home);
    }
    if let Some(ou) = session.ou() {
        changes = changes.ou(ou);
    }
    if let Some(domain) = session.domain() {
        changes = changes.domain(domain);
    }
    changes
}

/// Runs a `user` subcommand.
pub async fn execute(session: &Session, args: UserArgs) -> Result<()> {
    let ctx = session.context();
    match args.command {
        UserCommands::Add(args) => {
            let document = create_user(&ctx, &new_user(session, args))?;
            session.add(&document).await
        }
        UserCommands::Modify(args) => {
            let document = modify_user(&ctx, &user_changes(session, args))?;
            session.modify(&document).await
        }
        UserCommands::Delete(args) => {
            let dn = delete_user(&ctx, &args.login, session.ou(), session.domain())?;
            session.delete(&dn).await
        }
    }
}
