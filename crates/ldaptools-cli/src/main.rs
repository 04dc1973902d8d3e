//! ldaptools - provision POSIX users and groups in an LDAP directory.
//!
//! Records are generated as LDIF and applied with the OpenLDAP client utilities, which prompt
//! for the administrator password.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use ldaptools_core::config::DEFAULT_CONFIG_PATH;
use ldaptools_core::{LdapToolsConfig, Result};
use tracing::error;

mod commands;
mod dry_run;
mod logging;

use commands::Session;

#[derive(Parser, Debug)]
#[command(name = "ldaptools", about = "Manage LDAP users and groups", version)]
struct Cli {
    /// Path to the configuration file [default: /etc/ldaptools.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the records instead of applying them
    #[arg(long, global = true)]
    dry_run: bool,

    /// The LDAP domain, e.g. example.com
    #[arg(short = 'm', long, global = true)]
    domain: Option<String>,

    /// The organizational unit of the entry
    #[arg(short, long, global = true)]
    ou: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage users
    User(commands::user::UserArgs),

    /// Manage groups
    Group(commands::group::GroupArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = run(cli).await {
        error!("{err}");
        std::process::exit(err.exit_code());
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<LdapToolsConfig> {
    match path {
        Some(path) => LdapToolsConfig::load(path),
        None => LdapToolsConfig::load_or_default(DEFAULT_CONFIG_PATH),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let session = Session::new(config, cli.dry_run, cli.domain, cli.ou);

    match cli.command {
        Commands::User(args) => commands::user::execute(&session, args).await,
        Commands::Group(args) => commands::group::execute(&session, args).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::commands::group::GroupCommands;
    use crate::commands::user::UserCommands;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parse_global_options() {
        let cli = Cli::parse_from([
            "ldaptools",
            "-c",
            "/tmp/ldaptools.toml",
            "-vv",
            "--dry-run",
            "-m",
            "example.com",
            "user",
            "delete",
            "jdoe",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ldaptools.toml")));
        assert_eq!(cli.verbose, 2);
        assert!(cli.dry_run);
        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        match cli.command {
            Commands::User(args) => {
                assert!(matches!(args.command, UserCommands::Delete(ref d) if d.login == "jdoe"));
            }
            Commands::Group(_) => panic!("expected user command"),
        }
    }

    #[test]
    fn cli_parse_global_options_after_subcommand() {
        let cli = Cli::parse_from(["ldaptools", "group", "delete", "staff", "-o", "Teams"]);
        assert_eq!(cli.ou.as_deref(), Some("Teams"));
        assert!(!cli.dry_run);
        match cli.command {
            Commands::Group(args) => {
                assert!(matches!(args.command, GroupCommands::Delete(ref d) if d.group == "staff"));
            }
            Commands::User(_) => panic!("expected group command"),
        }
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let path = PathBuf::from("/nonexistent/ldaptools.toml");
        assert!(load_config(Some(&path)).is_err());
    }
}
