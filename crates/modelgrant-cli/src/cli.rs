//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

use crate::config::CONFIG_ENV;

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = CONFIG_ENV)]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Resource and configuration commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which handler would run for a desired configuration.
    Plan {
        /// TOML file with `model`, `access`, and `users`.
        #[arg(short, long)]
        file: String,
    },

    /// Grant access to every listed user.
    Create {
        /// TOML file with `model`, `access`, and `users`.
        #[arg(short, long)]
        file: String,
    },

    /// Refresh the stored state from the controller.
    Read,

    /// Apply changed users or access level.
    Update {
        /// TOML file with `model`, `access`, and `users`.
        #[arg(short, long)]
        file: String,
    },

    /// Revoke access for every stored user.
    Delete,

    /// Adopt an existing grant by its `<model>:<access>` identifier.
    Import {
        /// Identifier to import.
        id: String,
    },

    /// Print the resource schema as JSON.
    Schema,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "controller.snapshot_path").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_no_command() {
        let args = parse(&["modelgrant"]);
        assert!(args.command.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_create_with_file() {
        let args = parse(&["modelgrant", "-v", "create", "--file", "grant.toml"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Some(Command::Create { file }) if file == "grant.toml"));
    }

    #[test]
    fn test_import_id() {
        let args = parse(&["modelgrant", "import", "model1:admin"]);
        assert!(matches!(args.command, Some(Command::Import { id }) if id == "model1:admin"));
    }

    #[test]
    fn test_update_requires_file() {
        assert!(CliArgs::try_parse_from(["modelgrant", "update"]).is_err());
    }

    #[test]
    fn test_config_init_force() {
        let args = parse(&["modelgrant", "-c", "/tmp/c.toml", "config", "init", "--force"]);
        assert_eq!(args.config.as_deref(), Some("/tmp/c.toml"));
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Init { file, force },
            })) => {
                assert!(file.is_none());
                assert!(force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
