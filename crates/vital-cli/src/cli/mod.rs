use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::{Commands, ProfileCommands};

/// Top-level CLI parser for the `vitals` binary.
#[derive(Debug, Parser)]
#[command(name = "vitals", version, about = "Vitals - camera-based measurement sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (suppress warnings and notifications)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat, ProfileCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["vitals", "--format", "raw", "--verbose", "schema"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn replay_defaults() {
        let cli = Cli::try_parse_from(["vitals", "replay", "session.jsonl", "--quiet"])
            .expect("cli should parse");

        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.script.to_str(), Some("session.jsonl"));
        assert_eq!(args.profile_key, "health_profile");
        assert_eq!(args.user, "local-user");
        assert_eq!(args.max_restarts, 3);
        assert!(!args.dry_run);
        assert!(cli.quiet);
    }

    #[test]
    fn profile_subcommands_take_key() {
        let cli = Cli::try_parse_from(["vitals", "profile", "show", "--key", "alt"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Profile {
                action: ProfileCommands::Show { ref key }
            } if key == "alt"
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["vitals", "--format", "table", "schema"]).is_err());
    }
}
