//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// hotconf - Inspect, convert and live-watch configuration files
#[derive(Parser, Debug)]
#[command(name = "hotconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the entries of a configuration file
    ///
    /// The format is taken from the file extension; files without one are
    /// read as JSON5.
    Inspect {
        /// Configuration file
        path: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Re-encode a configuration file in another format
    ///
    /// Examples:
    ///   hotconf convert app.json5 app.toml
    ///   hotconf convert app.yaml app.json5
    Convert {
        /// File to read
        source: PathBuf,

        /// File to write; its extension selects the output format
        destination: PathBuf,
    },

    /// Watch a configuration file and print every change until interrupted
    ///
    /// Every top-level entry is treated as reloadable.
    Watch {
        /// Configuration file
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_inspect_with_json() {
        let cli = Cli::parse_from(["hotconf", "inspect", "cfg.toml", "--json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Inspect {
                path: PathBuf::from("cfg.toml"),
                json: true,
            })
        );
    }

    #[test]
    fn parse_convert() {
        let cli = Cli::parse_from(["hotconf", "convert", "a.json5", "b.yaml"]);
        assert_eq!(
            cli.command,
            Some(Commands::Convert {
                source: PathBuf::from("a.json5"),
                destination: PathBuf::from("b.yaml"),
            })
        );
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["hotconf", "watch", "cfg.json5", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn no_command() {
        let cli = Cli::parse_from(["hotconf"]);
        assert!(cli.command.is_none());
    }
}
