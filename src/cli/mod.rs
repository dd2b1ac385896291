pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "Collects feed items by day and enriches them with language and places", long_about = None)]
pub struct Cli {
    /// Settings file (default: ~/.config/tributary/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect, trim, enrich and write every topic
    Run {
        #[command(flatten)]
        overrides: RunOverrides,
    },
    /// List configured topics and their sources
    Topics {
        /// JSON topic list
        #[arg(short, long)]
        topics: Option<PathBuf>,
    },
    /// Run the enrichment transforms on a single title
    Probe {
        /// Title text to enrich
        title: String,
    },
}

/// Command-line values taking precedence over the settings file.
#[derive(clap::Args, Debug, Default)]
pub struct RunOverrides {
    /// JSON topic list
    #[arg(short, long)]
    pub topics: Option<PathBuf>,

    /// Number of parallel feed fetchers
    #[arg(long)]
    pub collectors: Option<usize>,

    /// Number of parallel enrichment workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Calendar days to keep, today included
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Output directory for topic JSON files
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "tributary",
            "run",
            "--collectors",
            "8",
            "-w",
            "2",
            "--days",
            "5",
            "-o",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { overrides } => {
                assert_eq!(overrides.collectors, Some(8));
                assert_eq!(overrides.workers, Some(2));
                assert_eq!(overrides.days, Some(5));
                assert_eq!(overrides.output, Some(PathBuf::from("/tmp/out")));
                assert!(overrides.topics.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["tributary", "probe", "Hello", "--config", "my.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(cli.command, Commands::Probe { ref title } if title == "Hello"));
    }
}
