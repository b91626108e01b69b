//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ScanConfig;

/// Descriptor synchronizer for project trees
#[derive(Parser, Debug)]
#[command(name = "ctxsync")]
#[command(about = "Keeps per-directory and project descriptor files in sync with source code")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the tree and update descriptor files
    #[command(visible_alias = "u")]
    Sync(SyncArgs),

    /// Analyze without writing; report what would change
    #[command(visible_alias = "c")]
    Check(SyncArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Project root to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Additional directory names to ignore (repeatable)
    #[arg(long = "ignore", value_name = "DIR")]
    pub ignore: Vec<String>,

    /// Worker threads for extraction (defaults to available parallelism)
    #[arg(short, long, env = "CTXSYNC_JOBS")]
    pub jobs: Option<usize>,
}

impl SyncArgs {
    /// Build the scan configuration from the parsed flags
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::default();
        for dir in &self.ignore {
            config = config.with_ignore_dir(dir);
        }
        if let Some(jobs) = self.jobs {
            config = config.with_jobs(jobs);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_with_flags() {
        let cli =
            Cli::parse_from(["ctxsync", "sync", "/tmp/repo", "--ignore", "gen", "--jobs", "4"]);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.path, PathBuf::from("/tmp/repo"));
                assert_eq!(args.ignore, vec!["gen".to_string()]);
                assert_eq!(args.jobs, Some(4));
                let config = args.scan_config();
                assert!(config.ignore_dirs.contains("gen"));
                assert_eq!(config.jobs, Some(4));
            }
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_check_alias() {
        let cli = Cli::parse_from(["ctxsync", "c"]);
        assert!(matches!(cli.command, Commands::Check(_)));
    }
}
