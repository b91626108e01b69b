//! ctxsync CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ctxsync::cli::{Cli, Commands, SyncArgs};
use ctxsync::runner;
use ctxsync::AnalysisReport;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ctxsync=debug" } else { "ctxsync=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> ctxsync::Result<String> {
    match &cli.command {
        Commands::Sync(args) => {
            let report = runner::run_analysis(&args.path, &args.scan_config())?;
            Ok(format_report(&report, args, false))
        }
        Commands::Check(args) => {
            let report = runner::check(&args.path, &args.scan_config())?;
            Ok(format_report(&report, args, true))
        }
    }
}

fn format_report(report: &AnalysisReport, args: &SyncArgs, dry_run: bool) -> String {
    let mut out = String::new();
    let verb = if dry_run { "Would write" } else { "Wrote" };

    if report.written.is_empty() {
        out.push_str("Everything up to date\n");
    } else {
        out.push_str(&format!("{} {} file(s):\n", verb, report.written.len()));
        for path in &report.written {
            let shown = path.strip_prefix(&args.path).unwrap_or(path);
            out.push_str(&format!("  {}\n", shown.display()));
        }
    }

    if !report.conflicts.is_empty() {
        out.push_str(&format!("{} naming conflict(s):\n", report.conflicts.len()));
        for conflict in &report.conflicts {
            out.push_str(&format!(
                "  [{}] {} -> {}\n",
                conflict.severity.label(),
                conflict.message,
                conflict.recommendation
            ));
        }
    }

    if !report.errors.is_empty() {
        out.push_str(&format!("{} file(s) skipped with errors:\n", report.errors.len()));
        for path in &report.errors {
            let shown = path.strip_prefix(&args.path).unwrap_or(path);
            out.push_str(&format!("  {}\n", shown.display()));
        }
    }

    out
}
