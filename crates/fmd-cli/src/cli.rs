//! CLI argument definitions for the FMD QA checker.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fmd-qa",
    version,
    about = "Consistency checks for Full Material Declaration exports",
    long_about = "Check a Full Material Declaration export for internal consistency.\n\n\
                  Every substance line is grouped by declaration and material, checked \
                  against the compiled-in rules, and written back with derived totals \
                  and an Automated QA Comment."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a declaration export and write the annotated copy.
    Check(CheckArgs),

    /// List the compiled-in rules in execution order.
    Rules,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// CSV export to check.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Annotated output path (default: <INPUT stem>_checked.csv).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write a JSON run report.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Declaration keys evaluated per batch.
    ///
    /// Bounds peak memory on large exports. Never changes the output.
    #[arg(long = "batch-size", value_name = "N", default_value = "500")]
    pub batch_size: NonZeroUsize,

    /// Do not append a phrase the comment already carries.
    ///
    /// Makes re-running on an annotated export idempotent.
    #[arg(long = "skip-existing-comments")]
    pub skip_existing_comments: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
