//! CLI argument definitions.

use std::path::PathBuf;

use annodb_cli::types::NameKind;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "annodb",
    version,
    about = "Annotation database driver - build, edit and dump time-coded annotation databases",
    long_about = "Build a demo annotation database, apply vocabulary edits and print\n\
                  the resulting debug strings.\n\n\
                  Also validates names and converts time stamps between tick rates."
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
    /// Build the demo database, edit its vocabulary and report the effect.
    Demo(DemoArgs),

    /// Check a string against one of the lexical name rules.
    CheckName(CheckNameArgs),

    /// Parse a time stamp and optionally convert it to another tick rate.
    Timestamp(TimestampArgs),
}

#[derive(Parser)]
pub struct DemoArgs {
    /// JSON file with database options (`tps`, `name`, `description`).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also print the full database debug string after the edits.
    #[arg(long = "dump")]
    pub dump: bool,
}

#[derive(Parser)]
pub struct CheckNameArgs {
    /// Which rule to apply.
    #[arg(value_enum, value_name = "KIND")]
    pub kind: NameKind,

    /// The string to check.
    #[arg(value_name = "VALUE")]
    pub value: String,
}

#[derive(Parser)]
pub struct TimestampArgs {
    /// Either a tick count or `HH:MM:SS:mmm`.
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Tick rate of a bare tick count.
    #[arg(long = "tps", default_value_t = annodb_model::DEFAULT_TPS)]
    pub tps: u32,

    /// Convert the parsed time stamp to this tick rate.
    #[arg(long = "to-tps", value_name = "TPS")]
    pub to_tps: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
