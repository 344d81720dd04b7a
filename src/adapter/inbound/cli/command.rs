//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Local cluster bootstrapper for the scheduler / object store / worker runtime
#[derive(Parser, Debug)]
#[command(name = "hatchery")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Whether styling should be applied to stdout.
    #[must_use]
    pub fn enabled(self) -> bool {
        use std::io::IsTerminal;

        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a cluster and keep it running until interrupted
    Up(UpArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate a configuration file without launching anything
    Config(ConfigPathArg),
}

#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the cluster configuration file
    #[arg(short, long, default_value = "cluster.toml")]
    pub config: PathBuf,
}

#[derive(Parser, Debug, Default)]
pub struct UpArgs {
    /// Path to the cluster configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of object stores to start
    #[arg(long)]
    pub objstores: Option<usize>,

    /// Workers to start per object store
    #[arg(long)]
    pub workers: Option<usize>,

    /// Program each worker runs
    #[arg(long)]
    pub worker_program: Option<PathBuf>,

    /// Join an existing scheduler instead of launching one
    #[arg(long)]
    pub scheduler_address: Option<String>,

    /// Return one driver per object store instead of the implicit driver
    #[arg(long)]
    pub return_drivers: bool,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
