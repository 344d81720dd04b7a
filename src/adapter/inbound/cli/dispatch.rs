//! Entry point shared by the binary: flag handling and command routing.

use std::path::Path;

use super::command::{CheckCommand, Cli, Commands};
use super::diagnostic::ConfigDiagnostic;
use super::output::{self, OutputConfig};
use super::{check, up};
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::config::Config;

/// Apply the global flags and run the selected command.
pub async fn run(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(
        cli.json,
        cli.quiet,
        cli.verbose,
        cli.color.enabled() && !cli.json,
    ));

    match cli.command {
        Commands::Up(args) => up::execute(&args).await,
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(&arg.config),
    }
}

/// Load a config file, rendering a source-annotated diagnostic on failure.
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
    Config::parse_toml(&content).map_err(|e| {
        if output::is_json() {
            return e;
        }
        let name = path.display().to_string();
        let report = miette::Report::new(ConfigDiagnostic::from_error(&name, &content, &e));
        eprintln!("{report:?}");
        Error::Config(ConfigError::Other(format!("{name} is not a valid configuration")))
    })
}
