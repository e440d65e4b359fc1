//! CLI command handling
//!
//! Validates the invocation, loads configuration and runs the requested
//! suite against the terminal console.

pub mod console;

use crate::commands::Cli;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing::{run_suite, Suite};

pub use console::TerminalConsole;

/// Run the CLI and return the process exit code
///
/// A wrong suite argument prints the usage text and is not an error.
pub async fn run(cli: Cli) -> Result<i32> {
    let suite = match cli.suite() {
        Ok(suite) => suite,
        Err(e) if e.is_usage() => {
            tracing::debug!("{}", e);
            println!("{}", Suite::usage());
            return Ok(0);
        }
        Err(e) => return Err(e),
    };

    let workdir = cli.workdir.canonicalize().map_err(|e| {
        Error::Config(format!(
            "Working directory '{}' is not accessible: {}",
            cli.workdir.display(),
            e
        ))
    })?;

    let mut config = Config::load(cli.config.as_deref(), &workdir)?;
    cli.apply(&mut config);

    let mut console = TerminalConsole::new();
    let report = run_suite(&config, &workdir, suite, &mut console).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(report.summary.exit_code(config.features.strict))
}
