//! CLI argument definitions
//!
//! The suite is collected leniently so that a wrong arity or an unknown
//! suite name prints the usage text instead of a clap error.

use clap::Parser;
use std::path::PathBuf;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing::Suite;

#[derive(Parser, Debug)]
#[command(
    name = "simpl-test",
    about = "Run the SIMPL compiler test suites",
    version,
    long_about = None
)]
pub struct Cli {
    /// Test suite to run: scanner, parser or typecheck
    #[arg(value_name = "SUITE")]
    pub suites: Vec<String>,

    /// Do not run cases under the memory checker
    #[arg(long)]
    pub no_memcheck: bool,

    /// Discard first-run output instead of offering to save it
    #[arg(long)]
    pub no_save_prompt: bool,

    /// Do not prompt when a memory check report is not recognised
    #[arg(long)]
    pub no_details: bool,

    /// Exit with status 1 when any case fails
    #[arg(long)]
    pub strict: bool,

    /// Also print the coverage report as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory holding the input/ and output/ trees
    #[arg(long, short = 'C', default_value = ".")]
    pub workdir: PathBuf,

    /// Configuration file (default: ./simpl-test.toml, then the user config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// The single suite this invocation asks for
    pub fn suite(&self) -> Result<Suite> {
        match self.suites.as_slice() {
            [name] => name.parse(),
            other => Err(Error::InvalidArity(other.len())),
        }
    }

    /// Apply command-line switches on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if self.no_memcheck {
            config.features.memcheck = false;
        }
        if self.no_save_prompt {
            config.features.ask_to_save = false;
        }
        if self.no_details {
            config.features.request_details = false;
        }
        if self.strict {
            config.features.strict = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("simpl-test").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_single_suite() {
        assert_eq!(parse(&["parser"]).suite().unwrap(), Suite::Parser);
    }

    #[test]
    fn test_wrong_arity_is_usage_error() {
        assert!(matches!(parse(&[]).suite(), Err(Error::InvalidArity(0))));
        assert!(matches!(
            parse(&["scanner", "parser"]).suite(),
            Err(Error::InvalidArity(2))
        ));
    }

    #[test]
    fn test_unknown_suite_is_usage_error() {
        let err = parse(&["codegen"]).suite().unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&["scanner", "--no-memcheck", "--strict", "--no-save-prompt"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert!(!config.features.memcheck);
        assert!(!config.features.ask_to_save);
        assert!(config.features.request_details);
        assert!(config.features.strict);
    }
}
