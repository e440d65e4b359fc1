//! SIMPL test harness - runs compiler stage test suites against recorded
//! baselines
//!
//! Usage: `simpl-test <scanner|parser|typecheck>`

use clap::Parser;
use simpl_tester::commands::Cli;
use simpl_tester::{cli, common::logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    match cli::run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
