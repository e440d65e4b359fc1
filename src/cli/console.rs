//! Terminal implementation of the triage console

use std::io::Write;

use async_trait::async_trait;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::common::{Error, Result};
use crate::testing::{
    CoverageSummary, DiagnosticKind, Event, FailReason, Prompt, TriageChoice, TriageConsole,
    Verdict,
};

const DIVIDER: &str = "--------------------------------------------------";
const SMALL_DIVIDER: &str = "---------------------";
const HASH_DIVIDER: &str = "##################################################";

/// Renders events on stdout and reads answers from stdin
pub struct TerminalConsole {
    stdin: Lines<BufReader<Stdin>>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TriageConsole for TerminalConsole {
    fn show(&mut self, event: Event<'_>) {
        match event {
            Event::SuiteStarted { suite } => {
                println!("{DIVIDER}");
                println!("Running {suite} tests...");
                if let Some(notice) = suite.notice() {
                    println!("{notice}");
                }
                println!("{DIVIDER}");
            }
            Event::CaseStarted { input } => {
                println!("Testing {}", input.display());
            }
            Event::MissingBaseline => {
                println!("{}", "Expected Output File Doesn't Exist".bright_magenta());
            }
            Event::Input { path, text } => {
                println!("{}", "Input File Appears Below:".bright_magenta());
                println!("{}", DIVIDER.green());
                if text.is_empty() {
                    println!("{}", format!("({} is empty)", path.display()).dimmed());
                } else {
                    print!("{}", numbered(text));
                }
                println!("{}", DIVIDER.green());
            }
            Event::Output { text } => {
                println!("{}", "Your Output:".bright_magenta());
                println!("{}", DIVIDER.green());
                print_block(text);
                println!("{}", DIVIDER.green());
            }
            Event::LaunchFailed { message } => {
                println!("{} {}", "Could not run the test binary:".red(), message);
            }
            Event::Mismatch { expected, actual } => {
                println!("{SMALL_DIVIDER}");
                println!("{}\n{}", "Expected:".green(), expected);
                println!("{SMALL_DIVIDER}");
                println!("{}\n{}", "Actual:".red(), actual);
                println!("{SMALL_DIVIDER}");
            }
            Event::Segfault { status } => {
                println!("{}", format!("FAILED - SEGFAULT ({status})").bright_red());
                println!(
                    "Consider running your program manually against this test case to better\n\
                     identify the cause of this segfault."
                );
            }
            Event::DiagnosticSummary { kind, summary } => {
                let (label, divider) = match kind {
                    DiagnosticKind::LeaksFound => (kind.to_string().red(), HASH_DIVIDER.red()),
                    _ => (kind.to_string().yellow(), HASH_DIVIDER.yellow()),
                };
                println!("{label}");
                println!("{divider}");
                print_block(summary);
                println!("{divider}");
            }
            Event::DiagnosticReport { text } => {
                println!("{}", DIVIDER.yellow());
                print_block(text);
                println!("{}", DIVIDER.yellow());
            }
            Event::MemcheckResult { kind } => {
                let result = match kind {
                    DiagnosticKind::NoLeaksPossible => "PASSED".green(),
                    DiagnosticKind::PassNoConcern => "PASSED".green(),
                    DiagnosticKind::LeaksFound => "FAILED".red(),
                    DiagnosticKind::Unknown => "UNKNOWN".yellow(),
                };
                if kind == DiagnosticKind::PassNoConcern {
                    println!("{}", "Some memory is still reachable.".blue());
                }
                println!("Memory Check : {result}");
            }
            Event::MemcheckDisabled { reason } => {
                println!("{}", format!("Memory checks disabled: {reason}").blue());
            }
            Event::BaselineSaved { path } => {
                println!("{}", format!("Output saved to {}.", path.display()).blue());
                println!("{}", HASH_DIVIDER.green());
            }
            Event::OutputDiscarded => {
                println!("{}", "Output deleted.".blue());
                println!("{}", HASH_DIVIDER.green());
            }
            Event::Verdict { verdict } => {
                println!("Test Case    : {}", verdict_label(verdict));
                println!("{DIVIDER}");
            }
            Event::Summary { summary } => print_summary(summary),
            Event::Cleanup { scratch } => {
                println!("Deleting the contents of {}", scratch.display());
                println!("Cleaning executables bin...");
            }
        }
    }

    async fn present(&mut self, prompt: Prompt) -> Result<TriageChoice> {
        if prompt == Prompt::SaveBaseline {
            println!("{}", HASH_DIVIDER.green());
        }
        println!("{}", prompt.instructions().blue());
        print!("{}", prompt.label());
        std::io::stdout()
            .flush()
            .map_err(|e| Error::Console(e.to_string()))?;

        let answer = self
            .stdin
            .next_line()
            .await
            .map_err(|e| Error::Console(e.to_string()))?
            .unwrap_or_default();

        Ok(TriageChoice::parse(prompt, &answer))
    }
}

fn verdict_label(verdict: &Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Pass => "PASSED".green(),
        Verdict::Fail(FailReason::Segfault { .. }) => "FAILED - SEGFAULT".red(),
        Verdict::Fail(_) => "FAILED".red(),
        Verdict::Unknown(_) => "UNKNOWN".yellow(),
    }
}

fn print_summary(summary: &CoverageSummary) {
    println!("{}", "COVERAGE REPORT:".blue().reversed());
    println!("Total tests run     : {}", summary.run);
    println!("Total tests passed  : {}", summary.passed);
    println!("Total tests failed  : {}", summary.failed);
    println!("Total tests unknown : {}", summary.unknown);
    println!("{DIVIDER}");
}

fn print_block(text: &str) {
    if text.ends_with('\n') || text.is_empty() {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

/// Number lines the way `cat -n` does
fn numbered(text: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| format!("{:>6}\t{}\n", i + 1, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_matches_cat_n() {
        assert_eq!(numbered("var x;\nx = 1;\n"), "     1\tvar x;\n     2\tx = 1;\n");
        assert_eq!(numbered("end"), "     1\tend\n");
        assert_eq!(numbered(""), "");
    }
}
