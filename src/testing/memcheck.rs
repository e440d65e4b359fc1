//! Memory diagnostic classification
//!
//! The memory checker (valgrind by default) is run around the same command
//! line as the subject. Only the tail of its report is inspected. Its text
//! format is not a stable contract, so classification is a substring
//! heuristic and anything it cannot place is escalated to the operator.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::exec::{read_lossy, run_captured};
use super::settings::RunSettings;
use super::suite::TestCase;
use super::triage::{Event, Prompt, TriageChoice, TriageConsole};
use crate::common::config::MemcheckConfig;
use crate::common::Result;

const ZERO_ERRORS: &str = "0 errors";
const NO_LEAKS_POSSIBLE: &str = "no leaks are possible";
const NOTHING_REACHABLE: &str = "still reachable: 0 bytes";

/// Classification of one diagnostic report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No errors and the tool states no leaks are possible
    NoLeaksPossible,
    /// No errors; some memory is still reachable but the program produced
    /// output
    PassNoConcern,
    /// A non-zero error count was reported
    LeaksFound,
    /// No errors, but the report matched none of the known patterns
    Unknown,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::NoLeaksPossible => "No leaks are possible",
            DiagnosticKind::PassNoConcern => "Some memory is still reachable",
            DiagnosticKind::LeaksFound => "Leaks found",
            DiagnosticKind::Unknown => "Unknown valgrind output",
        };
        f.write_str(s)
    }
}

/// Classify the tail of a diagnostic report
///
/// `output` is the subject's captured output for the same execution.
pub fn classify(summary: &str, output: &str) -> DiagnosticKind {
    if !reports_zero_errors(summary) {
        return DiagnosticKind::LeaksFound;
    }
    if summary.contains(NO_LEAKS_POSSIBLE) {
        return DiagnosticKind::NoLeaksPossible;
    }
    if !summary.contains(NOTHING_REACHABLE) && !output.is_empty() {
        return DiagnosticKind::PassNoConcern;
    }
    DiagnosticKind::Unknown
}

/// Whether `summary` contains a "0 errors" marker that is not the tail of a
/// larger count such as "10 errors"
fn reports_zero_errors(summary: &str) -> bool {
    summary.match_indices(ZERO_ERRORS).any(|(idx, _)| {
        summary[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_digit())
    })
}

/// Keep the last `n` lines of `text`
pub fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].concat()
}

/// A located memory checker and how to invoke it
#[derive(Debug, Clone)]
pub struct MemcheckTool {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub tail_lines: usize,
}

impl MemcheckTool {
    pub fn new(program: PathBuf, config: &MemcheckConfig) -> Self {
        Self {
            program,
            args: config.args.clone(),
            tail_lines: config.tail_lines,
        }
    }

    /// Run the tool around `<binary> <input>`, writing its report to
    /// `report`
    async fn run(&self, binary: &Path, input: &Path, report: &Path) -> Result<String> {
        let mut args: Vec<&OsStr> = self.args.iter().map(OsStr::new).collect();
        args.push(binary.as_os_str());
        args.push(input.as_os_str());

        run_captured(&self.program, &args, report).await?;
        read_lossy(report)
    }
}

/// Inputs to a memory check of one case
pub struct MemcheckContext<'a> {
    pub case: &'a TestCase,
    pub binary: &'a Path,
    pub input_text: &'a str,
    pub output: &'a str,
}

/// Run the memory checker for one case and escalate as needed
///
/// Operator answers may downgrade `settings`. The report file is removed
/// before returning.
pub async fn check_memory(
    tool: &MemcheckTool,
    ctx: MemcheckContext<'_>,
    settings: &mut RunSettings,
    console: &mut dyn TriageConsole,
) -> Result<DiagnosticKind> {
    let report_path = &ctx.case.memcheck_report;

    let report = match tool.run(ctx.binary, &ctx.case.input, report_path).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Memory check for {} failed: {}", ctx.case.input.display(), e);
            remove_report(report_path);
            console.show(Event::MemcheckResult {
                kind: DiagnosticKind::Unknown,
            });
            return Ok(DiagnosticKind::Unknown);
        }
    };

    let summary = tail(&report, tool.tail_lines);
    let kind = classify(&summary, ctx.output);
    tracing::debug!("{} memory check: {:?}", ctx.case.input.display(), kind);

    match kind {
        DiagnosticKind::NoLeaksPossible | DiagnosticKind::PassNoConcern => {}
        DiagnosticKind::Unknown => {
            console.show(Event::DiagnosticSummary {
                kind,
                summary: &summary,
            });
            console.show(Event::Input {
                path: &ctx.case.input,
                text: ctx.input_text,
            });
            console.show(Event::Output { text: ctx.output });

            if settings.request_details() {
                match console.present(Prompt::UnknownDiagnostic).await? {
                    TriageChoice::Full => console.show(Event::DiagnosticReport { text: &report }),
                    TriageChoice::NoPrompt => settings.disable_details(),
                    TriageChoice::Stop => {
                        settings.disable_memcheck();
                        console.show(Event::MemcheckDisabled {
                            reason: "stopped by operator",
                        });
                    }
                    _ => {}
                }
            }
        }
        DiagnosticKind::LeaksFound => {
            console.show(Event::DiagnosticSummary {
                kind,
                summary: &summary,
            });
            if console.present(Prompt::LeakDetails).await? == TriageChoice::Full {
                console.show(Event::DiagnosticReport { text: &report });
            }
            if console.present(Prompt::ContinueMemcheck).await? == TriageChoice::Stop {
                settings.disable_memcheck();
                console.show(Event::MemcheckDisabled {
                    reason: "stopped by operator",
                });
            }
        }
    }

    console.show(Event::MemcheckResult { kind });
    remove_report(report_path);
    Ok(kind)
}

fn remove_report(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}
