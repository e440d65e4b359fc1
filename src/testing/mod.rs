//! Test execution and classification engine
//!
//! Runs a compiler stage against every input program of a suite, compares
//! the captured output with recorded baselines, optionally classifies a
//! memory checker's report, and tallies the results. Anything that needs a
//! human goes through the [`TriageConsole`] capability.

pub mod baseline;
pub mod build;
pub mod compare;
pub mod exec;
pub mod memcheck;
pub mod report;
pub mod runner;
pub mod settings;
pub mod suite;
pub mod triage;

pub use compare::{compare, normalize, Comparison};
pub use exec::{ExecutionResult, ExitStatus};
pub use memcheck::{classify, DiagnosticKind};
pub use report::{CaseOutcome, CoverageSummary, FailReason, RunReport, UnknownReason, Verdict};
pub use runner::run_suite;
pub use settings::RunSettings;
pub use suite::{Suite, TestCase};
pub use triage::{Event, Prompt, TriageChoice, TriageConsole};
