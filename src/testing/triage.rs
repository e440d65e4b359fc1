//! Operator triage surface
//!
//! The engine never touches the terminal. It describes what should be shown
//! through [`Event`]s and asks for decisions through [`Prompt`]s; the answer
//! comes back as a [`TriageChoice`], parsed once from free text at this
//! boundary.

use std::path::Path;

use async_trait::async_trait;

use super::exec::ExitStatus;
use super::memcheck::DiagnosticKind;
use super::report::{CoverageSummary, Verdict};
use super::suite::Suite;
use crate::common::Result;

/// A decision point where the operator is asked for input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// No baseline exists: save the captured output or discard it
    SaveBaseline,
    /// The diagnostic report was not recognised
    UnknownDiagnostic,
    /// Leaks were reported: view the full report or continue
    LeakDetails,
    /// After a leak: keep using the memory checker or stop
    ContinueMemcheck,
    /// Output mismatched; wait until the operator is ready
    AcknowledgeMismatch,
}

impl Prompt {
    /// Instructions shown with the prompt
    pub fn instructions(&self) -> &'static str {
        match self {
            Prompt::SaveBaseline => {
                "Type 'save' or 's' to save your output to an 'expected output' file.\n\
                 (Only do this if you believe your output is correct)\n\
                 Type anything else to delete your output file and continue testing."
            }
            Prompt::UnknownDiagnostic => {
                "To see the full valgrind output, type 'full'.\n\
                 Type 'no prompt' or 'np' if you don't want to be prompted for input\n\
                 when the valgrind output is not recognised.\n\
                 Type 'stop' to stop using valgrind.\n\
                 Type anything else to continue, or CTRL-C to quit."
            }
            Prompt::LeakDetails => {
                "To see the full valgrind output, type 'full'.\n\
                 Type anything else to continue, or CTRL-C to quit."
            }
            Prompt::ContinueMemcheck => {
                "Type 'stop' to stop using valgrind.\n\
                 Type anything else to continue, or CTRL-C to quit."
            }
            Prompt::AcknowledgeMismatch => "Type anything when you are ready to continue testing:",
        }
    }

    /// Label shown right before the operator types
    pub fn label(&self) -> &'static str {
        match self {
            Prompt::SaveBaseline => "Enter your choice here: ",
            Prompt::AcknowledgeMismatch => "",
            _ => "Enter your response here: ",
        }
    }
}

/// Operator decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageChoice {
    Save,
    Discard,
    Full,
    Stop,
    NoPrompt,
    Continue,
}

impl TriageChoice {
    /// Parse an operator answer in the context of `prompt`
    ///
    /// Only the tokens meaningful for that prompt are recognised. Anything
    /// else is a discard at the save prompt and a plain continue elsewhere.
    pub fn parse(prompt: Prompt, input: &str) -> Self {
        let answer = input.trim();
        match (prompt, answer) {
            (Prompt::SaveBaseline, "save" | "s") => TriageChoice::Save,
            (Prompt::SaveBaseline, _) => TriageChoice::Discard,
            (Prompt::UnknownDiagnostic | Prompt::LeakDetails, "full") => TriageChoice::Full,
            (Prompt::UnknownDiagnostic, "np" | "no prompt") => TriageChoice::NoPrompt,
            (Prompt::UnknownDiagnostic | Prompt::ContinueMemcheck, "stop") => TriageChoice::Stop,
            _ => TriageChoice::Continue,
        }
    }
}

/// Something the console should render
#[derive(Debug, Clone)]
pub enum Event<'a> {
    /// A suite is about to run
    SuiteStarted { suite: Suite },
    /// A case is about to run
    CaseStarted { input: &'a Path },
    /// No baseline was found for the case
    MissingBaseline,
    /// Contents of the input program
    Input { path: &'a Path, text: &'a str },
    /// Output captured from the subject
    Output { text: &'a str },
    /// The subject could not be executed
    LaunchFailed { message: &'a str },
    /// Expected and actual output differ
    Mismatch { expected: &'a str, actual: &'a str },
    /// The subject was killed by a signal
    Segfault { status: ExitStatus },
    /// Trailing lines of a diagnostic report that needs attention
    DiagnosticSummary { kind: DiagnosticKind, summary: &'a str },
    /// The whole diagnostic report, on request
    DiagnosticReport { text: &'a str },
    /// Memory check result line
    MemcheckResult { kind: DiagnosticKind },
    /// Memory checks are switched off for the rest of the run
    MemcheckDisabled { reason: &'a str },
    /// A first-run output was saved as the new baseline
    BaselineSaved { path: &'a Path },
    /// A first-run output was thrown away
    OutputDiscarded,
    /// Final verdict of a case
    Verdict { verdict: &'a Verdict },
    /// End-of-run coverage report
    Summary { summary: &'a CoverageSummary },
    /// Scratch output and build products are being removed
    Cleanup { scratch: &'a Path },
}

/// Human-in-the-loop surface used by the engine
#[async_trait]
pub trait TriageConsole: Send {
    /// Render an event
    fn show(&mut self, event: Event<'_>);

    /// Ask the operator to decide
    async fn present(&mut self, prompt: Prompt) -> Result<TriageChoice>;
}
