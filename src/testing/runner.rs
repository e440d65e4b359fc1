//! Suite orchestration
//!
//! A run goes through init, build, one pass per discovered case, the
//! coverage report and cleanup. Per-case problems never abort the run; they
//! end up as a verdict and are counted.

use std::path::{Path, PathBuf};

use super::baseline;
use super::build::Builder;
use super::compare::{compare, Comparison};
use super::exec::{self, read_lossy, ExecutionResult};
use super::memcheck::{check_memory, DiagnosticKind, MemcheckContext, MemcheckTool};
use super::report::{CaseOutcome, CoverageSummary, FailReason, RunReport, UnknownReason, Verdict};
use super::settings::RunSettings;
use super::suite::{discover, Suite, TestCase};
use super::triage::{Event, Prompt, TriageConsole};
use crate::common::config::{Config, Layout};
use crate::common::{paths, Result};

/// Everything one suite run needs
struct SuiteRun<'a> {
    suite: Suite,
    layout: Layout,
    binary: PathBuf,
    memcheck: Option<MemcheckTool>,
    settings: RunSettings,
    console: &'a mut dyn TriageConsole,
}

/// Run every case of `suite` found under `workdir`
///
/// Only a console failure ends the run early. The coverage report and
/// cleanup still happen before that error is returned; everything else is
/// recorded in the returned report.
pub async fn run_suite(
    config: &Config,
    workdir: &Path,
    suite: Suite,
    console: &mut dyn TriageConsole,
) -> Result<RunReport> {
    tracing::info!("Initializing {} run in {}", suite, workdir.display());
    let layout = config.layout.resolved(workdir);
    let mut settings = RunSettings::new(&config.features);

    let memcheck = if settings.memcheck() {
        match config.memcheck_tool(workdir) {
            Some(program) => Some(MemcheckTool::new(program, &config.memcheck)),
            None => {
                tracing::warn!(
                    "Memory checker '{}' not found; running without it",
                    config.memcheck.tool.display()
                );
                settings.disable_memcheck();
                console.show(Event::MemcheckDisabled {
                    reason: "memory checker not found",
                });
                None
            }
        }
    } else {
        None
    };

    let builder = Builder::new(&config.build, workdir);
    tracing::info!("Building {}", suite.build_target());
    if !builder.build(suite).await {
        tracing::warn!("Build failed; continuing with whatever binaries exist");
    }

    console.show(Event::SuiteStarted { suite });

    let suite_scratch = layout.scratch_dir.join(suite.dir_name());
    if let Err(e) = std::fs::create_dir_all(&suite_scratch) {
        tracing::warn!("Could not create {}: {}", suite_scratch.display(), e);
    }

    let binary = layout.binary_dir.join(suite.binary_name());
    let cases = discover(&layout, suite);

    let mut run = SuiteRun {
        suite,
        layout,
        binary,
        memcheck,
        settings,
        console,
    };

    let mut summary = CoverageSummary::default();
    let mut outcomes = Vec::with_capacity(cases.len());

    let interrupted = run.run_cases(&cases, &mut summary, &mut outcomes).await;
    if let Err(e) = &interrupted {
        tracing::error!(
            "Operator console failed, stopping after {} cases: {}",
            summary.run,
            e
        );
    }

    tracing::info!("Reporting {} cases", summary.run);
    run.console.show(Event::Summary { summary: &summary });

    run.cleanup(&builder).await;
    interrupted?;

    Ok(RunReport {
        suite: run.suite.to_string(),
        summary,
        cases: outcomes,
    })
}

impl SuiteRun<'_> {
    /// Run cases in order until they are exhausted or the console fails
    async fn run_cases(
        &mut self,
        cases: &[TestCase],
        summary: &mut CoverageSummary,
        outcomes: &mut Vec<CaseOutcome>,
    ) -> Result<()> {
        for case in cases {
            let outcome = self.run_case(case).await?;
            summary.record(&outcome.verdict);
            self.console.show(Event::Verdict {
                verdict: &outcome.verdict,
            });
            outcomes.push(outcome);
        }
        Ok(())
    }

    async fn run_case(&mut self, case: &TestCase) -> Result<CaseOutcome> {
        self.console.show(Event::CaseStarted { input: &case.input });

        if let Err(e) = paths::ensure_parent(&case.actual) {
            tracing::warn!("Could not create {}: {}", case.actual.display(), e);
        }

        let input_text = read_lossy(&case.input).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            String::new()
        });

        let baseline = if case.has_baseline() {
            match read_lossy(&case.expected) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!("Treating unreadable baseline as missing: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let (verdict, diagnostic) = match baseline {
            None => self.run_without_baseline(case, &input_text).await?,
            Some(expected) => self.run_against_baseline(case, &input_text, &expected).await?,
        };

        Ok(CaseOutcome {
            input: case.input.clone(),
            verdict,
            diagnostic,
        })
    }

    /// First run of a case: show what it produced and offer to keep it
    async fn run_without_baseline(
        &mut self,
        case: &TestCase,
        input_text: &str,
    ) -> Result<(Verdict, Option<DiagnosticKind>)> {
        let execution = exec::execute(&self.binary, &case.input, &case.actual).await;
        baseline::present_first_run(case, input_text, &execution, self.console);

        let diagnostic = match &execution {
            Ok(result) => self.memory_check(case, input_text, result).await?,
            Err(_) => None,
        };

        baseline::offer_save(case, execution.is_ok(), &self.settings, self.console).await?;

        Ok((Verdict::Unknown(UnknownReason::MissingBaseline), diagnostic))
    }

    async fn run_against_baseline(
        &mut self,
        case: &TestCase,
        input_text: &str,
        expected: &str,
    ) -> Result<(Verdict, Option<DiagnosticKind>)> {
        let result = match exec::execute(&self.binary, &case.input, &case.actual).await {
            Ok(result) => result,
            Err(e) => {
                let message = e.to_string();
                self.console.show(Event::LaunchFailed { message: &message });
                return Ok((Verdict::Fail(FailReason::LaunchFailed { message }), None));
            }
        };

        let diagnostic = self.memory_check(case, input_text, &result).await?;

        if let exec::ExitStatus::Segfault { signal } = result.status {
            self.console.show(Event::Segfault {
                status: result.status,
            });
            self.console.show(Event::Input {
                path: &case.input,
                text: input_text,
            });
            return Ok((Verdict::Fail(FailReason::Segfault { signal }), diagnostic));
        }

        let verdict = match compare(expected, &result.output) {
            Comparison::Equal => Verdict::Pass,
            Comparison::Mismatch { expected, actual } => {
                self.console.show(Event::Mismatch {
                    expected: &expected,
                    actual: &actual,
                });
                self.console.show(Event::Input {
                    path: &case.input,
                    text: input_text,
                });
                self.console.present(Prompt::AcknowledgeMismatch).await?;
                Verdict::Fail(FailReason::OutputMismatch)
            }
        };

        Ok((verdict, diagnostic))
    }

    /// Run the memory checker if it is still enabled for this run
    async fn memory_check(
        &mut self,
        case: &TestCase,
        input_text: &str,
        result: &ExecutionResult,
    ) -> Result<Option<DiagnosticKind>> {
        if !self.settings.memcheck() {
            return Ok(None);
        }
        let Some(tool) = &self.memcheck else {
            return Ok(None);
        };

        let ctx = MemcheckContext {
            case,
            binary: &self.binary,
            input_text,
            output: &result.output,
        };
        let kind = check_memory(tool, ctx, &mut self.settings, self.console).await?;
        Ok(Some(kind))
    }

    /// Remove captured output and build products
    async fn cleanup(&mut self, builder: &Builder) {
        let scratch = self.layout.scratch_dir.join(self.suite.dir_name());
        self.console.show(Event::Cleanup { scratch: &scratch });

        if let Err(e) = std::fs::remove_dir_all(&scratch) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Could not remove {}: {}", scratch.display(), e);
            }
        }
        // Only succeeds once no other suite's output is left in it
        let _ = std::fs::remove_dir(&self.layout.scratch_dir);

        if !builder.clean().await {
            tracing::warn!("Cleaning build products failed");
        }
    }
}
