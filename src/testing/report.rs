//! Per-case verdicts and the coverage summary

use std::path::PathBuf;

use serde::Serialize;

use super::memcheck::DiagnosticKind;

/// Why a case failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailReason {
    /// The subject was killed by a signal; output was not compared
    Segfault { signal: i32 },
    /// Output differed from the baseline
    OutputMismatch,
    /// The subject could not be started at all
    LaunchFailed { message: String },
}

/// Why a case could not be decided automatically
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnknownReason {
    /// No expected output was recorded for the case
    MissingBaseline,
}

/// Final classification of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail(FailReason),
    Unknown(UnknownReason),
}

/// Everything recorded about one case
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub input: PathBuf,
    pub verdict: Verdict,
    /// Memory check result, reported alongside the verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<DiagnosticKind>,
}

/// Run-scoped counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    pub run: usize,
    pub passed: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl CoverageSummary {
    /// Count one resolved case
    pub fn record(&mut self, verdict: &Verdict) {
        self.run += 1;
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail(_) => self.failed += 1,
            Verdict::Unknown(_) => self.unknown += 1,
        }
    }

    /// Process exit code for this summary
    ///
    /// The harness is a reporting tool, so failures only affect the exit
    /// code in strict mode.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Everything a suite run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub suite: String,
    pub summary: CoverageSummary,
    pub cases: Vec<CaseOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_totals_consistent() {
        let mut summary = CoverageSummary::default();
        summary.record(&Verdict::Pass);
        summary.record(&Verdict::Fail(FailReason::OutputMismatch));
        summary.record(&Verdict::Fail(FailReason::Segfault { signal: 11 }));
        summary.record(&Verdict::Unknown(UnknownReason::MissingBaseline));

        assert_eq!(summary.run, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.run, summary.passed + summary.failed + summary.unknown);
    }

    #[test]
    fn test_exit_code_only_fails_in_strict_mode() {
        let mut summary = CoverageSummary::default();
        summary.record(&Verdict::Fail(FailReason::OutputMismatch));
        assert_eq!(summary.exit_code(false), 0);
        assert_eq!(summary.exit_code(true), 1);

        let clean = CoverageSummary::default();
        assert_eq!(clean.exit_code(true), 0);
    }

    #[test]
    fn test_summary_serializes_counts() {
        let mut summary = CoverageSummary::default();
        summary.record(&Verdict::Pass);
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["run"], 1);
        assert_eq!(json["passed"], 1);
        assert_eq!(json["failed"], 0);
    }

    #[test]
    fn test_verdict_serialization_is_tagged() {
        let json = serde_json::to_value(Verdict::Fail(FailReason::Segfault { signal: 11 })).unwrap();
        assert_eq!(json["verdict"], "fail");
        assert_eq!(json["reason"], "segfault");
        assert_eq!(json["signal"], 11);
    }
}
