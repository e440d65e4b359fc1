//! SIMPL test harness
//!
//! Runs the scanner, parser and typechecker stages of the SIMPL compiler
//! against a tree of input programs, compares their output with recorded
//! baselines, classifies memory checker reports and escalates anything
//! ambiguous to an operator.

pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{run_suite, Suite, TriageConsole};
