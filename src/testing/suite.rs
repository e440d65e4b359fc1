//! Test suites and test case discovery
//!
//! A suite names one compiler stage. Each `.simpl` program under
//! `input/<suite>/` becomes a test case whose baseline and scratch paths
//! mirror the input tree.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use walkdir::WalkDir;

use crate::common::config::Layout;
use crate::common::Error;

/// Compiler stage under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    Scanner,
    Parser,
    Typecheck,
}

impl Suite {
    /// All supported suites, in usage order
    pub const ALL: [Suite; 3] = [Suite::Scanner, Suite::Parser, Suite::Typecheck];

    /// Directory name under `input/`, `output/` and the scratch tree
    pub fn dir_name(&self) -> &'static str {
        match self {
            Suite::Scanner => "scanner",
            Suite::Parser => "parser",
            Suite::Typecheck => "typecheck",
        }
    }

    /// Make target that builds the subject binary
    pub fn build_target(&self) -> &'static str {
        match self {
            Suite::Scanner => "testscanner",
            Suite::Parser => "testparser",
            Suite::Typecheck => "testtypechecking",
        }
    }

    /// Name of the subject binary produced by the build
    pub fn binary_name(&self) -> &'static str {
        match self {
            Suite::Scanner => "testscanner",
            Suite::Parser | Suite::Typecheck => "simplc",
        }
    }

    /// Extra guidance shown before the suite starts
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Suite::Parser => Some(
                "For parser tests, please ensure DFLAGS in your Makefile is \
                 deactivated (commented out) before testing.",
            ),
            _ => None,
        }
    }

    /// Usage text listing the accepted suite names
    pub fn usage() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|s| s.dir_name()).collect();
        format!(
            "Incorrect command line argument specified. The available options are:\n{}",
            names.join("\n")
        )
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Suite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scanner" => Ok(Suite::Scanner),
            "parser" => Ok(Suite::Parser),
            "typecheck" => Ok(Suite::Typecheck),
            other => Err(Error::InvalidSuite(other.to_string())),
        }
    }
}

/// One discovered input program and the files derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// The `.simpl` program fed to the subject binary
    pub input: PathBuf,
    /// Recorded baseline, `output/<suite>/<rel>/<stem>.txt`
    pub expected: PathBuf,
    /// Captured output, `<scratch>/<suite>/<rel>/<stem>_output.txt`
    pub actual: PathBuf,
    /// Memory diagnostic report, next to the captured output
    pub memcheck_report: PathBuf,
}

impl TestCase {
    /// Derive all paths for `input`, which must live under the suite's
    /// input directory
    pub fn derive(layout: &Layout, suite: Suite, input: &Path) -> Option<Self> {
        let suite_input = layout.input_dir.join(suite.dir_name());
        let rel = input.strip_prefix(&suite_input).ok()?;
        let stem = rel.file_stem()?.to_string_lossy().into_owned();
        let rel_dir = rel.parent().unwrap_or(Path::new(""));

        let expected = layout
            .output_dir
            .join(suite.dir_name())
            .join(rel_dir)
            .join(format!("{stem}.txt"));
        let scratch = layout.scratch_dir.join(suite.dir_name()).join(rel_dir);

        Some(Self {
            input: input.to_path_buf(),
            expected,
            actual: scratch.join(format!("{stem}_output.txt")),
            memcheck_report: scratch.join(format!("{stem}_memcheck.txt")),
        })
    }

    /// Whether a baseline has been recorded for this case
    pub fn has_baseline(&self) -> bool {
        self.expected.is_file()
    }
}

/// Discover every test case of `suite`, in file-name order
///
/// Output paths are derived from the input's relative path with only the
/// extension swapped, and only one extension is collected, so no two cases
/// share baseline or scratch files.
pub fn discover(layout: &Layout, suite: Suite) -> Vec<TestCase> {
    let root = layout.input_dir.join(suite.dir_name());
    if !root.is_dir() {
        tracing::warn!("No input directory at {}", root.display());
        return Vec::new();
    }

    let mut cases = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(layout.source_extension.as_str()) {
            continue;
        }
        if let Some(case) = TestCase::derive(layout, suite, path) {
            cases.push(case);
        }
    }

    tracing::debug!("Discovered {} {} cases", cases.len(), suite);
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn layout_in(root: &Path) -> Layout {
        Layout::default().resolved(root)
    }

    #[test]
    fn test_parse_suites() {
        assert_eq!("scanner".parse::<Suite>().unwrap(), Suite::Scanner);
        assert_eq!("parser".parse::<Suite>().unwrap(), Suite::Parser);
        assert_eq!("typecheck".parse::<Suite>().unwrap(), Suite::Typecheck);
        assert!(matches!(
            "codegen".parse::<Suite>(),
            Err(Error::InvalidSuite(name)) if name == "codegen"
        ));
    }

    #[test]
    fn test_suite_collaborators() {
        assert_eq!(Suite::Scanner.binary_name(), "testscanner");
        assert_eq!(Suite::Parser.binary_name(), "simplc");
        assert_eq!(Suite::Typecheck.build_target(), "testtypechecking");
        assert!(Suite::Parser.notice().is_some());
        assert!(Suite::Scanner.notice().is_none());
    }

    #[test]
    fn test_usage_lists_every_suite() {
        let usage = Suite::usage();
        for suite in Suite::ALL {
            assert!(usage.contains(suite.dir_name()));
        }
    }

    #[test]
    fn test_derive_paths_mirror_input_tree() {
        let layout = layout_in(Path::new("/t"));
        let case = TestCase::derive(
            &layout,
            Suite::Parser,
            Path::new("/t/input/parser/loops/while.simpl"),
        )
        .unwrap();
        assert_eq!(case.expected, PathBuf::from("/t/output/parser/loops/while.txt"));
        assert_eq!(case.actual, PathBuf::from("/t/bin/parser/loops/while_output.txt"));
        assert_eq!(
            case.memcheck_report,
            PathBuf::from("/t/bin/parser/loops/while_memcheck.txt")
        );
    }

    #[test]
    fn test_derive_rejects_foreign_input() {
        let layout = layout_in(Path::new("/t"));
        assert!(TestCase::derive(&layout, Suite::Parser, Path::new("/t/input/scanner/a.simpl")).is_none());
    }

    #[test]
    fn test_discover_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout_in(dir.path());
        let suite_dir = layout.input_dir.join("scanner");
        fs::create_dir_all(suite_dir.join("nested")).unwrap();
        fs::write(suite_dir.join("b.simpl"), "").unwrap();
        fs::write(suite_dir.join("a.simpl"), "").unwrap();
        fs::write(suite_dir.join("notes.md"), "").unwrap();
        fs::write(suite_dir.join("nested").join("c.simpl"), "").unwrap();

        let cases = discover(&layout, Suite::Scanner);
        let names: Vec<_> = cases
            .iter()
            .map(|c| c.input.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.simpl", "b.simpl", "c.simpl"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(&layout_in(dir.path()), Suite::Typecheck).is_empty());
    }
}
