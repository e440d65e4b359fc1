//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Feature switches for the run
    #[serde(default)]
    pub features: Features,

    /// Directory layout of the test tree
    #[serde(default)]
    pub layout: Layout,

    /// External build step settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Memory diagnostic tool settings
    #[serde(default)]
    pub memcheck: MemcheckConfig,
}

/// Feature switches
#[derive(Debug, Deserialize, Clone)]
pub struct Features {
    /// Run every case under the memory diagnostic tool
    #[serde(default = "default_true")]
    pub memcheck: bool,

    /// Offer to save output as a baseline when none exists
    #[serde(default = "default_true")]
    pub ask_to_save: bool,

    /// Prompt for details when the diagnostic report is not recognised
    #[serde(default = "default_true")]
    pub request_details: bool,

    /// Exit non-zero when any case fails
    #[serde(default)]
    pub strict: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            memcheck: true,
            ask_to_save: true,
            request_details: true,
            strict: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Directory layout, relative to the working directory unless absolute
#[derive(Debug, Deserialize, Clone)]
pub struct Layout {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Scratch tree for captured output, removed at the end of a run
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Where the build step leaves the subject binaries
    #[serde(default = "default_binary_dir")]
    pub binary_dir: PathBuf,

    /// Extension of test input programs
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            scratch_dir: default_scratch_dir(),
            binary_dir: default_binary_dir(),
            source_extension: default_source_extension(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_scratch_dir() -> PathBuf {
    PathBuf::from("bin")
}
fn default_binary_dir() -> PathBuf {
    PathBuf::from("../bin")
}
fn default_source_extension() -> String {
    "simpl".to_string()
}

impl Layout {
    /// Resolve every relative directory against `workdir`
    pub fn resolved(&self, workdir: &Path) -> Self {
        Self {
            input_dir: paths::resolve(workdir, &self.input_dir),
            output_dir: paths::resolve(workdir, &self.output_dir),
            scratch_dir: paths::resolve(workdir, &self.scratch_dir),
            binary_dir: paths::resolve(workdir, &self.binary_dir),
            source_extension: self.source_extension.clone(),
        }
    }
}

/// External build step settings
#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    /// Set to false when the binaries are built some other way
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Build tool executable
    #[serde(default = "default_build_program")]
    pub program: PathBuf,

    /// Directory holding the compiler sources and Makefile
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    /// Target that removes build products
    #[serde(default = "default_clean_target")]
    pub clean_target: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_build_program(),
            src_dir: default_src_dir(),
            clean_target: default_clean_target(),
        }
    }
}

fn default_build_program() -> PathBuf {
    PathBuf::from("make")
}
fn default_src_dir() -> PathBuf {
    PathBuf::from("../src")
}
fn default_clean_target() -> String {
    "clean".to_string()
}

/// Memory diagnostic tool settings
#[derive(Debug, Deserialize, Clone)]
pub struct MemcheckConfig {
    /// Tool executable, looked up on PATH when not a path
    #[serde(default = "default_memcheck_tool")]
    pub tool: PathBuf,

    /// Flags placed before the subject command line
    #[serde(default = "default_memcheck_args")]
    pub args: Vec<String>,

    /// Number of trailing report lines inspected by the classifier
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,
}

impl Default for MemcheckConfig {
    fn default() -> Self {
        Self {
            tool: default_memcheck_tool(),
            args: default_memcheck_args(),
            tail_lines: default_tail_lines(),
        }
    }
}

fn default_memcheck_tool() -> PathBuf {
    PathBuf::from("valgrind")
}
fn default_memcheck_args() -> Vec<String> {
    [
        "--leak-check=full",
        "--track-origins=yes",
        "-s",
        "--show-leak-kinds=all",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_tail_lines() -> usize {
    8
}

impl Config {
    /// Load configuration for a run rooted at `workdir`
    ///
    /// Returns default configuration if no config file exists
    pub fn load(explicit: Option<&Path>, workdir: &Path) -> Result<Self> {
        match paths::find_config(explicit, workdir) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.layout.source_extension.is_empty() {
            return Err(Error::Config(
                "layout.source_extension must not be empty".to_string(),
            ));
        }
        if self.memcheck.tail_lines == 0 {
            return Err(Error::Config(
                "memcheck.tail_lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Locate the memory diagnostic tool
    ///
    /// Falls back to searching PATH if the configured tool is a bare name
    pub fn memcheck_tool(&self, workdir: &Path) -> Option<PathBuf> {
        let tool = &self.memcheck.tool;
        if tool.components().count() > 1 {
            let resolved = paths::resolve(workdir, tool);
            return resolved.exists().then_some(resolved);
        }
        which::which(tool).ok()
    }
}
