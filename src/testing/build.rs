//! Build step for the subject binaries
//!
//! Builds are best effort. A failed build is logged and the run continues;
//! the missing binary then shows up as a launch failure on the first case.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command as TokioCommand;

use super::suite::Suite;
use crate::common::config::BuildConfig;
use crate::common::paths;

/// Runs `make -C <src> <target>` style commands
#[derive(Debug, Clone)]
pub struct Builder {
    enabled: bool,
    program: PathBuf,
    src_dir: PathBuf,
    clean_target: String,
}

impl Builder {
    pub fn new(config: &BuildConfig, workdir: &std::path::Path) -> Self {
        Self {
            enabled: config.enabled,
            program: config.program.clone(),
            src_dir: paths::resolve(workdir, &config.src_dir),
            clean_target: config.clean_target.clone(),
        }
    }

    /// Clean, then build the subject binary for `suite`
    pub async fn build(&self, suite: Suite) -> bool {
        self.make(&self.clean_target).await && self.make(suite.build_target()).await
    }

    /// Remove build products
    pub async fn clean(&self) -> bool {
        self.make(&self.clean_target).await
    }

    async fn make(&self, target: &str) -> bool {
        if !self.enabled {
            return true;
        }

        tracing::debug!(
            "Running {} -C {} {}",
            self.program.display(),
            self.src_dir.display(),
            target
        );

        let result = TokioCommand::new(&self.program)
            .arg("-C")
            .arg(&self.src_dir)
            .arg(target)
            .stdin(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::warn!(
                    "Build target '{}' failed with exit code {:?}",
                    target,
                    status.code()
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    "Build tool '{}' failed to execute: {}",
                    self.program.display(),
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn test_disabled_builder_is_a_no_op() {
        let config = BuildConfig {
            enabled: false,
            program: PathBuf::from("/definitely/not/make"),
            ..BuildConfig::default()
        };
        let builder = Builder::new(&config, Path::new("/tmp"));
        assert!(builder.build(Suite::Scanner).await);
        assert!(builder.clean().await);
    }

    #[tokio::test]
    async fn test_missing_build_tool_is_reported_not_fatal() {
        let config = BuildConfig {
            program: PathBuf::from("/definitely/not/make"),
            ..BuildConfig::default()
        };
        let builder = Builder::new(&config, Path::new("/tmp"));
        assert!(!builder.build(Suite::Parser).await);
    }

    #[test]
    fn test_src_dir_is_resolved() {
        let builder = Builder::new(&BuildConfig::default(), Path::new("/work/tests"));
        assert_eq!(builder.src_dir, PathBuf::from("/work/tests/../src"));
    }
}
