//! Execution runner
//!
//! Runs a program once with its combined stdout/stderr captured into a
//! file, and reduces the process status to the classes the harness acts on.

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command as TokioCommand;

use crate::common::{paths, Error, Result};

/// How the subject process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Exited normally with code 0
    Success,
    /// Exited normally with a non-zero code
    Failure(i32),
    /// Killed by a fatal signal; every signal is treated like an invalid
    /// memory access
    Segfault { signal: i32 },
    /// Neither an exit code nor a signal was reported
    Abnormal,
}

impl ExitStatus {
    pub fn is_segfault(&self) -> bool {
        matches!(self, ExitStatus::Segfault { .. })
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return if code == 0 {
                ExitStatus::Success
            } else {
                ExitStatus::Failure(code)
            };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Segfault { signal };
            }
        }

        ExitStatus::Abnormal
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Success => write!(f, "exit code 0"),
            ExitStatus::Failure(code) => write!(f, "exit code {code}"),
            ExitStatus::Segfault { signal } => write!(f, "killed by {}", signal_name(*signal)),
            ExitStatus::Abnormal => write!(f, "abnormal termination"),
        }
    }
}

/// Human-readable name for a termination signal
pub fn signal_name(signal: i32) -> String {
    #[cfg(unix)]
    {
        let name = match signal {
            libc::SIGSEGV => Some("SIGSEGV"),
            libc::SIGBUS => Some("SIGBUS"),
            libc::SIGABRT => Some("SIGABRT"),
            libc::SIGFPE => Some("SIGFPE"),
            libc::SIGILL => Some("SIGILL"),
            libc::SIGKILL => Some("SIGKILL"),
            libc::SIGTERM => Some("SIGTERM"),
            _ => None,
        };
        if let Some(name) = name {
            return name.to_string();
        }
    }
    format!("signal {signal}")
}

/// Outcome of running the subject binary against one test case
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Everything the process wrote to stdout and stderr, interleaved
    pub output: String,
    pub status: ExitStatus,
}

/// Run `program` with `args`, sending stdout and stderr into `destination`
///
/// The destination is truncated first. Both streams share one file handle,
/// so writes land in the order the process made them. Returns once the
/// process has exited and the file is closed.
pub async fn run_captured(
    program: &Path,
    args: &[&OsStr],
    destination: &Path,
) -> Result<ExitStatus> {
    paths::ensure_parent(destination).map_err(|e| Error::file_write(destination, &e))?;
    let stdout = File::create(destination).map_err(|e| Error::file_write(destination, &e))?;
    let stderr = stdout
        .try_clone()
        .map_err(|e| Error::file_write(destination, &e))?;

    tracing::debug!(
        "Running {} {:?} > {}",
        program.display(),
        args,
        destination.display()
    );

    let status = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .status()
        .await
        .map_err(|e| Error::spawn(program, &e))?;

    let status = ExitStatus::from(status);
    tracing::debug!("{} finished with {}", program.display(), status);
    Ok(status)
}

/// Run the subject binary as `<binary> <input>` and read back its output
pub async fn execute(binary: &Path, input: &Path, destination: &Path) -> Result<ExecutionResult> {
    let status = run_captured(binary, &[input.as_os_str()], destination).await?;
    let output = read_lossy(destination)?;
    Ok(ExecutionResult { output, status })
}

/// Read a text file, replacing invalid UTF-8 instead of failing
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::file_read(path, &e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_success_captures_both_streams_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "subject", "echo out1\necho err1 >&2\necho out2");
        let dest = dir.path().join("nested").join("a_output.txt");

        let result = execute(&bin, Path::new("a.simpl"), &dest).await.unwrap();
        assert_eq!(result.status, ExitStatus::Success);
        assert_eq!(result.output, "out1\nerr1\nout2\n");
    }

    #[tokio::test]
    async fn test_input_path_is_the_only_argument() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "subject", "echo \"$#:$1\"");
        let dest = dir.path().join("out.txt");

        let result = execute(&bin, Path::new("dir with space/a.simpl"), &dest).await.unwrap();
        assert_eq!(result.output, "1:dir with space/a.simpl\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "subject", "echo error: bad token\nexit 3");
        let dest = dir.path().join("out.txt");

        let result = execute(&bin, Path::new("x.simpl"), &dest).await.unwrap();
        assert_eq!(result.status, ExitStatus::Failure(3));
        assert_eq!(result.output, "error: bad token\n");
    }

    #[tokio::test]
    async fn test_signal_is_segfault() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "subject", "echo 42\nkill -SEGV $$");
        let dest = dir.path().join("out.txt");

        let result = execute(&bin, Path::new("x.simpl"), &dest).await.unwrap();
        assert_eq!(result.status, ExitStatus::Segfault { signal: libc::SIGSEGV });
        assert!(result.status.is_segfault());
        assert_eq!(result.output, "42\n");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        let err = execute(&dir.path().join("simplc"), Path::new("x.simpl"), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ExitStatus::Failure(2).to_string(), "exit code 2");
        assert_eq!(
            ExitStatus::Segfault { signal: libc::SIGSEGV }.to_string(),
            "killed by SIGSEGV"
        );
        assert_eq!(signal_name(64), "signal 64");
    }
}
