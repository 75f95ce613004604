//! External command execution
//!
//! Every cloud operation goes through [`CommandRunner`], so providers can be
//! exercised against a scripted runner in tests.

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into [`CloudError::CommandFailed`]
    pub fn into_result(self, program: &str) -> Result<String> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(CloudError::CommandFailed {
                program: program.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external programs to completion
///
/// A non-zero exit is not an error at this layer: callers inspect the
/// output, since some failures (e.g. "already exists") are expected.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// Check that a program is available
    async fn is_installed(&self, program: &str) -> bool;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", program, args.join(" "));

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CloudError::ProgramNotFound(program.to_string())
            } else {
                CloudError::Io(e)
            }
        })?;

        // gcloud reports progress on stderr; forward it while the command runs
        let stderr = child.stderr.take();
        let stderr_task = async {
            let mut collected = String::new();
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr);
                let mut line = Vec::new();
                while reader.read_until(b'\n', &mut line).await? > 0 {
                    let text = String::from_utf8_lossy(&line);
                    tracing::info!(target: "cloudops::progress", "{}", text.trim_end());
                    collected.push_str(&text);
                    line.clear();
                }
            }
            Ok::<_, std::io::Error>(collected)
        };

        let stdout = child.stdout.take();
        let stdout_task = async {
            let mut buf = Vec::new();
            if let Some(mut stdout) = stdout {
                stdout.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        let (stdout, stderr) = tokio::try_join!(stdout_task, stderr_task)?;
        let status = child.wait().await?;

        let result = CommandOutput {
            code: status.code(),
            stdout,
            stderr,
        };

        if !result.success() {
            tracing::debug!(
                "{} exited with {:?}: {}",
                program,
                result.code,
                result.stderr.trim()
            );
        }

        Ok(result)
    }

    async fn is_installed(&self, program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
