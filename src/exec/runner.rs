//! External-process invocation.
//!
//! [`CommandRunner`] is the seam between the queue and the OS; production code
//! uses [`SystemRunner`], tests substitute scripted runners.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use crate::utils::{OptimizerError, OptimizerResult};

/// A single prepared invocation of an external binary.
///
/// Arguments are handed to the process directly; there is no shell in between,
/// so paths need no quoting or escaping.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// Captured output of a completed invocation.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Executes invocations. Implemented by [`SystemRunner`] in production.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: Invocation) -> OptimizerResult<ExecOutput>;
}

/// Runs invocations as real child processes via `tokio::process`.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: Invocation) -> OptimizerResult<ExecOutput> {
        debug!("Executing {} {:?}", invocation.program, invocation.args);
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                OptimizerError::exec(&invocation.program, None, format!("failed to spawn: {}", e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(ExecOutput {
                code: output.status.code(),
                stdout,
                stderr,
            })
        } else {
            // The binaries report their own error codes on stderr; keep the
            // text intact so callers can match on it.
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            Err(OptimizerError::exec(
                &invocation.program,
                output.status.code(),
                detail,
            ))
        }
    }
}
