//! Time-bounded execution of external command-line tools.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// An external program plus any leading arguments.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

/// Why a tool invocation did not produce output.
#[derive(Debug)]
pub(crate) enum ToolFailure {
    NotFound,
    Spawn(io::Error),
    TimedOut(Duration),
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Add an argument placed before the per-call arguments.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.prefix_args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn name(&self) -> String {
        self.program.display().to_string()
    }

    /// Run to completion, killing the child if `limit` elapses first.
    pub(crate) async fn run<I, S>(&self, args: I, limit: Duration) -> Result<Output, ToolFailure>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(limit, command.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => Err(ToolFailure::NotFound),
            Ok(Err(e)) => Err(ToolFailure::Spawn(e)),
            Err(_) => Err(ToolFailure::TimedOut(limit)),
        }
    }
}
