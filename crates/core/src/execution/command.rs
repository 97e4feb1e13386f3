//! Command execution utilities
//!
//! This module provides the [`StepRunner`] seam through which every rendered step
//! is handed to a process, and the [`ShellRunner`] used outside of tests.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::environment::EffectiveEnv;
use crate::types::{YakeError, YakeResult};

/// Shell used when none is configured
pub const DEFAULT_SHELL: &str = "bash";

/// Runs one rendered step and reports its exit code
pub trait StepRunner {
    fn run_step(
        &self,
        target: &str,
        index: usize,
        script: &str,
        env: &EffectiveEnv,
    ) -> YakeResult<i32>;
}

/// Runs steps as `<shell> -c <script>` with stdio inherited from this process
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    working_dir: Option<PathBuf>,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            working_dir: None,
        }
    }

    /// Run steps from `dir` instead of the current directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl StepRunner for ShellRunner {
    fn run_step(
        &self,
        target: &str,
        index: usize,
        script: &str,
        env: &EffectiveEnv,
    ) -> YakeResult<i32> {
        let mut command = Command::new(&self.shell);
        command.arg("-c").arg(script).env_clear().envs(env);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|source| YakeError::Spawn {
            target: target.to_string(),
            step: index,
            source,
        })?;

        Ok(exit_code(status))
    }
}

/// Exit code of a finished step; a signal-terminated step reports `128 + signal`
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
