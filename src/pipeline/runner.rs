// src/pipeline/runner.rs

//! Cycle runners: how the scheduler executes one capture cycle.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{CaptureMode, Config, RunResult};
use crate::pipeline::cycle::run_cycle;
use crate::services::Fetcher;
use crate::utils::log::Logger;

/// Executes one continuous-mode cycle.
///
/// A failed cycle is an `Ok` with `success == false`. `Err` means the runner
/// itself is broken and the scheduler should stop.
#[async_trait]
pub trait CycleRunner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, cycle: u64) -> Result<RunResult>;
}

/// Runs the pipeline inside the scheduler process.
pub struct InProcessRunner {
    config: Config,
    fetcher: Box<dyn Fetcher>,
    store_path: PathBuf,
    logger: Logger,
}

impl InProcessRunner {
    pub fn new(
        config: Config,
        fetcher: Box<dyn Fetcher>,
        store_path: PathBuf,
        logger: Logger,
    ) -> Self {
        Self {
            config,
            fetcher,
            store_path,
            logger,
        }
    }
}

#[async_trait]
impl CycleRunner for InProcessRunner {
    fn name(&self) -> &'static str {
        "in-process"
    }

    async fn run(&self, _cycle: u64) -> Result<RunResult> {
        Ok(run_cycle(
            &self.config,
            self.fetcher.as_ref(),
            CaptureMode::Continuous,
            &self.store_path,
            &self.logger,
        )
        .await)
    }
}

/// Re-launches an executable for every cycle and reads its result from stdout.
///
/// The child is expected to print its [`RunResult`] as one JSON line; anything
/// else it prints before that line is ignored.
pub struct ExternalProcessRunner {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalProcessRunner {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Runner that re-launches the current executable with `args`.
    pub fn current_exe(args: Vec<OsString>) -> Result<Self> {
        let program = std::env::current_exe()
            .map_err(|e| AppError::runner(format!("cannot locate current executable: {e}")))?;
        Ok(Self::new(program, args))
    }
}

/// Last stdout line that parses as a [`RunResult`].
pub fn parse_child_output(stdout: &str) -> Option<RunResult> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find_map(|line| serde_json::from_str(line).ok())
}

#[async_trait]
impl CycleRunner for ExternalProcessRunner {
    fn name(&self) -> &'static str {
        "external-process"
    }

    async fn run(&self, cycle: u64) -> Result<RunResult> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        // Keep terminal Ctrl-C away from the child so it finishes its write.
        #[cfg(unix)]
        command.process_group(0);

        log::debug!("Cycle {}: launching {}", cycle, self.program.display());
        let output = command.output().await.map_err(|e| {
            AppError::runner(format!("failed to launch {}: {e}", self.program.display()))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(match parse_child_output(&stdout) {
            Some(result) => result,
            None => RunResult::failed(
                format!("cycle process exited with {} and no result", output.status),
                None,
            ),
        })
    }
}
