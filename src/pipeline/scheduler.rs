// src/pipeline/scheduler.rs

//! Continuous-mode scheduler loop.
//!
//! ```text
//!   ┌──────────── Running ─────────────┐
//!   │ start → cycle → janitor (every N) │
//!   │   ↑                     ↓         │
//!   │   └── sleep max(1s, interval − elapsed)
//!   └──────────────┬───────────────────┘
//!        Ctrl-C or runner error
//!                  ↓
//!               Stopped
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::JanitorConfig;
use crate::pipeline::janitor;
use crate::pipeline::runner::CycleRunner;
use crate::utils::log::Logger;

/// Shortest pause between cycles.
pub const MIN_SLEEP: Duration = Duration::from_secs(1);

/// Time to wait before the next cycle, never below [`MIN_SLEEP`].
pub fn sleep_duration(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed).max(MIN_SLEEP)
}

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Stopped,
}

/// Totals over a scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub cycles: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub new_records: usize,
    pub janitor_runs: u64,
}

/// Stop signal shared between the scheduler and whoever requests shutdown.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Drives repeated cycles at a fixed interval.
pub struct Scheduler {
    runner: Box<dyn CycleRunner>,
    interval: Duration,
    janitor: JanitorConfig,
    artifact_dirs: Vec<PathBuf>,
    logger: Logger,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    state: State,
}

impl Scheduler {
    pub fn new(
        runner: Box<dyn CycleRunner>,
        interval: Duration,
        janitor: JanitorConfig,
        artifact_dirs: Vec<PathBuf>,
        logger: Logger,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            runner,
            interval,
            janitor,
            artifact_dirs,
            logger,
            stop_tx,
            stop_rx,
            state: State::Running,
        }
    }

    /// Handle that stops the loop at the next cycle boundary.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Stop on Ctrl-C. The signal is only observed between cycles.
    pub fn stop_on_ctrl_c(&self) {
        let handle = self.stop_handle();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Interrupt received, stopping after the current cycle");
                    handle.stop();
                }
                Err(e) => log::warn!("Cannot listen for Ctrl-C: {}", e),
            }
        });
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Run until stopped.
    ///
    /// Returns `Err` only when the runner itself fails; failed cycles are counted
    /// and retried at the next interval.
    pub async fn run(&mut self) -> Result<ScheduleReport> {
        let mut report = ScheduleReport::default();
        self.logger.header(&format!(
            "Continuous capture every {:.1} min ({} runner)",
            self.interval.as_secs_f64() / 60.0,
            self.runner.name()
        ));

        while self.state == State::Running {
            if self.stop_requested() {
                self.state = State::Stopped;
                break;
            }

            report.cycles += 1;
            let cycle = report.cycles;
            let started = Instant::now();
            self.logger.step(cycle, "Starting capture");

            let result = match self.runner.run(cycle).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("Cycle runner failed, stopping: {}", e);
                    self.state = State::Stopped;
                    return Err(e);
                }
            };

            if result.success {
                report.succeeded += 1;
                report.new_records += result.news_count;
                self.logger.step(
                    cycle,
                    &format!("Done: {} new of {}", result.news_count, result.total_count),
                );
            } else {
                report.failed += 1;
                self.logger.step(
                    cycle,
                    &format!(
                        "Failed: {}",
                        result.error.as_deref().unwrap_or("unknown error")
                    ),
                );
            }

            if cycle % self.janitor.every_cycles.max(1) == 0 {
                let stats = janitor::clean_all(&self.artifact_dirs, &self.janitor).await;
                report.janitor_runs += 1;
                self.logger
                    .sub_item(&format!("Janitor removed {} files", stats.deleted()));
            }

            if self.stop_requested() {
                self.state = State::Stopped;
                break;
            }

            let pause = sleep_duration(self.interval, started.elapsed());
            let next_run =
                Local::now() + chrono::Duration::from_std(pause).unwrap_or(chrono::Duration::zero());
            self.logger.sub_item(&format!(
                "Next run at {} (in {:.0}s)",
                next_run.format("%H:%M:%S"),
                pause.as_secs_f64()
            ));

            let mut stop_rx = self.stop_rx.clone();
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = stop_rx.wait_for(|stop| *stop) => {
                    self.state = State::Stopped;
                }
            }
        }

        self.logger.summary(
            "Scheduler stopped",
            &[
                ("Cycles", report.cycles.to_string()),
                ("Succeeded", report.succeeded.to_string()),
                ("Failed", report.failed.to_string()),
                ("New records", report.new_records.to_string()),
            ],
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::error::AppError;
    use crate::models::RunResult;

    /// Replays scripted outcomes; stops the scheduler after the last one.
    struct ScriptedRunner {
        script: Mutex<Vec<Result<RunResult>>>,
        stop: Arc<Mutex<Option<StopHandle>>>,
        work: Duration,
    }

    #[async_trait]
    impl CycleRunner for ScriptedRunner {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn run(&self, _cycle: u64) -> Result<RunResult> {
            tokio::time::sleep(self.work).await;
            let (next, last) = {
                let mut script = self.script.lock().unwrap();
                let next = script
                    .pop()
                    .unwrap_or_else(|| Ok(RunResult::failed("empty", None)));
                (next, script.is_empty())
            };
            if last {
                if let Some(stop) = self.stop.lock().unwrap().as_ref() {
                    stop.stop();
                }
            }
            next
        }
    }

    fn scheduler(mut script: Vec<Result<RunResult>>, work: Duration, every_cycles: u64) -> Scheduler {
        script.reverse();
        let stop = Arc::new(Mutex::new(None));
        let runner = ScriptedRunner {
            script: Mutex::new(script),
            stop: stop.clone(),
            work,
        };
        let janitor = JanitorConfig {
            max_files: 10,
            keep_days: 1,
            every_cycles,
        };
        let scheduler = Scheduler::new(
            Box::new(runner),
            Duration::from_secs(300),
            janitor,
            Vec::new(),
            Logger::console(),
        );
        *stop.lock().unwrap() = Some(scheduler.stop_handle());
        scheduler
    }

    #[test]
    fn test_sleep_floor() {
        let interval = Duration::from_secs(300);
        assert_eq!(sleep_duration(interval, Duration::from_secs(60)), Duration::from_secs(240));
        assert_eq!(sleep_duration(interval, Duration::from_secs(300)), MIN_SLEEP);
        assert_eq!(sleep_duration(interval, Duration::from_secs(900)), MIN_SLEEP);
        assert_eq!(sleep_duration(Duration::ZERO, Duration::ZERO), MIN_SLEEP);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycles_do_not_stop_the_loop() {
        let mut scheduler = scheduler(
            vec![
                Ok(RunResult::succeeded(10, 4, PathBuf::from("a.csv"))),
                Ok(RunResult::failed("timeout", None)),
                Ok(RunResult::succeeded(10, 1, PathBuf::from("a.csv"))),
            ],
            Duration::from_secs(5),
            2,
        );

        let started = Instant::now();
        let report = scheduler.run().await.unwrap();

        assert_eq!(scheduler.state(), State::Stopped);
        assert_eq!(report.cycles, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.new_records, 5);
        assert_eq!(report.janitor_runs, 1);
        // Two full intervals between three cycle starts, plus the last cycle's work.
        assert_eq!(started.elapsed(), Duration::from_secs(605));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_error_stops_the_loop() {
        let mut scheduler = scheduler(
            vec![
                Ok(RunResult::succeeded(1, 1, PathBuf::from("a.csv"))),
                Err(AppError::runner("spawn failed")),
                Ok(RunResult::succeeded(1, 1, PathBuf::from("a.csv"))),
            ],
            Duration::ZERO,
            10,
        );

        assert!(matches!(scheduler.run().await, Err(AppError::Runner(_))));
        assert_eq!(scheduler.state(), State::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_sleep() {
        let mut scheduler = scheduler(
            vec![
                Ok(RunResult::succeeded(1, 1, PathBuf::from("a.csv"))),
                Ok(RunResult::succeeded(1, 1, PathBuf::from("a.csv"))),
            ],
            Duration::ZERO,
            10,
        );
        let stop = scheduler.stop_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            stop.stop();
        });

        let report = scheduler.run().await.unwrap();
        assert_eq!(report.cycles, 1);
        assert_eq!(scheduler.state(), State::Stopped);
    }
}
