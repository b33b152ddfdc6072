//! Pipeline entry points for capture operations.
//!
//! - `run_cycle`: one fetch → extract → dedup → sequence → persist pass
//! - `Scheduler`: repeated cycles with drift correction and periodic cleanup
//! - `janitor`: bounded retention for side artifacts
//! - `run_validate`: configuration check

pub mod cycle;
pub mod dedup;
pub mod extract;
pub mod fingerprint;
pub mod janitor;
pub mod runner;
pub mod scheduler;
pub mod sequence;
pub mod validate;

pub use cycle::run_cycle;
pub use runner::{CycleRunner, ExternalProcessRunner, InProcessRunner};
pub use scheduler::{Scheduler, State, StopHandle, sleep_duration};
pub use sequence::Sequencer;
pub use validate::run_validate;
