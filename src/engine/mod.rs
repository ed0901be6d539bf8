//! Engine module housing the streaming side of the pipeline.
//!
//! `worker` runs the analysis loop on its own thread; `core` exposes the
//! `EngineHandle` that starts, feeds and stops it.

pub mod core;
pub mod worker;

pub use core::EngineHandle;
pub use worker::{process_available, WorkerStats, WorkerStatsSnapshot, WorkerSummary};
