//! Scheduler layer for the runner
//!
//! This layer drives remote jobs: the poller takes a single host from
//! submission to a terminal status, the batch runner fans that out over the
//! configured host list with per-host failure isolation.

pub mod batch;
pub mod poller;

pub use batch::{BatchReport, BatchRunner, CompletedScan, HostOutcome};
pub use poller::{JobPoller, PollPolicy};
