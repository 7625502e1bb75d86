//! Service layer
//!
//! Services hold the runner's side effects beyond the scanning service
//! itself. They are trait-based so the scheduler can be tested without
//! touching the filesystem.

mod report;

pub use report::{FileReportEmitter, ReportEmitter};
