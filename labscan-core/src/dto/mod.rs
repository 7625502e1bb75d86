//! Data Transfer Objects
//!
//! Lightweight payloads passed between the runner and the scanning service
//! gateway that are not part of the snapshot model itself.

pub mod info;
pub mod job;
