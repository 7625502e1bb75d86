//! Job request DTOs

/// Request to assess one host
///
/// Created once per configured host and consumed by a single poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub hostname: String,
}

impl JobRequest {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}
