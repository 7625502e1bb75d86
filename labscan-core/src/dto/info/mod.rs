//! Capability/info DTOs
//!
//! Returned by the scanning service's info endpoint. Every field is optional
//! so that a reachable service with an unfamiliar payload still passes the
//! availability gate.

use serde::{Deserialize, Serialize};

/// Scanning service capability information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInfo {
    pub engine_version: Option<String>,
    pub criteria_version: Option<String>,
    pub max_assessments: Option<u32>,
    pub current_assessments: Option<u32>,
    /// Cool-off between new assessments, milliseconds
    pub new_assessment_cool_off: Option<u64>,
    pub messages: Vec<String>,
}
