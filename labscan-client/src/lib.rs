//! Labscan HTTP Client
//!
//! A small, type-safe gateway to a job-oriented TLS scanning service.
//!
//! The service exposes three operations, all plain GETs:
//! - an info endpoint used as an availability gate
//! - `analyze` with `startNew=on`, which starts a fresh assessment of a host
//! - `analyze` without it, which returns the current state of that assessment
//!
//! The gateway holds no per-job state; continuity between calls comes from the
//! hostname, which the service uses to identify the job.
//!
//! # Example
//!
//! ```no_run
//! use labscan_client::ScanClient;
//!
//! #[tokio::main]
//! async fn main() -> labscan_client::Result<()> {
//!     let client = ScanClient::new("https://api.ssllabs.com/api/v2");
//!
//!     client.check_availability().await?;
//!     let snapshot = client.submit_job("example.com").await?;
//!
//!     println!("{} is {}", snapshot.host, snapshot.status);
//!     Ok(())
//! }
//! ```

mod api;
pub mod error;
mod info;
mod jobs;

// Re-export commonly used types
pub use api::ScanApi;
pub use error::{ClientError, Result};
pub use labscan_core::domain::scan::JobSnapshot;
pub use labscan_core::dto::info::ServiceInfo;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// Default base URL of the public scanning service
pub const DEFAULT_API_URL: &str = "https://api.ssllabs.com/api/v2";

/// HTTP client for the scanning service API
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ScanClient {
    /// Base URL of the API (e.g., "https://api.ssllabs.com/api/v2")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ScanClient {
    /// Create a new client with a default reqwest client
    ///
    /// # Example
    /// ```
    /// use labscan_client::ScanClient;
    ///
    /// let client = ScanClient::new("https://api.ssllabs.com/api/v2/");
    /// assert_eq!(client.base_url(), "https://api.ssllabs.com/api/v2");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    /// The client is never reconfigured after construction.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    ///
    /// Non-2xx responses become [`ClientError::NonSuccessStatus`]; bodies that
    /// do not match `T` become [`ClientError::DecodeFailure`].
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::non_success(status.as_u16(), error_text));
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ClientError::DecodeFailure(e.to_string()))
    }
}
