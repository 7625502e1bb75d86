//! Availability gate

use tracing::{debug, warn};

use crate::ScanClient;
use crate::error::{ClientError, Result};
use labscan_core::dto::info::ServiceInfo;

impl ScanClient {
    /// Check that the scanning service is reachable and healthy
    ///
    /// Performs a single GET against the info endpoint. Any 2xx response counts
    /// as available; a body that cannot be decoded yields a default
    /// [`ServiceInfo`] rather than an error.
    ///
    /// # Errors
    /// * [`ClientError::Unreachable`] on transport failure
    /// * [`ClientError::NonSuccessStatus`] on any non-2xx status
    pub async fn check_availability(&self) -> Result<ServiceInfo> {
        let url = format!("{}/info", self.base_url);
        debug!(url = %url, "Checking scanning service availability");

        let response = self.client.get(&url).send().await?;

        match self.handle_response::<ServiceInfo>(response).await {
            Ok(info) => Ok(info),
            Err(ClientError::DecodeFailure(e)) => {
                warn!(error = %e, "Info endpoint returned an unrecognised body");
                Ok(ServiceInfo::default())
            }
            Err(e) => Err(e),
        }
    }
}
