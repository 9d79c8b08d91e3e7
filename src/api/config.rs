//! Account and API configuration endpoints.

use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiRequest, HttpTransport};
use crate::types::{ApiConfig, UserInfo};

/// Operations on `/auth` and `/config`.
#[derive(Debug, Clone)]
pub struct Account {
    transport: HttpTransport,
}

impl Account {
    pub(crate) fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Returns the account the token belongs to.
    ///
    /// # Errors
    ///
    /// [`ApiError::Authentication`] for an invalid token; any transport error otherwise.
    #[instrument(skip(self))]
    pub async fn user(&self) -> Result<UserInfo, ApiError> {
        self.transport.json(&ApiRequest::get("/auth"), None).await
    }

    /// Returns the conversion types available to the account.
    ///
    /// # Errors
    ///
    /// Any transport error.
    #[instrument(skip(self))]
    pub async fn api_config(&self) -> Result<ApiConfig, ApiError> {
        self.transport.json(&ApiRequest::get("/config"), None).await
    }
}
