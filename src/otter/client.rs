//! HTTP client for the Otter proxy API.
//!
//! Each call is attempted exactly once; there is no session reuse
//! between calls.

use super::messages::{ListParams, Operation, SpeechParams, SpeechesRequest};
use super::{ListPage, PageCursor, RecordingDetail, RecordingSource};
use crate::config::ApiConfig;
use crate::error::OtterError;
use crate::keychain::Credentials;
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Client for the Otter speeches endpoint.
pub(crate) struct OtterClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl OtterClient {
    /// Create a new client from the API configuration.
    pub(crate) fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(&config.path))
            .with_context(|| {
                format!(
                    "Invalid Otter endpoint {}/{}",
                    config.base_url, config.path
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client for OtterClient")?;

        Ok(Self { endpoint, client })
    }

    #[instrument(skip(self, credentials, params), fields(endpoint = %self.endpoint))]
    async fn post<P, R>(
        &self,
        credentials: &Credentials,
        operation: Operation,
        params: P,
    ) -> Result<R, OtterError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let body = SpeechesRequest {
            email: &credentials.email,
            password: &credentials.password,
            operation,
            params,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Otter request rejected");
            return Err(OtterError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "Otter request succeeded");
        response.json::<R>().await.map_err(|e| {
            OtterError::InvalidResponse(format!("Failed to parse Otter response: {}", e))
        })
    }
}

#[async_trait]
impl RecordingSource for OtterClient {
    async fn list_recordings(
        &self,
        credentials: &Credentials,
        page_size: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> Result<ListPage, OtterError> {
        let (last_load, last_modified) = match cursor {
            Some(c) => (Some(c.last_load), Some(c.last_modified)),
            None => (None, None),
        };
        let params = ListParams {
            page_size,
            last_load,
            last_modified,
        };
        self.post(credentials, Operation::GetSpeeches, params).await
    }

    async fn get_recording(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<RecordingDetail, OtterError> {
        self.post(credentials, Operation::GetSpeech, SpeechParams { id })
            .await
    }
}
