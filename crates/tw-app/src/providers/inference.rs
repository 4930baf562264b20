use std::time::Duration;

use async_trait::async_trait;
use tw_core::error::truncate_reason;
use tw_core::{Error, Result};

use crate::providers::client::TextToImageClient;

/// Typed client for the hosted inference API. Constructed only when an auth
/// token is configured, so the SDK strategy degrades to "unavailable"
/// instead of erroring per call.
pub struct InferenceApiClient {
    http: reqwest::Client,
    endpoint_base: String,
    token: String,
    timeout: Duration,
}

impl InferenceApiClient {
    pub fn new(
        http: reqwest::Client,
        endpoint_base: String,
        token: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint_base,
            token,
            timeout,
        }
    }
}

#[async_trait]
impl TextToImageClient for InferenceApiClient {
    async fn text_to_image(&self, prompt: &str, model: &str) -> Result<Vec<Vec<u8>>> {
        let url = format!("{}/{}", self.endpoint_base.trim_end_matches('/'), model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "inputs": prompt }))
            .send()
            .await
            .map_err(|e| Error::provider(model, format!("inference client error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(
                model,
                format!(
                    "inference client error: status {}: {}",
                    status.as_u16(),
                    truncate_reason(&body, 400)
                ),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::provider(model, format!("inference client error: {e}")))?;
        Ok(vec![bytes.to_vec()])
    }
}
