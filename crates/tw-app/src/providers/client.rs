use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};
use tw_core::error::truncate_reason;
use tw_core::{Error, ImageArtifact, ImageStrategy, Result, SceneId, sanitize_model};

const ERROR_BODY_MAX_CHARS: usize = 400;

/// Typed text-to-image transport, the preferred strategy. A backend may
/// return several images for one prompt; callers take the first.
#[async_trait]
pub trait TextToImageClient: Send + Sync {
    async fn text_to_image(&self, prompt: &str, model: &str) -> Result<Vec<Vec<u8>>>;
}

/// Invokes one remote backend for one prompt over one of two transports,
/// persisting successful responses under the artifact directory. Filenames
/// embed scene, model and a millisecond timestamp so concurrent writers
/// never collide.
pub struct ProviderClient {
    http: reqwest::Client,
    sdk: Option<Arc<dyn TextToImageClient>>,
    endpoint_base: String,
    auth_token: Option<String>,
    timeout: Duration,
    artifact_dir: PathBuf,
}

impl ProviderClient {
    pub fn new(
        http: reqwest::Client,
        sdk: Option<Arc<dyn TextToImageClient>>,
        endpoint_base: String,
        auth_token: Option<String>,
        timeout: Duration,
        artifact_dir: PathBuf,
    ) -> Self {
        Self {
            http,
            sdk,
            endpoint_base,
            auth_token,
            timeout,
            artifact_dir,
        }
    }

    /// SDK strategy. Fails with `ClientUnavailable` (no network I/O at all)
    /// when no typed client is configured.
    pub async fn invoke_sdk(
        &self,
        prompt: &str,
        model: &str,
        scene: SceneId,
    ) -> Result<ImageArtifact> {
        let Some(client) = &self.sdk else {
            return Err(Error::ClientUnavailable);
        };

        info!(model, scene = scene.name(), "inference client: requesting image");
        let images = client.text_to_image(prompt, model).await?;
        let bytes = images
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider(model, "empty image sequence"))?;

        let file_name = format!(
            "hf_{}_{}_{}.png",
            scene.slug(),
            sanitize_model(model),
            Utc::now().timestamp_millis()
        );
        self.persist(scene, file_name, &bytes, ImageStrategy::RemoteSdk, model)
    }

    /// HTTP strategy: raw POST against the per-model endpoint, asking the
    /// backend to wait out its own cold start.
    pub async fn invoke_http(
        &self,
        prompt: &str,
        model: &str,
        scene: SceneId,
    ) -> Result<ImageArtifact> {
        let url = format!("{}/{}", self.endpoint_base.trim_end_matches('/'), model);
        info!(model, scene = scene.name(), %url, "http: requesting image");

        let mut request = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&serde_json::json!({
                "inputs": prompt,
                "options": { "wait_for_model": true },
            }));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::provider(model, format!("http request failed: {e}")))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if status.as_u16() == 200 && content_type.starts_with("image") {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::provider(model, format!("failed to read body: {e}")))?;
            let file_name = format!(
                "hf_http_{}_{}_{}.png",
                scene.slug(),
                sanitize_model(model),
                Utc::now().timestamp_millis()
            );
            return self.persist(scene, file_name, &bytes, ImageStrategy::RemoteHttp, model);
        }

        // Prefer a structured error body; fall back to truncated raw text.
        let body = response.text().await.unwrap_or_default();
        let reason = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => format!("status {}: {json}", status.as_u16()),
            Err(_) => format!(
                "status {}: {}",
                status.as_u16(),
                truncate_reason(&body, ERROR_BODY_MAX_CHARS)
            ),
        };
        Err(Error::provider(model, reason))
    }

    fn persist(
        &self,
        scene: SceneId,
        file_name: String,
        bytes: &[u8],
        strategy: ImageStrategy,
        model: &str,
    ) -> Result<ImageArtifact> {
        std::fs::create_dir_all(&self.artifact_dir)?;
        let path = self.artifact_dir.join(&file_name);
        std::fs::write(&path, bytes)?;
        debug!(file = %file_name, "saved image");

        Ok(ImageArtifact {
            scene,
            file_name,
            path,
            strategy,
            source_model: Some(model.to_string()),
        })
    }
}
