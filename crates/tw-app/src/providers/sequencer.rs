use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use tw_core::{Error, ImageArtifact, Result, SceneId};

use crate::providers::client::ProviderClient;

/// Walks the fixed backend priority list until some transport yields an
/// image. Per candidate the typed client goes first, then the raw HTTP
/// call; the first success wins outright and nothing after it is tried.
pub struct ModelFallbackSequencer {
    client: Arc<ProviderClient>,
    candidates: Vec<String>,
    retry_delay: Duration,
    remote_enabled: bool,
}

impl ModelFallbackSequencer {
    pub fn new(
        client: Arc<ProviderClient>,
        candidates: Vec<String>,
        retry_delay: Duration,
        remote_enabled: bool,
    ) -> Self {
        Self {
            client,
            candidates,
            retry_delay,
            remote_enabled,
        }
    }

    pub async fn resolve(&self, prompt: &str, scene: SceneId) -> Result<ImageArtifact> {
        if !self.remote_enabled {
            debug!(
                scene = scene.name(),
                "remote generation disabled; skipping all providers"
            );
            return Err(Error::ProvidersExhausted);
        }

        for model in &self.candidates {
            info!(model, scene = scene.name(), "trying model");

            match self.client.invoke_sdk(prompt, model, scene).await {
                Ok(artifact) => {
                    info!(model, scene = scene.name(), "inference client success");
                    return Ok(artifact);
                }
                Err(Error::ClientUnavailable) => {
                    debug!("inference client not configured");
                }
                Err(e) => {
                    warn!(
                        model,
                        scene = scene.name(),
                        error = %e,
                        "inference client attempt failed"
                    );
                }
            }

            match self.client.invoke_http(prompt, model, scene).await {
                Ok(artifact) => {
                    info!(model, scene = scene.name(), "http success");
                    return Ok(artifact);
                }
                Err(e) => {
                    warn!(model, scene = scene.name(), error = %e, "http attempt failed");
                    // Flat pause before the next candidate; a cold backend
                    // gains nothing from burst retries.
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }

        error!(scene = scene.name(), "all providers exhausted");
        Err(Error::ProvidersExhausted)
    }
}
