use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::config::AppConfig;
use crate::coordinator::ParallelSceneCoordinator;
use crate::janitor::ResourceJanitor;
use crate::providers::{
    InferenceApiClient, ModelFallbackSequencer, ProviderClient, TextToImageClient,
};
use crate::resolver::SceneImageResolver;
use crate::story::Story;

/// Everything the handlers share: configuration, the story cache and the
/// fully wired scene pipeline.
pub struct ServiceContext {
    pub config: AppConfig,
    pub story_cache: Arc<ResultCache<Story>>,
    pub coordinator: ParallelSceneCoordinator,
}

impl ServiceContext {
    pub fn new(config: AppConfig) -> Result<Arc<Self>> {
        std::fs::create_dir_all(&config.artifact_dir).with_context(|| {
            format!(
                "creating artifact directory {}",
                config.artifact_dir.display()
            )
        })?;

        let http = reqwest::Client::new();
        let remote = config.remote_enabled();

        let sdk: Option<Arc<dyn TextToImageClient>> = if config.sdk_enabled && remote {
            let token = config
                .auth_token
                .clone()
                .context("remote enabled without a token")?;
            Some(Arc::new(InferenceApiClient::new(
                http.clone(),
                config.endpoint_base.clone(),
                token,
                config.http_timeout,
            )))
        } else {
            None
        };

        if remote {
            info!(
                models = config.model_candidates.len(),
                sdk = sdk.is_some(),
                "remote image generation enabled"
            );
        } else {
            warn!("no usable API token; every scene will use the local renderer");
        }

        let client = Arc::new(ProviderClient::new(
            http,
            sdk,
            config.endpoint_base.clone(),
            config.auth_token.clone(),
            config.http_timeout,
            config.artifact_dir.clone(),
        ));
        let sequencer = ModelFallbackSequencer::new(
            client,
            config.model_candidates.clone(),
            config.retry_delay,
            remote,
        );
        let resolver = Arc::new(SceneImageResolver::new(
            sequencer,
            config.artifact_dir.clone(),
        ));
        let coordinator =
            ParallelSceneCoordinator::new(resolver, config.max_workers, config.scene_deadline);

        Ok(Arc::new(Self {
            story_cache: Arc::new(ResultCache::new(config.cache_max_size)),
            config,
            coordinator,
        }))
    }

    /// Starts the background janitor. Send `true` on the returned channel to
    /// stop it, then await the handle.
    pub fn spawn_janitor(self: &Arc<Self>) -> (JoinHandle<()>, watch::Sender<bool>) {
        let janitor = ResourceJanitor::new(&self.config, Arc::clone(&self.story_cache));
        let (tx, rx) = watch::channel(false);
        (tokio::spawn(janitor.run(rx)), tx)
    }
}
