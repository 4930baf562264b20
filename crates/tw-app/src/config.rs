use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default backend priority list; earlier entries are always tried first.
pub const DEFAULT_MODEL_CANDIDATES: [&str; 5] = [
    "stabilityai/stable-diffusion-2-1",
    "stabilityai/stable-diffusion-xl-base-1.0",
    "prompthero/openjourney-v4",
    "stable-diffusion-v1-5/stable-diffusion-v1-5",
    "CompVis/stable-diffusion-v1-4",
];

const DEFAULT_ENDPOINT_BASE: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub auth_token: Option<String>,
    pub endpoint_base: String,
    pub http_timeout: Duration,
    pub max_workers: usize,
    /// Overall join deadline for one request's scene fan-out.
    pub scene_deadline: Duration,
    /// Flat pause between model candidates after an HTTP failure.
    pub retry_delay: Duration,
    pub model_candidates: Vec<String>,
    pub sdk_enabled: bool,
    pub cache_max_size: usize,
    pub artifact_dir: PathBuf,
    pub cleanup_interval: Duration,
    pub retention: Duration,
    /// RSS threshold checked before a request.
    pub high_watermark_mb: u64,
    /// Lower RSS threshold re-checked after a request.
    pub low_watermark_mb: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Optional .env; absence is not an error.
        let _ = dotenvy::dotenv();

        let model_candidates = match env::var("TW_MODEL_CANDIDATES") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(Self {
            port: env_parse("PORT", 5000)?,
            auth_token: env::var("HUGGINGFACEHUB_API_TOKEN").ok(),
            endpoint_base: env::var("TW_INFERENCE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT_BASE.to_string()),
            http_timeout: Duration::from_secs(env_parse("HTTP_TIMEOUT", 30u64)?),
            max_workers: env_parse("MAX_WORKERS", 4usize)?,
            scene_deadline: Duration::from_secs(env_parse("TW_SCENE_DEADLINE_SECS", 60u64)?),
            retry_delay: Duration::from_secs(env_parse("TW_RETRY_DELAY_SECS", 2u64)?),
            model_candidates,
            sdk_enabled: env_parse("TW_SDK_ENABLED", true)?,
            cache_max_size: env_parse("TW_CACHE_MAX", 100usize)?,
            artifact_dir: PathBuf::from(
                env::var("TW_ARTIFACT_DIR").unwrap_or_else(|_| "static".to_string()),
            ),
            cleanup_interval: Duration::from_secs(env_parse("TW_CLEANUP_INTERVAL_SECS", 600u64)?),
            retention: Duration::from_secs(env_parse("TW_RETENTION_SECS", 3600u64)?),
            high_watermark_mb: env_parse("TW_MEM_HIGH_MB", 500u64)?,
            low_watermark_mb: env_parse("TW_MEM_LOW_MB", 300u64)?,
        })
    }

    /// Remote generation is skipped entirely without a usable token; the
    /// local renderer then covers every scene.
    pub fn remote_enabled(&self) -> bool {
        match &self.auth_token {
            Some(token) => !is_placeholder_token(token),
            None => false,
        }
    }
}

pub fn is_placeholder_token(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token.starts_with("<PASTE")
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
