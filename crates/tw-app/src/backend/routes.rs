use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use tracing::info;
use tw_core::{fingerprint, SceneId, StoryRequest};
use uuid::Uuid;

use crate::backend::schemas::{
    ArtifactRef, CleanupResponse, GenerateResponse, GenerationMetadata, HealthResponse,
};
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::janitor::{self, sweep_artifacts};
use crate::resolver::SceneJob;
use crate::story;

pub fn api_routes() -> Router<Arc<ServiceContext>> {
    Router::new()
        .route("/generate", post(generate_storybook))
        .route("/health", get(health))
        .route("/cleanup", post(cleanup))
        .route("/artifacts/{name}", get(artifact))
}

pub async fn generate_storybook(
    State(ctx): State<Arc<ServiceContext>>,
    Json(req): Json<StoryRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    if req.story_idea.trim().is_empty() {
        return Err(AppError::BadRequest("story_idea is required".into()));
    }

    let request_id = Uuid::new_v4();
    let started = Instant::now();
    info!(%request_id, story_idea = %req.story_idea, genre = %req.genre, "generation request");

    janitor::guard_before_request(&ctx.config, &ctx.story_cache);

    let key = fingerprint(&req);
    let (story, cached_story) = match ctx.story_cache.get(&key) {
        Some(story) => (story, true),
        None => {
            let story = story::generate_story(&req);
            ctx.story_cache.put(key, story.clone());
            (story, false)
        }
    };

    let jobs: Vec<SceneJob> = SceneId::ALL
        .into_iter()
        .map(|scene| SceneJob {
            scene,
            prompt: story::scene_prompt(&req, scene),
            caption: story.scene_text(scene).to_string(),
            art_style: req.art_style.clone(),
        })
        .collect();

    let resolved = ctx.coordinator.resolve_all(jobs).await;
    let images: BTreeMap<SceneId, Option<ArtifactRef>> = resolved
        .into_iter()
        .map(|(scene, artifact)| {
            let reference = artifact.map(|artifact| ArtifactRef {
                url: format!("/artifacts/{}", artifact.file_name),
                file_name: artifact.file_name,
                strategy: artifact.strategy,
                source_model: artifact.source_model,
            });
            (scene, reference)
        })
        .collect();
    let images_generated = images.values().filter(|slot| slot.is_some()).count();

    janitor::guard_after_request(&ctx.config, &ctx.story_cache);

    let generation_time = started.elapsed().as_secs_f64();
    info!(%request_id, images_generated, generation_time, "generation complete");

    Ok(Json(GenerateResponse {
        success: true,
        story,
        metadata: GenerationMetadata {
            genre: req.genre,
            tone: req.tone,
            art_style: req.art_style,
            audience: req.audience,
            images_generated,
            total_scenes: images.len(),
            generation_time,
            cached_story,
        },
        images,
    }))
}

pub async fn health(State(ctx): State<Arc<ServiceContext>>) -> Json<HealthResponse> {
    let remote = ctx.config.remote_enabled();
    Json(HealthResponse {
        status: "healthy".into(),
        cached_stories: ctx.story_cache.len(),
        remote_enabled: remote,
        sdk_configured: remote && ctx.config.sdk_enabled,
        model_candidates: ctx.config.model_candidates.len(),
        memory_mb: janitor::process_memory_mb(),
    })
}

pub async fn cleanup(State(ctx): State<Arc<ServiceContext>>) -> Json<CleanupResponse> {
    let removed_files = sweep_artifacts(&ctx.config.artifact_dir, ctx.config.retention);
    ctx.story_cache.evict_if_oversize();
    Json(CleanupResponse {
        success: true,
        removed_files,
        cached_stories: ctx.story_cache.len(),
    })
}

pub async fn artifact(
    State(ctx): State<Arc<ServiceContext>>,
    Path(name): Path<String>,
) -> Result<([(header::HeaderName, &'static str); 1], Vec<u8>), AppError> {
    // Served names are flat; anything path-like is refused outright.
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::BadRequest("invalid artifact name".into()));
    }

    let path = ctx.config.artifact_dir.join(&name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("no artifact named {name}")));
        }
        Err(e) => return Err(AppError::Internal(format!("reading artifact: {e}"))),
    };

    let content_type = if name.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "image/png"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
