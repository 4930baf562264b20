use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tw_core::{ImageStrategy, SceneId};

use crate::story::Story;

/// Public view of one generated image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactRef {
    pub url: String,
    pub file_name: String,
    pub strategy: ImageStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationMetadata {
    pub genre: String,
    pub tone: String,
    pub art_style: String,
    pub audience: String,
    pub images_generated: usize,
    pub total_scenes: usize,
    pub generation_time: f64,
    pub cached_story: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub success: bool,
    pub story: Story,
    /// One entry per requested scene; `null` means no image could be made.
    pub images: BTreeMap<SceneId, Option<ArtifactRef>>,
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub cached_stories: usize,
    pub remote_enabled: bool,
    pub sdk_configured: bool,
    pub model_candidates: usize,
    pub memory_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanupResponse {
    pub success: bool,
    pub removed_files: usize,
    pub cached_stories: usize,
}
