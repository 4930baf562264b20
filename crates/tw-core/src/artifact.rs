use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scene::SceneId;

/// The transport/source that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStrategy {
    RemoteSdk,
    RemoteHttp,
    LocalRender,
}

impl ImageStrategy {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteSdk | Self::RemoteHttp)
    }
}

/// One generated scene illustration plus its provenance. The file itself is
/// owned by the artifact directory until the janitor reclaims it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub scene: SceneId,
    pub file_name: String,
    pub path: PathBuf,
    pub strategy: ImageStrategy,
    pub source_model: Option<String>,
}

/// Make a model identifier safe to embed in a filename.
pub fn sanitize_model(model: &str) -> String {
    model.replace(['/', ' '], "_")
}
