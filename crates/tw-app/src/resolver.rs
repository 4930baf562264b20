use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};
use tw_core::{ImageArtifact, SceneId};

use crate::providers::ModelFallbackSequencer;

/// One scene's work order: the remote prompt plus the caption material the
/// placeholder renderer needs if remote generation falls through.
#[derive(Debug, Clone)]
pub struct SceneJob {
    pub scene: SceneId,
    pub prompt: String,
    pub caption: String,
    pub art_style: String,
}

#[async_trait]
pub trait ResolveScene: Send + Sync {
    async fn resolve(&self, job: &SceneJob) -> Option<ImageArtifact>;
}

/// Produces an image for a scene, or explicit absence. Remote backends
/// first, the local placeholder second; nothing here ever propagates an
/// error, because one scene's trouble must not touch its siblings.
pub struct SceneImageResolver {
    sequencer: ModelFallbackSequencer,
    artifact_dir: PathBuf,
}

impl SceneImageResolver {
    pub fn new(sequencer: ModelFallbackSequencer, artifact_dir: PathBuf) -> Self {
        Self {
            sequencer,
            artifact_dir,
        }
    }
}

#[async_trait]
impl ResolveScene for SceneImageResolver {
    async fn resolve(&self, job: &SceneJob) -> Option<ImageArtifact> {
        match self.sequencer.resolve(&job.prompt, job.scene).await {
            Ok(artifact) => {
                info!(
                    scene = job.scene.name(),
                    model = artifact.source_model.as_deref().unwrap_or("unknown"),
                    "remote image generated"
                );
                Some(artifact)
            }
            Err(e) => {
                info!(
                    scene = job.scene.name(),
                    error = %e,
                    "remote generation failed; rendering placeholder"
                );
                match tw_render::render(job.scene, &job.caption, &job.art_style, &self.artifact_dir)
                {
                    Ok(artifact) => Some(artifact),
                    Err(e) => {
                        error!(
                            scene = job.scene.name(),
                            error = %e,
                            "placeholder render failed; scene left without image"
                        );
                        None
                    }
                }
            }
        }
    }
}
