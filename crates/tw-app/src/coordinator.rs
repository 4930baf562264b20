use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::warn;
use tw_core::{ImageArtifact, SceneId};

use crate::resolver::{ResolveScene, SceneJob};

/// Fans scene resolution out across a bounded worker pool and joins the
/// results under one overall deadline.
///
/// Every requested scene is present in the output map, artifact or not;
/// callers never have to distinguish "still running" from "failed". Tasks
/// that outlive the deadline are abandoned, not interrupted: their handles
/// are dropped, whatever file they eventually write stays valid on disk,
/// and the janitor reclaims it later.
pub struct ParallelSceneCoordinator {
    resolver: Arc<dyn ResolveScene>,
    workers: usize,
    deadline: Duration,
}

impl ParallelSceneCoordinator {
    pub fn new(resolver: Arc<dyn ResolveScene>, workers: usize, deadline: Duration) -> Self {
        Self {
            resolver,
            workers: workers.max(1),
            deadline,
        }
    }

    pub async fn resolve_all(
        &self,
        jobs: Vec<SceneJob>,
    ) -> BTreeMap<SceneId, Option<ImageArtifact>> {
        // Pre-seed with absence so deadline and panic paths need no bookkeeping.
        let mut results: BTreeMap<SceneId, Option<ImageArtifact>> =
            jobs.iter().map(|job| (job.scene, None)).collect();

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let deadline = Instant::now() + self.deadline;

        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            let resolver = Arc::clone(&self.resolver);
            let semaphore = Arc::clone(&semaphore);
            let scene = job.scene;
            handles.push((
                scene,
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return None,
                    };
                    resolver.resolve(&job).await
                }),
            ));
        }

        // Tasks may finish in any order; the per-handle wait only ever
        // shrinks toward the shared deadline.
        for (scene, handle) in handles {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, handle).await {
                Ok(Ok(outcome)) => {
                    results.insert(scene, outcome);
                }
                Ok(Err(e)) => {
                    warn!(scene = scene.name(), error = %e, "scene task failed");
                }
                Err(_) => {
                    warn!(scene = scene.name(), "deadline elapsed; abandoning scene task");
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tw_core::ImageStrategy;

    fn artifact(scene: SceneId) -> ImageArtifact {
        ImageArtifact {
            scene,
            file_name: format!("fallback_{}_0.png", scene.slug()),
            path: PathBuf::from("unused"),
            strategy: ImageStrategy::LocalRender,
            source_model: None,
        }
    }

    fn jobs() -> Vec<SceneJob> {
        SceneId::ALL
            .iter()
            .map(|scene| SceneJob {
                scene: *scene,
                prompt: String::new(),
                caption: String::new(),
                art_style: "cartoon".into(),
            })
            .collect()
    }

    /// Sleeps per-scene, then succeeds or fails as configured.
    struct StubResolver {
        delays: HashMap<SceneId, Duration>,
        absent: Vec<SceneId>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubResolver {
        fn instant() -> Self {
            Self {
                delays: HashMap::new(),
                absent: Vec::new(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResolveScene for StubResolver {
        async fn resolve(&self, job: &SceneJob) -> Option<ImageArtifact> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delays.get(&job.scene) {
                tokio::time::sleep(*delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.absent.contains(&job.scene) {
                None
            } else {
                Some(artifact(job.scene))
            }
        }
    }

    #[tokio::test]
    async fn test_every_scene_gets_an_entry() {
        let coordinator = ParallelSceneCoordinator::new(
            Arc::new(StubResolver::instant()),
            4,
            Duration::from_secs(5),
        );
        let results = coordinator.resolve_all(jobs()).await;
        assert_eq!(results.len(), 4);
        for scene in SceneId::ALL {
            assert!(results[&scene].is_some(), "{} missing", scene.name());
        }
    }

    #[tokio::test]
    async fn test_deadline_abandons_slow_scene_only() {
        let mut resolver = StubResolver::instant();
        resolver
            .delays
            .insert(SceneId::Climax, Duration::from_secs(30));
        let coordinator =
            ParallelSceneCoordinator::new(Arc::new(resolver), 4, Duration::from_millis(200));

        let results = coordinator.resolve_all(jobs()).await;
        assert_eq!(results.len(), 4);
        assert!(results[&SceneId::Climax].is_none());
        for scene in [SceneId::Introduction, SceneId::RisingAction, SceneId::Resolution] {
            assert!(results[&scene].is_some(), "{} missing", scene.name());
        }
    }

    #[tokio::test]
    async fn test_absent_scene_does_not_disturb_siblings() {
        let mut resolver = StubResolver::instant();
        resolver.absent.push(SceneId::RisingAction);
        let coordinator =
            ParallelSceneCoordinator::new(Arc::new(resolver), 4, Duration::from_secs(5));

        let results = coordinator.resolve_all(jobs()).await;
        assert!(results[&SceneId::RisingAction].is_none());
        assert!(results[&SceneId::Introduction].is_some());
        assert!(results[&SceneId::Climax].is_some());
        assert!(results[&SceneId::Resolution].is_some());
    }

    #[tokio::test]
    async fn test_worker_cap_limits_concurrency() {
        let mut resolver = StubResolver::instant();
        for scene in SceneId::ALL {
            resolver.delays.insert(scene, Duration::from_millis(50));
        }
        let resolver = Arc::new(resolver);
        let coordinator =
            ParallelSceneCoordinator::new(Arc::clone(&resolver) as Arc<dyn ResolveScene>, 2, Duration::from_secs(5));

        coordinator.resolve_all(jobs()).await;
        assert!(resolver.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_empty_job_list_yields_empty_map() {
        let coordinator = ParallelSceneCoordinator::new(
            Arc::new(StubResolver::instant()),
            4,
            Duration::from_secs(1),
        );
        assert!(coordinator.resolve_all(Vec::new()).await.is_empty());
    }
}
