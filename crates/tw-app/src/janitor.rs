//! Periodic reclamation of disk artifacts and in-memory caches.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sysinfo::{get_current_pid, ProcessesToUpdate, System};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::config::AppConfig;
use crate::story::Story;

/// Extensions the sweep is allowed to delete; anything else in the artifact
/// directory is left alone.
const SWEEPABLE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// Background task that sweeps expired artifacts and keeps the story cache
/// inside its cap. Runs on a fixed interval until shutdown is signalled.
pub struct ResourceJanitor {
    interval: Duration,
    retention: Duration,
    artifact_dir: PathBuf,
    story_cache: Arc<ResultCache<Story>>,
}

impl ResourceJanitor {
    pub fn new(config: &AppConfig, story_cache: Arc<ResultCache<Story>>) -> Self {
        Self {
            interval: config.cleanup_interval,
            retention: config.retention,
            artifact_dir: config.artifact_dir.clone(),
            story_cache,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once();
                }
                _ = shutdown.changed() => {
                    info!("janitor shutting down");
                    return;
                }
            }
        }
    }

    /// One full pass: expired files, then cache pressure, then a memory
    /// reading for the log.
    pub fn run_once(&self) -> usize {
        let removed = sweep_artifacts(&self.artifact_dir, self.retention);
        self.story_cache.evict_if_oversize();
        debug!(
            removed,
            cached_stories = self.story_cache.len(),
            memory_mb = format!("{:.1}", process_memory_mb()),
            "janitor pass complete"
        );
        removed
    }
}

/// Deletes generated files older than `retention`. Returns how many were
/// removed. A missing directory counts as an empty one, and per-file
/// trouble never aborts the sweep.
pub fn sweep_artifacts(dir: &Path, retention: Duration) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut removed = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "unreadable directory entry; skipping");
                continue;
            }
        };
        let path = entry.path();
        if !is_sweepable(&path) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .map(|modified| modified.elapsed().unwrap_or_default());
        match age {
            Ok(age) if age > retention => match std::fs::remove_file(&path) {
                Ok(()) => {
                    info!(path = %path.display(), age_secs = age.as_secs(), "removed expired artifact");
                    removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove artifact");
                }
            },
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not stat artifact");
            }
        }
    }
    removed
}

fn is_sweepable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SWEEPABLE_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
}

/// Current process RSS in megabytes, or zero when the reading fails.
pub fn process_memory_mb() -> f64 {
    let pid = match get_current_pid() {
        Ok(pid) => pid,
        Err(_) => return 0.0,
    };
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    match system.process(pid) {
        Some(process) => process.memory() as f64 / (1024.0 * 1024.0),
        None => 0.0,
    }
}

/// Pre-request pressure check against the high watermark.
pub fn guard_before_request(config: &AppConfig, story_cache: &ResultCache<Story>) {
    let memory_mb = process_memory_mb();
    if memory_mb > config.high_watermark_mb as f64 {
        warn!(
            memory_mb = format!("{memory_mb:.1}"),
            watermark_mb = config.high_watermark_mb,
            "high memory before request; shedding caches"
        );
        story_cache.shed_oldest();
    }
}

/// Post-request re-check against the lower watermark.
pub fn guard_after_request(config: &AppConfig, story_cache: &ResultCache<Story>) {
    let memory_mb = process_memory_mb();
    if memory_mb > config.low_watermark_mb as f64 {
        debug!(
            memory_mb = format!("{memory_mb:.1}"),
            watermark_mb = config.low_watermark_mb,
            "elevated memory after request; shedding caches"
        );
        story_cache.shed_oldest();
    }
}
