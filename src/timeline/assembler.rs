//! Timeline assembly: locate → check clean → enumerate → blame+compose per
//! revision.
//!
//! The per-revision step runs on a bounded rayon pool. Each worker opens its
//! own handle on the repository root (libgit2 handles are not `Sync`), and
//! results are collected by revision index so the output order never depends
//! on which worker finishes first. Any failure fails the whole timeline.

use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::git::GitRepository;
use crate::models::{Revision, Snapshot, Timeline};
use crate::timeline::composer::compose_snapshot;
use crate::timeline::highlight::Highlighter;

#[derive(Debug, Clone)]
pub struct TimelineOptions {
    /// Worker threads for per-revision blame and highlighting
    pub jobs: usize,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Builds timelines on one shared worker pool, so concurrent callers never
/// run more than `jobs` blame workers in total.
pub struct TimelineAssembler {
    pool: ThreadPool,
    highlighter: Arc<dyn Highlighter>,
}

impl TimelineAssembler {
    pub fn new(options: TimelineOptions, highlighter: Arc<dyn Highlighter>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs.max(1))
            .thread_name(|i| format!("timeline-{}", i))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to start worker pool: {}", e)))?;

        Ok(Self { pool, highlighter })
    }

    /// Build the timeline for `file`, an already-resolved path inside a
    /// working tree.
    pub fn assemble(&self, file: &Path) -> Result<Timeline> {
        self.assemble_with_cancel(file, &CancellationToken::new())
    }

    pub fn assemble_with_cancel(&self, file: &Path, cancel: &CancellationToken) -> Result<Timeline> {
        let repo = GitRepository::discover(file)?;
        tracing::info!("Repository root: {}", repo.root.display());

        repo.require_clean()?;

        let path = repo.relative_path(file)?;
        let branch = repo.head_branch();
        let revisions = repo.revisions_for_path(&path)?;
        tracing::info!("Building timeline for {}: {} revisions", path, revisions.len());

        let start = Instant::now();
        let snapshots = self.compose_snapshots(&repo.root, &path, &revisions, cancel)?;
        tracing::info!(
            "Timeline built: {} snapshots in {:?}",
            snapshots.len(),
            start.elapsed()
        );

        Ok(Timeline {
            repository_root: repo.root.display().to_string(),
            path,
            branch,
            snapshots,
        })
    }

    fn compose_snapshots(
        &self,
        root: &Path,
        path: &str,
        revisions: &[Revision],
        cancel: &CancellationToken,
    ) -> Result<Vec<Snapshot>> {
        let highlighter = self.highlighter.as_ref();

        self.pool.install(|| {
            revisions
                .par_iter()
                .map_init(
                    || GitRepository::open(root),
                    |repo, revision| {
                        if cancel.is_cancelled() {
                            return Err(AppError::Cancelled);
                        }

                        let repo = match repo {
                            Ok(repo) => repo,
                            Err(e) => {
                                return Err(AppError::Internal(format!(
                                    "Failed to open repository in worker: {}",
                                    e
                                )));
                            }
                        };

                        tracing::debug!("Blaming {} at {}", path, revision.short_id());
                        let blamelets = repo.blame_at(path, revision)?;
                        Ok(compose_snapshot(&blamelets, revision, path, highlighter))
                    },
                )
                .collect::<Result<Vec<Snapshot>>>()
        })
    }
}
