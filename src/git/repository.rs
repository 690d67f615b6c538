use git2::{Repository, Status, StatusOptions};
use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, Result};
use crate::git::locate::locate_repository_root;
use crate::models::{RepositoryInfo, Revision};

/// Read-only handle on a repository with a known working tree root.
///
/// `git2::Repository` is not `Sync`, so threads that need the repository open
/// their own handle from `root` rather than sharing this one.
pub struct GitRepository {
    pub repo: Repository,
    pub root: PathBuf,
}

impl GitRepository {
    /// Open the repository enclosing `path` by walking upward from it.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let root = locate_repository_root(path)
            .ok_or_else(|| AppError::NotAGitRepository(path.display().to_string()))?;
        Self::open(root)
    }

    /// Open the repository whose working tree is rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let repo = Repository::open(&root)?;

        Ok(Self { repo, root })
    }

    /// Path of `file` relative to the working tree root, `/`-separated as git
    /// stores it.
    pub fn relative_path(&self, file: &Path) -> Result<String> {
        let invalid = || AppError::InvalidPath(file.display().to_string());
        let relative = file.strip_prefix(&self.root).map_err(|_| invalid())?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?),
                Component::CurDir => {}
                _ => return Err(invalid()),
            }
        }

        if parts.is_empty() {
            return Err(invalid());
        }
        Ok(parts.join("/"))
    }

    /// Short name of the checked-out branch, `None` when HEAD is detached or
    /// unborn.
    pub fn head_branch(&self) -> Option<String> {
        self.repo.head().ok().and_then(|h| {
            if h.is_branch() {
                h.shorthand().map(|s| s.to_string())
            } else {
                None
            }
        })
    }

    /// True when tracked files have no staged or unstaged changes. Untracked
    /// files do not count.
    pub fn is_clean(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let dirty = statuses.iter().any(|entry| is_change(entry.status()));
        Ok(!dirty)
    }

    pub fn require_clean(&self) -> Result<()> {
        if self.is_clean()? {
            Ok(())
        } else {
            Err(AppError::DirtyWorkingTree(self.root.display().to_string()))
        }
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let head_commit = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok().map(|c| revision_from_commit(&c)));

        Ok(RepositoryInfo {
            name,
            root: self.root.display().to_string(),
            head_branch: self.head_branch(),
            head_commit,
            is_clean: self.is_clean()?,
        })
    }
}

fn is_change(status: Status) -> bool {
    status.is_conflicted()
        || status.is_index_new()
        || status.is_index_modified()
        || status.is_index_deleted()
        || status.is_index_renamed()
        || status.is_index_typechange()
        || status.is_wt_modified()
        || status.is_wt_deleted()
        || status.is_wt_renamed()
        || status.is_wt_typechange()
}

pub fn revision_from_commit(commit: &git2::Commit) -> Revision {
    let timestamp = commit.time().seconds();
    Revision {
        oid: commit.id().to_string(),
        summary: commit.summary().unwrap_or("").trim().to_string(),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        timestamp,
        relative_time: format_relative_time(timestamp),
    }
}

/// Units for `relative_time`, largest first, in seconds.
const TIME_UNITS: [(&str, i64); 5] = [
    ("year", 365 * 86400),
    ("month", 30 * 86400),
    ("day", 86400),
    ("hour", 3600),
    ("minute", 60),
];

pub fn format_relative_time(timestamp: i64) -> String {
    relative_to(timestamp, chrono::Utc::now().timestamp())
}

/// "3 days ago" style age of `timestamp` as seen at `now`. Future timestamps
/// (clock skew between committers) read as "just now".
fn relative_to(timestamp: i64, now: i64) -> String {
    let age = now - timestamp;

    TIME_UNITS
        .iter()
        .find(|(_, secs)| age >= *secs)
        .map(|(unit, secs)| {
            let count = age / secs;
            let plural = if count == 1 { "" } else { "s" };
            format!("{} {}{} ago", count, unit, plural)
        })
        .unwrap_or_else(|| "just now".to_string())
}
