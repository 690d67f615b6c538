//! Upward search for the repository enclosing a path.
//!
//! Walks from the given path towards the filesystem root, one parent at a
//! time, and stops at the first directory holding a `.git` entry (a directory
//! for normal clones, a gitfile for worktrees and submodules). Never touches
//! the process working directory.

use std::path::{Path, PathBuf};

/// Metadata entry marking a working tree root.
pub const REPOSITORY_MARKER: &str = ".git";

/// Returns the nearest ancestor of `path` (itself included) that contains a
/// repository marker, or `None` once the filesystem root has been checked.
pub fn locate_repository_root(path: &Path) -> Option<PathBuf> {
    let mut current = Some(path);

    while let Some(dir) = current {
        // A relative path runs out as "", which would silently mean the cwd.
        if !dir.as_os_str().is_empty() && dir.join(REPOSITORY_MARKER).exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }

    None
}
