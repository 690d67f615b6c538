//! Timeline data transfer objects.
//!
//! A `Timeline` is what the rendering layer consumes: one `Snapshot` per
//! revision that touched the file, oldest first.

use std::collections::BTreeSet;

use serde::Serialize;

use super::Revision;

/// The file as it looked at one revision.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Abbreviated id of the revision this snapshot represents
    pub revision_short_id: String,
    /// Full commit metadata for the revision
    pub revision: Revision,
    /// Lines (1-indexed) last changed by this revision
    pub highlighted_lines: BTreeSet<u32>,
    /// Number of lines in the reconstructed file
    pub line_count: usize,
    /// Reconstructed file text, lines joined with `\n`
    pub source: String,
    /// Highlighter output for `source`, embedded as-is by renderers
    pub rendered_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub repository_root: String,
    /// Path of the file relative to the repository root
    pub path: String,
    pub branch: Option<String>,
    pub snapshots: Vec<Snapshot>,
}
