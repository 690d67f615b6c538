use std::collections::BTreeSet;

use crate::models::{Blamelet, Revision, Snapshot};
use crate::timeline::highlight::Highlighter;

/// Build the snapshot for `revision` from its blame.
///
/// Highlighted lines are the positions whose blamelet is attributed to
/// `revision` itself, so each snapshot marks only what that commit changed.
pub fn compose_snapshot(
    blamelets: &[Blamelet],
    revision: &Revision,
    filename: &str,
    highlighter: &dyn Highlighter,
) -> Snapshot {
    let source = reconstruct_source(blamelets);

    let highlighted_lines: BTreeSet<u32> = blamelets
        .iter()
        .filter(|b| b.commit_oid == revision.oid)
        .map(|b| b.position)
        .collect();

    let rendered_text = highlighter.highlight(&source, filename, &highlighted_lines);

    Snapshot {
        revision_short_id: revision.short_id().to_string(),
        revision: revision.clone(),
        highlighted_lines,
        line_count: blamelets.len(),
        source,
        rendered_text,
    }
}

pub fn reconstruct_source(blamelets: &[Blamelet]) -> String {
    blamelets
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
