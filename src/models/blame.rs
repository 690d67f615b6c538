//! Blame data for one file at one revision.
//!
//! The backend reports blame as runs of lines sharing an origin commit; these
//! types hold the flattened, one-entry-per-line form.

use serde::Serialize;

/// One physical source line and the commit that last changed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blamelet {
    /// Line number (1-indexed) in the file as of the blamed revision
    pub position: u32,
    /// OID of the commit that last modified this line
    pub commit_oid: String,
    /// Line text without its trailing newline
    pub text: String,
}
