use serde::{Deserialize, Serialize};

/// Length of the abbreviated revision id shown on each snapshot.
pub const SHORT_ID_LEN: usize = 9;

/// A commit that changed the tracked file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub oid: String,
    pub summary: String,
    pub author: String,
    pub timestamp: i64,
    pub relative_time: String,
}

impl Revision {
    /// First nine characters of the full hash. Not guaranteed unique.
    pub fn short_id(&self) -> &str {
        &self.oid[..self.oid.len().min(SHORT_ID_LEN)]
    }
}
