use serde::{Deserialize, Serialize};

use super::Revision;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub root: String,
    pub head_branch: Option<String>,
    pub head_commit: Option<Revision>,
    pub is_clean: bool,
}
