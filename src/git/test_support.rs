//! Throwaway git repositories for unit tests.

use git2::{Commit, Repository};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::git::GitRepository;

/// A freshly initialised repository in a temp dir with a configured user.
pub struct TestRepo {
    dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn init() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let repo = Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(Self { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn open(&self) -> anyhow::Result<GitRepository> {
        Ok(GitRepository::open(self.path())?)
    }

    /// Write `content` to `rel` in the working tree without staging it.
    pub fn write(&self, rel: &str, content: &str) -> anyhow::Result<()> {
        let full = self.path().join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
        Ok(())
    }

    /// Write, stage and commit a single file on top of HEAD. Returns the new
    /// commit's full hash.
    pub fn commit_file(&self, rel: &str, content: &str, message: &str) -> anyhow::Result<String> {
        self.write(rel, content)?;

        let mut index = self.repo.index()?;
        index.add_path(Path::new(rel))?;
        index.write()?;
        self.commit_index(message)
    }

    /// Remove a tracked file and commit the deletion.
    pub fn delete_file(&self, rel: &str, message: &str) -> anyhow::Result<String> {
        fs::remove_file(self.path().join(rel))?;

        let mut index = self.repo.index()?;
        index.remove_path(Path::new(rel))?;
        index.write()?;
        self.commit_index(message)
    }

    fn commit_index(&self, message: &str) -> anyhow::Result<String> {
        let sig = self.repo.signature()?;
        let tree_id = self.repo.index()?.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(oid.to_string())
    }

    /// Full content of `rel` as stored in commit `oid`.
    pub fn content_at(&self, oid: &str, rel: &str) -> anyhow::Result<String> {
        let commit = self.repo.find_commit(git2::Oid::from_str(oid)?)?;
        let entry = commit.tree()?.get_path(Path::new(rel))?;
        let blob = self.repo.find_blob(entry.id())?;
        Ok(String::from_utf8(blob.content().to_vec())?)
    }
}
