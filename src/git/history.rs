use git2::Sort;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::repository::{revision_from_commit, GitRepository};
use crate::models::Revision;

impl GitRepository {
    /// Commits reachable from HEAD that changed `path`, oldest first.
    ///
    /// `path` is relative to the working tree root. Fails with
    /// `FileNotTracked` when no commit touches it.
    pub fn revisions_for_path(&self, path: &str) -> Result<Vec<Revision>> {
        if self.repo.is_empty()? {
            return Err(AppError::FileNotTracked(path.to_string()));
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        let mut revisions = Vec::new();

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            if commit_touches_path(&commit, path)? {
                revisions.push(revision_from_commit(&commit));
            }
        }

        if revisions.is_empty() {
            return Err(AppError::FileNotTracked(path.to_string()));
        }

        // The walk is newest first; timelines read earliest to latest.
        revisions.reverse();

        tracing::debug!("{} revisions touch {}", revisions.len(), path);
        Ok(revisions)
    }
}

/// True if the entry at `path` (id and mode, or its presence) differs
/// between `commit` and its first parent. A root commit touches every path it
/// contains.
fn commit_touches_path(commit: &git2::Commit, path: &str) -> Result<bool> {
    let path = Path::new(path);
    let entry_at = |tree: &git2::Tree| tree.get_path(path).ok().map(|e| (e.id(), e.filemode()));

    let current = entry_at(&commit.tree()?);
    let previous = match commit.parents().next() {
        Some(parent) => entry_at(&parent.tree()?),
        None => None,
    };

    Ok(current != previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::TestRepo;

    #[test]
    fn revisions_are_oldest_first() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        let first = test.commit_file("story.txt", "once\n", "Start story")?;
        let second = test.commit_file("story.txt", "once\nupon\n", "Continue story")?;
        let third = test.commit_file("story.txt", "once\nupon\na time\n", "Finish story")?;
        let repo = test.open()?;

        let oids: Vec<String> = repo
            .revisions_for_path("story.txt")?
            .into_iter()
            .map(|r| r.oid)
            .collect();
        assert_eq!(oids, vec![first, second, third]);
        Ok(())
    }

    #[test]
    fn commits_to_other_files_are_skipped() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        let created = test.commit_file("main.rs", "fn main() {}\n", "Add main")?;
        test.commit_file("README.md", "# readme\n", "Add readme")?;
        test.commit_file("main.rs.bak", "backup\n", "Add backup")?;
        let edited = test.commit_file("main.rs", "fn main() { }\n", "Tweak main")?;
        let repo = test.open()?;

        let revisions = repo.revisions_for_path("main.rs")?;
        let oids: Vec<&str> = revisions.iter().map(|r| r.oid.as_str()).collect();
        assert_eq!(oids, vec![created.as_str(), edited.as_str()]);
        assert_eq!(revisions[1].summary, "Tweak main");
        Ok(())
    }

    #[test]
    fn nested_paths_match_exactly() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        let oid = test.commit_file("src/deep/mod.rs", "mod x;\n", "Add module")?;
        test.commit_file("src/mod.rs", "mod deep;\n", "Add parent module")?;
        let repo = test.open()?;

        let revisions = repo.revisions_for_path("src/deep/mod.rs")?;
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].oid, oid);
        Ok(())
    }

    #[test]
    fn ordering_is_stable_across_calls() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        for i in 0..5 {
            test.commit_file("counter.txt", &format!("{i}\n"), &format!("Count {i}"))?;
        }
        let repo = test.open()?;

        let first: Vec<String> = repo.revisions_for_path("counter.txt")?.into_iter().map(|r| r.oid).collect();
        let second: Vec<String> = repo.revisions_for_path("counter.txt")?.into_iter().map(|r| r.oid).collect();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn untracked_file_is_reported() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        test.commit_file("tracked.txt", "yes\n", "Add tracked")?;
        let repo = test.open()?;

        assert!(matches!(
            repo.revisions_for_path("missing.txt"),
            Err(AppError::FileNotTracked(_))
        ));
        Ok(())
    }

    #[test]
    fn empty_repository_has_no_history() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        let repo = test.open()?;

        assert!(matches!(
            repo.revisions_for_path("anything.txt"),
            Err(AppError::FileNotTracked(_))
        ));
        Ok(())
    }

    #[test]
    fn deletion_and_mode_change_count_as_touches() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        let created = test.commit_file("run.sh", "echo hi\n", "Add script")?;

        let mut index = test.repo.index()?;
        let mut entry = index.get_path(Path::new("run.sh"), 0).expect("staged entry");
        entry.mode = 0o100755;
        index.add(&entry)?;
        index.write()?;
        let tree = test.repo.find_tree(index.write_tree()?)?;
        let sig = test.repo.signature()?;
        let parent = test.repo.head()?.peel_to_commit()?;
        let chmod = test
            .repo
            .commit(Some("HEAD"), &sig, &sig, "Make executable", &tree, &[&parent])?
            .to_string();

        test.commit_file("other.txt", "x\n", "Unrelated")?;
        let removed = test.delete_file("run.sh", "Drop script")?;
        let repo = test.open()?;

        let oids: Vec<String> = repo.revisions_for_path("run.sh")?.into_iter().map(|r| r.oid).collect();
        assert_eq!(oids, vec![created, chmod, removed]);
        Ok(())
    }
}
