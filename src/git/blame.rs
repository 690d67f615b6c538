//! Per-line attribution of a file at a given revision.
//!
//! libgit2 reports blame as hunks: runs of consecutive lines that share an
//! origin commit. `flatten_runs` turns those into one `Blamelet` per physical
//! line, pairing each with its text from the blob at the same revision.

use git2::{BlameOptions, Oid};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;
use crate::models::{Blamelet, Revision};

/// A run of consecutive lines attributed to one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameRun {
    pub commit_oid: String,
    /// First line of the run (1-indexed)
    pub start_line: usize,
    pub len: usize,
}

impl GitRepository {
    /// Blame `path` as of `revision`, one entry per line of the file at that
    /// revision.
    pub fn blame_at(&self, path: &str, revision: &Revision) -> Result<Vec<Blamelet>> {
        let failure = |reason: String| AppError::BlameFailure {
            path: path.to_string(),
            revision: revision.oid.clone(),
            reason,
        };

        let oid = Oid::from_str(&revision.oid)?;
        let commit = self.repo.find_commit(oid)?;
        let entry = commit
            .tree()?
            .get_path(Path::new(path))
            .map_err(|e| failure(e.message().to_string()))?;
        let blob = entry
            .to_object(&self.repo)?
            .into_blob()
            .map_err(|_| failure("not a regular file".to_string()))?;

        let content = String::from_utf8_lossy(blob.content());
        let lines = split_lines(&content);

        let mut opts = BlameOptions::new();
        opts.newest_commit(oid);

        let blame = self
            .repo
            .blame_file(Path::new(path), Some(&mut opts))
            .map_err(|e| failure(e.message().to_string()))?;

        let runs: Vec<BlameRun> = blame
            .iter()
            .map(|hunk| BlameRun {
                commit_oid: hunk.final_commit_id().to_string(),
                start_line: hunk.final_start_line(),
                len: hunk.lines_in_hunk(),
            })
            .collect();

        flatten_runs(&runs, &lines).map_err(failure)
    }
}

/// Split file content into physical lines without their `\n`. A final line
/// with no newline still counts; `\r` is kept so the text round-trips.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split_inclusive('\n')
        .map(|line| line.strip_suffix('\n').unwrap_or(line))
        .collect()
}

/// Expand blame runs into one blamelet per line. Positions are the 1-based
/// index in the flattened sequence; the runs must cover `lines` exactly once,
/// in order.
pub fn flatten_runs(runs: &[BlameRun], lines: &[&str]) -> std::result::Result<Vec<Blamelet>, String> {
    let mut blamelets: Vec<Blamelet> = Vec::with_capacity(lines.len());

    for run in runs {
        for offset in 0..run.len {
            let position = blamelets.len() + 1;
            let reported = run.start_line + offset;
            if reported != position {
                return Err(format!(
                    "blame reported line {} where line {} was expected",
                    reported, position
                ));
            }

            let text = lines.get(position - 1).ok_or_else(|| {
                format!(
                    "blame covers line {} but the file has {} lines",
                    position,
                    lines.len()
                )
            })?;

            blamelets.push(Blamelet {
                position: position as u32,
                commit_oid: run.commit_oid.clone(),
                text: (*text).to_string(),
            });
        }
    }

    if blamelets.len() != lines.len() {
        return Err(format!(
            "blame covers {} of {} lines",
            blamelets.len(),
            lines.len()
        ));
    }

    Ok(blamelets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::TestRepo;

    fn run(commit: &str, start_line: usize, len: usize) -> BlameRun {
        BlameRun {
            commit_oid: commit.to_string(),
            start_line,
            len,
        }
    }

    #[test]
    fn split_lines_keeps_blank_lines_and_unterminated_tail() {
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("dos\r\nline\r\n"), vec!["dos\r", "line\r"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn flatten_assigns_sequential_positions() {
        let lines = vec!["one", "two", "", "four"];
        let runs = vec![run("aaa", 1, 2), run("bbb", 3, 1), run("aaa", 4, 1)];

        let blamelets = flatten_runs(&runs, &lines).unwrap();
        let summary: Vec<(u32, &str, &str)> = blamelets
            .iter()
            .map(|b| (b.position, b.commit_oid.as_str(), b.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "aaa", "one"),
                (2, "aaa", "two"),
                (3, "bbb", ""),
                (4, "aaa", "four"),
            ]
        );
    }

    #[test]
    fn flatten_rejects_uncovered_lines() {
        let lines = vec!["one", "two", "three"];
        assert!(flatten_runs(&[run("aaa", 1, 2)], &lines).is_err());
    }

    #[test]
    fn flatten_rejects_overlong_runs() {
        let lines = vec!["one"];
        assert!(flatten_runs(&[run("aaa", 1, 2)], &lines).is_err());
    }

    #[test]
    fn flatten_rejects_gaps() {
        let lines = vec!["one", "two", "three"];
        assert!(flatten_runs(&[run("aaa", 1, 1), run("bbb", 3, 1)], &lines).is_err());
    }

    #[test]
    fn flatten_empty_file() {
        assert_eq!(flatten_runs(&[], &[]).unwrap(), Vec::new());
    }

    #[test]
    fn blame_attributes_appended_line() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        let c1 = test.commit_file("list.txt", "a\nb\nc\n", "Three lines")?;
        let c2 = test.commit_file("list.txt", "a\nb\nc\nd\n", "Fourth line")?;
        let repo = test.open()?;
        let revisions = repo.revisions_for_path("list.txt")?;

        let at_c1 = repo.blame_at("list.txt", &revisions[0])?;
        assert_eq!(at_c1.len(), 3);
        assert!(at_c1.iter().all(|b| b.commit_oid == c1));

        let at_c2 = repo.blame_at("list.txt", &revisions[1])?;
        let owners: Vec<&str> = at_c2.iter().map(|b| b.commit_oid.as_str()).collect();
        assert_eq!(owners, vec![c1.as_str(), c1.as_str(), c1.as_str(), c2.as_str()]);
        let texts: Vec<&str> = at_c2.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        Ok(())
    }

    #[test]
    fn blame_reconstructs_historical_content() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        test.commit_file("poem.txt", "roses\n\nviolets\n", "Draft")?;
        test.commit_file("poem.txt", "roses are red\n\nviolets\nare blue", "Revise")?;
        let repo = test.open()?;

        for revision in repo.revisions_for_path("poem.txt")? {
            let blamelets = repo.blame_at("poem.txt", &revision)?;
            let expected = test.content_at(&revision.oid, "poem.txt")?;
            let texts: Vec<&str> = blamelets.iter().map(|b| b.text.as_str()).collect();
            assert_eq!(texts, split_lines(&expected));
        }
        Ok(())
    }

    #[test]
    fn blame_of_deleted_file_fails() -> anyhow::Result<()> {
        let test = TestRepo::init()?;
        test.commit_file("gone.txt", "bye\n", "Add")?;
        test.delete_file("gone.txt", "Remove")?;
        let repo = test.open()?;

        let revisions = repo.revisions_for_path("gone.txt")?;
        assert_eq!(revisions.len(), 2);
        assert!(matches!(
            repo.blame_at("gone.txt", &revisions[1]),
            Err(AppError::BlameFailure { .. })
        ));
        Ok(())
    }
}
