//! Read-only queries against a git checkout, answered by the system `git`.
//!
//! Lookups that can legitimately come back empty (describing HEAD, finding a
//! previous tag) return `Option` so callers never branch on error strings.

use crate::errors::{Result, TagcutError};
use crate::process::format_command_display;
use crate::types::{ReleasePoint, TagKind};
use chrono::DateTime;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

const RECORD_SEPARATOR: char = '\u{1e}';
const FIELD_SEPARATOR: char = '\u{1f}';

/// A commit as reported by `git log`, before changelog filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub short_sha: String,
    pub parent_count: usize,
    pub message: String,
}

impl RawCommit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// A git working tree.
#[derive(Debug, Clone)]
pub struct Checkout {
    root: PathBuf,
}

impl Checkout {
    /// Open the checkout containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| crate::process::spawn_error(e, "git"))?;

        if !output.status.success() {
            return Err(TagcutError::Git(format!(
                "{} is not a git repository: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Top-level directory of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when tracked files differ from HEAD, staged or not.
    pub fn is_dirty(&self) -> Result<bool> {
        let out = self.run(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!out.trim().is_empty())
    }

    /// Files that are neither tracked nor ignored, relative to the root.
    pub fn untracked_files(&self) -> Result<Vec<String>> {
        let out = self.run(&["ls-files", "--others", "--exclude-standard", "-z"])?;
        Ok(out
            .split('\0')
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Namespaced ref exactly at HEAD (`tags/v1.2.3`, `heads/main`), if any.
    ///
    /// Tags take precedence over branches pointing at the same commit.
    pub fn describe_head(&self) -> Option<String> {
        self.try_run(&["describe", "--all", "--exact-match", "HEAD"])
            .map(|out| out.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Resolve a tag name to the commit it designates and its storage kind.
    pub fn resolve_tag(&self, name: &str) -> Result<ReleasePoint> {
        let refname = format!("refs/tags/{name}");
        let format = "--format=%(objecttype)%00%(objectname)%00%(taggerdate:iso-strict)%00%(contents:subject)";
        let out = self.run(&["for-each-ref", format, &refname])?;
        let line = out.lines().next().ok_or_else(|| {
            TagcutError::Git(format!("tag {name} does not exist"))
        })?;

        let mut fields = line.split('\0');
        let object_type = fields.next().unwrap_or_default();
        let object = fields.next().unwrap_or_default().to_string();
        let date = fields
            .next()
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok());
        let message = fields.next().unwrap_or_default().to_string();

        let commit = self
            .run(&["rev-parse", "--verify", &format!("{refname}^{{commit}}")])?
            .trim()
            .to_string();

        let kind = if object_type == "tag" {
            TagKind::Annotated {
                object,
                message,
                date,
            }
        } else {
            TagKind::Lightweight
        };

        Ok(ReleasePoint {
            tag: name.to_string(),
            commit,
            kind,
        })
    }

    /// Nearest annotated tag reachable from the first parent of `commit`, if any.
    ///
    /// Lightweight tags are skipped so scratch markers never bound a changelog.
    pub fn nearest_tag_before(&self, commit: &str) -> Option<String> {
        self.try_run(&["describe", "--abbrev=0", &format!("{commit}^")])
            .map(|out| out.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Identifier of the empty tree in this repository's hash format.
    pub fn empty_tree(&self) -> Result<String> {
        let mut cmd = self.git();
        cmd.args(["hash-object", "-t", "tree", "--stdin"])
            .stdin(Stdio::null());
        let out = self.capture(cmd)?;
        Ok(out.trim().to_string())
    }

    /// Commits in `range`, in git's native newest-first order.
    pub fn commits(&self, range: &str) -> Result<Vec<RawCommit>> {
        let format = format!("--format={RECORD_SEPARATOR}%h{FIELD_SEPARATOR}%p{FIELD_SEPARATOR}%B");
        let out = self.run(&["log", "--no-color", &format, range, "--"])?;
        Ok(parse_log(&out))
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.root);
        cmd.arg("-c").arg("core.quotePath=false");
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = self.git();
        cmd.args(args);
        self.capture(cmd)
    }

    fn try_run(&self, args: &[&str]) -> Option<String> {
        match self.run(args) {
            Ok(out) => Some(out),
            Err(e) => {
                debug!(error = %e, "git query returned nothing");
                None
            }
        }
    }

    fn capture(&self, mut cmd: Command) -> Result<String> {
        let shown = format_command_display(&cmd);
        debug!(command = %shown, "running git");

        let output = cmd
            .output()
            .map_err(|e| crate::process::spawn_error(e, "git"))?;

        if !output.status.success() {
            return Err(TagcutError::Git(format!(
                "`{}` failed with {}: {}",
                shown,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_log(out: &str) -> Vec<RawCommit> {
    out.split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let mut fields = record.splitn(3, FIELD_SEPARATOR);
            let short_sha = fields.next()?.trim().to_string();
            let parent_count = fields.next()?.split_whitespace().count();
            let message = fields.next().unwrap_or_default().trim_start().to_string();
            Some(RawCommit {
                short_sha,
                parent_count,
                message,
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::process::Command;

    /// Run git in `dir` with a fixed identity, panicking on failure.
    pub fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "Test Author")
            .env("GIT_AUTHOR_EMAIL", "author@example.com")
            .env("GIT_COMMITTER_NAME", "Test Author")
            .env("GIT_COMMITTER_EMAIL", "author@example.com")
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .expect("git should be installed");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn init_repo(dir: &Path) {
        git(dir, &["init", "-q"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
        git(dir, &["config", "tag.gpgsign", "false"]);
    }

    /// Commit a change to `file` with `message`, returning the full sha.
    pub fn commit(dir: &Path, file: &str, message: &str) -> String {
        let path = dir.join(file);
        let previous = std::fs::read_to_string(&path).unwrap_or_default();
        std::fs::write(&path, format!("{previous}{message}\n")).unwrap();
        git(dir, &["add", file]);
        git(dir, &["commit", "-q", "-m", message]);
        git(dir, &["rev-parse", "HEAD"])
    }

    pub fn annotated_tag(dir: &Path, name: &str) {
        git(dir, &["tag", "-a", name, "-m", &format!("Release {name}")]);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn parse_log_splits_records_and_counts_parents() {
        let out = format!(
            "{r}abc1234{f}def5678{f}Fix bug #42\n\nLonger body\n{r}def5678{f}aaa1111 bbb2222{f}Merge branch 'x'\n{r}aaa1111{f}{f}Initial commit\n",
            r = RECORD_SEPARATOR,
            f = FIELD_SEPARATOR
        );
        let commits = parse_log(&out);
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].short_sha, "abc1234");
        assert_eq!(commits[0].parent_count, 1);
        assert_eq!(commits[0].summary(), "Fix bug #42");
        assert_eq!(commits[1].parent_count, 2);
        assert_eq!(commits[2].parent_count, 0);
        assert_eq!(commits[2].summary(), "Initial commit");
    }

    #[test]
    fn open_rejects_non_repository() {
        let temp = tempfile::tempdir().unwrap();
        let err = Checkout::open(temp.path()).unwrap_err();
        assert!(matches!(err, TagcutError::Git(_)));
    }

    #[test]
    fn reports_dirty_and_untracked_state() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);
        commit(dir, "README", "Initial commit");

        let checkout = Checkout::open(dir).unwrap();
        assert!(!checkout.is_dirty().unwrap());
        assert!(checkout.untracked_files().unwrap().is_empty());

        std::fs::write(dir.join("notes.txt"), "scratch").unwrap();
        assert!(!checkout.is_dirty().unwrap());
        assert_eq!(checkout.untracked_files().unwrap(), vec!["notes.txt"]);

        std::fs::write(dir.join("README"), "changed").unwrap();
        assert!(checkout.is_dirty().unwrap());
    }

    #[test]
    fn describe_head_prefers_tags_over_branches() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);
        commit(dir, "README", "Initial commit");

        let checkout = Checkout::open(dir).unwrap();
        let before = checkout.describe_head().unwrap();
        assert!(before.starts_with("heads/"), "got {before}");

        annotated_tag(dir, "v1.0.0");
        assert_eq!(checkout.describe_head().as_deref(), Some("tags/v1.0.0"));
    }

    #[test]
    fn resolve_tag_distinguishes_annotated_and_lightweight() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);
        let sha = commit(dir, "README", "Initial commit");
        annotated_tag(dir, "v1.0.0");
        git(dir, &["tag", "light"]);

        let checkout = Checkout::open(dir).unwrap();
        let annotated = checkout.resolve_tag("v1.0.0").unwrap();
        assert_eq!(annotated.commit, sha);
        assert!(annotated.is_annotated());
        assert_eq!(annotated.message(), Some("Release v1.0.0"));
        match &annotated.kind {
            TagKind::Annotated { object, date, .. } => {
                assert_ne!(object, &sha);
                assert!(date.is_some());
            }
            TagKind::Lightweight => panic!("expected annotated tag"),
        }

        let light = checkout.resolve_tag("light").unwrap();
        assert_eq!(light.commit, sha);
        assert_eq!(light.kind, TagKind::Lightweight);

        assert!(checkout.resolve_tag("missing").is_err());
    }

    #[test]
    fn failed_git_call_reports_the_command() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);
        commit(dir, "README", "Initial commit");

        let checkout = Checkout::open(dir).unwrap();
        let err = checkout.commits("no-such-ref..HEAD").unwrap_err();
        match err {
            TagcutError::Git(msg) => {
                assert!(msg.contains("log"), "got {msg}");
                assert!(msg.contains("no-such-ref..HEAD"), "got {msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nearest_tag_before_skips_lightweight_tags() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);
        commit(dir, "README", "Initial commit");
        annotated_tag(dir, "v1.0.0");
        commit(dir, "README", "Scratch");
        git(dir, &["tag", "wip"]);
        let head = commit(dir, "README", "Next");

        let checkout = Checkout::open(dir).unwrap();
        assert_eq!(checkout.nearest_tag_before(&head).as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn nearest_tag_before_is_none_without_history() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);
        let first = commit(dir, "README", "Initial commit");
        annotated_tag(dir, "v1.0.0");

        let checkout = Checkout::open(dir).unwrap();
        assert_eq!(checkout.nearest_tag_before(&first), None);

        let second = commit(dir, "README", "Second");
        assert_eq!(
            checkout.nearest_tag_before(&second).as_deref(),
            Some("v1.0.0")
        );
    }

    #[test]
    fn empty_tree_matches_well_known_identifier() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        init_repo(dir);

        let checkout = Checkout::open(dir).unwrap();
        assert_eq!(
            checkout.empty_tree().unwrap(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }
}
