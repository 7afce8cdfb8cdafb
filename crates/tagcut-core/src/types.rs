use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};

/// How a tag is stored in the object database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    /// The tag is an object of its own, pointing at the commit.
    Annotated {
        /// Identifier of the tag object itself
        object: String,
        /// Subject line of the tag message
        message: String,
        /// Tagger date, when git reports one
        date: Option<DateTime<FixedOffset>>,
    },
    /// The tag is a bare ref to the commit.
    Lightweight,
}

/// A resolved tag: its name, the commit it designates, and how it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePoint {
    pub tag: String,
    pub commit: String,
    pub kind: TagKind,
}

impl ReleasePoint {
    pub fn is_annotated(&self) -> bool {
        matches!(self.kind, TagKind::Annotated { .. })
    }

    /// Tag message subject for annotated tags.
    pub fn message(&self) -> Option<&str> {
        match &self.kind {
            TagKind::Annotated { message, .. } => Some(message.as_str()),
            TagKind::Lightweight => None,
        }
    }
}

/// One non-merge commit that goes into the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    pub short_sha: String,
    pub summary: String,
}

impl CommitEntry {
    pub fn new(short_sha: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            short_sha: short_sha.into(),
            summary: summary.into(),
        }
    }
}

/// Commits since the previous release, newest first.
pub type Changelog = Vec<CommitEntry>;

/// Absolute paths of the distribution files produced by the packaging step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
}

impl ArtifactSet {
    /// Builds a set from the given paths, sorted and without duplicates.
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        paths.dedup();
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

/// Per-run settings, usually coming straight from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Checkout to operate on
    pub directory: PathBuf,
    /// Skip the dirty and untracked checks
    pub force: bool,
    /// Print upload actions instead of performing them
    pub dry_run: bool,
    /// Account owning the repository on the release host
    pub organization: String,
    /// Project name, used for links and upload targets
    pub repository: String,
}

impl ReleaseOptions {
    /// `organization/repository`, as used by the release host API.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.organization, self.repository)
    }
}
