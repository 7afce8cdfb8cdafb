//! Collect the commits that went into a release.

use crate::errors::Result;
use crate::git::Checkout;
use crate::types::{Changelog, CommitEntry, ReleasePoint};
use std::cell::OnceCell;
use tracing::{debug, info};

/// Walks history between the previous tag and a release point.
///
/// When there is no earlier tag, the empty tree stands in as the lower bound
/// so the range covers all history. Its identifier is computed on first use
/// and kept for the lifetime of the builder.
pub struct ChangelogBuilder<'a> {
    checkout: &'a Checkout,
    empty_tree: OnceCell<String>,
}

impl<'a> ChangelogBuilder<'a> {
    pub fn new(checkout: &'a Checkout) -> Self {
        Self {
            checkout,
            empty_tree: OnceCell::new(),
        }
    }

    /// Use a known empty-tree identifier instead of asking git for it.
    pub fn with_empty_tree(checkout: &'a Checkout, empty_tree: impl Into<String>) -> Self {
        Self {
            checkout,
            empty_tree: OnceCell::from(empty_tree.into()),
        }
    }

    fn empty_tree(&self) -> Result<&str> {
        if let Some(id) = self.empty_tree.get() {
            return Ok(id.as_str());
        }
        let id = self.checkout.empty_tree()?;
        Ok(self.empty_tree.get_or_init(|| id).as_str())
    }

    /// Lower bound of the changelog range for `current`.
    pub fn previous_bound(&self, current: &ReleasePoint) -> Result<String> {
        match self.checkout.nearest_tag_before(&current.commit) {
            Some(tag) => {
                let previous = self.checkout.resolve_tag(&tag)?;
                debug!(previous = %previous.tag, commit = %previous.commit, "found previous release");
                Ok(previous.commit)
            }
            None => {
                debug!(tag = %current.tag, "no earlier tag, using the empty tree");
                Ok(self.empty_tree()?.to_string())
            }
        }
    }

    /// Non-merge commits in `(previous, current]`, newest first.
    pub fn build(&self, current: &ReleasePoint) -> Result<Changelog> {
        let previous = self.previous_bound(current)?;
        if previous == current.commit {
            return Ok(Vec::new());
        }

        let range = format!("{}..{}", previous, current.commit);
        let changelog: Changelog = self
            .checkout
            .commits(&range)?
            .into_iter()
            .filter(|commit| commit.parent_count <= 1)
            .map(|commit| CommitEntry::new(commit.short_sha.as_str(), commit.summary()))
            .collect();

        info!(tag = %current.tag, entries = changelog.len(), "changelog generated");
        Ok(changelog)
    }
}

/// Changelog for `current` with a fresh builder.
pub fn generate_changelog(checkout: &Checkout, current: &ReleasePoint) -> Result<Changelog> {
    ChangelogBuilder::new(checkout).build(current)
}
