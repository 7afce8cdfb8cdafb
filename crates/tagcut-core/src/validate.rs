use crate::errors::NotReady;
use crate::git::Checkout;
use crate::types::{ReleaseOptions, ReleasePoint};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static RELEASE_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*)){0,2}$").expect("release tag pattern is valid")
});

/// Whether `tag` looks like `v<major>[.<minor>[.<patch>]]` without leading zeros.
pub fn is_release_tag(tag: &str) -> bool {
    RELEASE_TAG_PATTERN.is_match(tag)
}

/// Check that the checkout is a clean, correctly tagged release point.
///
/// Checks run in order and stop at the first failure:
/// 1. no modified tracked files (skipped with `force`)
/// 2. no untracked files (skipped with `force`)
/// 3. HEAD is exactly at a tag
/// 4. the tag follows the `v<major>[.<minor>[.<patch>]]` convention
pub fn check_release_point(checkout: &Checkout, force: bool) -> Result<ReleasePoint, NotReady> {
    if force {
        debug!("skipping working tree checks (forced)");
    } else {
        if checkout
            .is_dirty()
            .map_err(|e| NotReady::Unreadable(e.to_string()))?
        {
            return Err(NotReady::Dirty);
        }

        let untracked = checkout
            .untracked_files()
            .map_err(|e| NotReady::Unreadable(e.to_string()))?;
        if !untracked.is_empty() {
            return Err(NotReady::Untracked(untracked));
        }
    }

    let description = checkout.describe_head().unwrap_or_default();
    let tag = match description.strip_prefix("tags/") {
        Some(tag) if !tag.is_empty() => tag,
        _ => {
            let at = if description.is_empty() {
                "detached commit".to_string()
            } else {
                description.clone()
            };
            return Err(NotReady::NoTag(at));
        }
    };

    if !is_release_tag(tag) {
        return Err(NotReady::InvalidTag(tag.to_string()));
    }

    checkout
        .resolve_tag(tag)
        .map_err(|e| NotReady::Unreadable(e.to_string()))
}

/// Report whether the checkout can be released, printing the reason when not.
pub fn ready_for_release(checkout: &Checkout, options: &ReleaseOptions) -> bool {
    match check_release_point(checkout, options.force) {
        Ok(point) => {
            debug!(tag = %point.tag, commit = %point.commit, "release point accepted");
            true
        }
        Err(reason) => {
            eprintln!("{reason}");
            false
        }
    }
}
