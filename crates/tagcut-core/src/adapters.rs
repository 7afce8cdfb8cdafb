//! External collaborators of a release: the packaging tool, the release host
//! and the package index.

pub mod github;
pub mod setuptools;
pub mod twine;

pub use github::GitHubReleases;
pub use setuptools::SetupTools;
pub use twine::Twine;

use crate::errors::Result;
use crate::types::ArtifactSet;
use std::path::Path;

/// Environment variable naming the rendered changelog file during the build.
pub const CHANGELOG_FILE_ENV: &str = "CHANGELOG_FILE";

/// Produces the distribution files for a release.
pub trait Packager {
    /// Build artifacts; `changelog` points at the rendered index changelog.
    fn build(&self, changelog: &Path) -> Result<ArtifactSet>;
}

/// Hosts tagged releases with downloadable assets (GitHub releases).
pub trait ReleaseHost {
    /// Create the release for `tag` with `body` as notes and attach `artifacts`.
    fn publish_release(&self, tag: &str, body: &str, artifacts: &ArtifactSet) -> Result<()>;
}

/// Accepts distribution uploads (PyPI).
pub trait PackageIndex {
    fn upload(&self, artifacts: &ArtifactSet) -> Result<()>;
}
