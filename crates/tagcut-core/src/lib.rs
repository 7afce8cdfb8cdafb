pub mod adapters;
pub mod changelog;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod format;
pub mod git;
pub mod process;
pub mod publish;
pub mod types;
pub mod validate;

/// Sent with every request to the GitHub API.
pub const USER_AGENT: &str = concat!("tagcut/", env!("CARGO_PKG_VERSION"));

// Re-export commonly used items
pub use adapters::{GitHubReleases, PackageIndex, Packager, ReleaseHost, SetupTools, Twine};
pub use changelog::{ChangelogBuilder, generate_changelog};
pub use config::Config;
pub use credentials::Credentials;
pub use errors::{NotReady, Result, TagcutError};
pub use format::{format_index_changelog, format_index_changelog_for_host, format_release_changelog};
pub use git::Checkout;
pub use publish::{NOT_READY, PACKAGE_INDEX_FAILED, RELEASE_HOST_FAILED, publish, run_publish};
pub use types::{ArtifactSet, Changelog, CommitEntry, ReleaseOptions, ReleasePoint, TagKind};
pub use validate::{check_release_point, is_release_tag, ready_for_release};
