use crate::adapters::{GitHubReleases, PackageIndex, Packager, ReleaseHost, SetupTools, Twine};
use crate::changelog::generate_changelog;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::errors::Result;
use crate::format::{format_index_changelog_for_host, format_release_changelog};
use crate::git::Checkout;
use crate::types::{ArtifactSet, ReleaseOptions};
use crate::validate::check_release_point;
use std::io::Write;
use tracing::{info, warn};

/// Exit code when the checkout is not a release point.
pub const NOT_READY: u8 = 1;
/// Bit set in the exit code when the release host upload failed.
pub const RELEASE_HOST_FAILED: u8 = 1 << 0;
/// Bit set in the exit code when the package index upload failed.
pub const PACKAGE_INDEX_FAILED: u8 = 1 << 1;

/// Publish the release at `options.directory` to GitHub and PyPI.
///
/// Returns the process exit code: `0` on success, [`NOT_READY`] when the
/// checkout is not a clean release tag, otherwise a combination of
/// [`RELEASE_HOST_FAILED`] and [`PACKAGE_INDEX_FAILED`]. A failed build is
/// returned as an error since nothing can be uploaded.
///
/// # Examples
/// ```no_run
/// use std::path::PathBuf;
/// use tagcut_core::{Credentials, ReleaseOptions, publish};
///
/// let options = ReleaseOptions {
///     directory: PathBuf::from("."),
///     force: false,
///     dry_run: true,
///     organization: "acme".into(),
///     repository: "widget".into(),
/// };
/// let credentials = Credentials::from_env().unwrap();
/// let code = publish(&options, &credentials).unwrap();
/// std::process::exit(i32::from(code));
/// ```
pub fn publish(options: &ReleaseOptions, credentials: &Credentials) -> Result<u8> {
    let checkout = Checkout::open(&options.directory)?;
    let config = Config::load(checkout.root())?;

    let packager = SetupTools::from_config(checkout.root(), &config);
    let release_host = GitHubReleases::new(
        &config.github_api_url,
        &options.slug(),
        &credentials.github_token,
        options.dry_run,
    );
    let index = Twine::new(config.index_command.clone(), credentials, options.dry_run);

    run_publish(
        &checkout,
        options,
        &config.github_host,
        &packager,
        &release_host,
        &index,
    )
}

/// Validate, build the changelog and artifacts, then upload to both destinations.
///
/// Both uploads are attempted regardless of the other's outcome.
pub fn run_publish(
    checkout: &Checkout,
    options: &ReleaseOptions,
    link_host: &str,
    packager: &dyn Packager,
    release_host: &dyn ReleaseHost,
    index: &dyn PackageIndex,
) -> Result<u8> {
    let point = match check_release_point(checkout, options.force) {
        Ok(point) => point,
        Err(reason) => {
            eprintln!("{reason}");
            eprintln!("Repository is not ready for release");
            return Ok(NOT_READY);
        }
    };
    info!(tag = %point.tag, annotated = point.is_annotated(), "releasing");

    let changelog = generate_changelog(checkout, &point)?;
    let index_changelog = format_index_changelog_for_host(
        &changelog,
        link_host,
        &options.organization,
        &options.repository,
    );
    let artifacts = build_artifacts(packager, &index_changelog)?;

    let release_changelog = format_release_changelog(&changelog);
    let mut code = 0;

    if let Err(e) = release_host.publish_release(&point.tag, &release_changelog, &artifacts) {
        warn!(error = %e, "release host upload failed");
        eprintln!("Failed to create GitHub release: {e}");
        code |= RELEASE_HOST_FAILED;
    }

    if let Err(e) = index.upload(&artifacts) {
        warn!(error = %e, "package index upload failed");
        eprintln!("Failed to upload artifacts to PyPI: {e}");
        code |= PACKAGE_INDEX_FAILED;
    }

    Ok(code)
}

/// Run the packager with the rendered changelog in a temporary `changelog*.rst`.
///
/// The file is removed when this returns, whether or not the build succeeded.
fn build_artifacts(packager: &dyn Packager, index_changelog: &str) -> Result<ArtifactSet> {
    let mut file = tempfile::Builder::new()
        .prefix("changelog")
        .suffix(".rst")
        .tempfile()?;
    file.write_all(index_changelog.as_bytes())?;
    file.flush()?;

    packager.build(file.path())
}
