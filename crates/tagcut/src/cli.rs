use clap::Parser;
use std::path::PathBuf;
use tagcut_core::ReleaseOptions;

/// tagcut – publish the tagged release at HEAD to GitHub and PyPI
#[derive(Debug, Parser)]
#[command(name = "tagcut", version, about, long_about = None)]
#[command(after_long_help = "\
Examples:\n  tagcut acme widget --dry-run\n  tagcut -d ../widget acme widget\n\nBehavior:\n  - HEAD must sit exactly on a tag of the form v<major>[.<minor>[.<patch>]].\n  - The working tree must be clean with no untracked files (skip with --force).\n  - Requires GITHUB_TOKEN; TWINE_USERNAME and TWINE_PASSWORD are forwarded to twine.\n\nExit status:\n  0 success, 1 not ready or fatal error, 3 missing GITHUB_TOKEN.\n  Otherwise bit 1 marks a failed GitHub release and bit 2 a failed PyPI upload.")]
pub struct Cli {
    /// GitHub organization (or user) owning the repository
    pub organization: String,

    /// GitHub repository name
    pub repository: String,

    /// Path to the git checkout to release
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub directory: PathBuf,

    /// Skip the clean working tree and untracked files checks
    #[arg(short, long)]
    pub force: bool,

    /// Build everything but only print what would be uploaded
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn into_options(self) -> ReleaseOptions {
        ReleaseOptions {
            directory: self.directory,
            force: self.force,
            dry_run: self.dry_run,
            organization: self.organization,
            repository: self.repository,
        }
    }
}
