use std::io;
use std::path::Path;

/// Canonical result type for tagcut code
pub type Result<T> = std::result::Result<T, TagcutError>;

/// Common error type for tagcut operations
#[derive(Debug, thiserror::Error)]
pub enum TagcutError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Build error: {0}")]
    Build(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{name} is not set. {hint}")]
    MissingCredential { name: &'static str, hint: &'static str },
}

/// Reasons a checkout cannot be released.
///
/// These are expected outcomes of validation rather than failures of the tool,
/// so they live apart from [`TagcutError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotReady {
    #[error("Repository is dirty")]
    Dirty,

    #[error("Repository has untracked files:\n\t{}", .0.join("\n\t"))]
    Untracked(Vec<String>),

    #[error("No tag found at HEAD ({0})")]
    NoTag(String),

    #[error("Tag {0} is not a valid release tag (expected v<major>[.<minor>[.<patch>]])")]
    InvalidTag(String),

    #[error("Unable to inspect repository: {0}")]
    Unreadable(String),
}

/// Helper to create an IO error with file path context
pub fn io_error_with_path<P: AsRef<Path>>(error: io::Error, path: P) -> io::Error {
    io::Error::new(
        error.kind(),
        format!("{}: {}", path.as_ref().display(), error),
    )
}
