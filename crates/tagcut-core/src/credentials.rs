use crate::errors::{Result, TagcutError};

pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const TWINE_USERNAME: &str = "TWINE_USERNAME";
pub const TWINE_PASSWORD: &str = "TWINE_PASSWORD";

const GITHUB_TOKEN_HINT: &str = "Create a personal access token with the `repo` scope at \
     https://github.com/settings/tokens and export it: `export GITHUB_TOKEN=<token>`";

/// Secrets read from the environment before any work starts.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub github_token: String,
    /// Forwarded to twine; it prompts when they are absent.
    pub index_username: Option<String>,
    pub index_password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"***")
            .field("index_username", &self.index_username)
            .field("index_password", &self.index_password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`], reading variables through `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let github_token = read(GITHUB_TOKEN).ok_or(TagcutError::MissingCredential {
            name: GITHUB_TOKEN,
            hint: GITHUB_TOKEN_HINT,
        })?;

        Ok(Self {
            github_token,
            index_username: read(TWINE_USERNAME),
            index_password: read(TWINE_PASSWORD),
        })
    }

    /// Whether twine has everything it needs without prompting.
    pub fn has_index_credentials(&self) -> bool {
        self.index_username.is_some() && self.index_password.is_some()
    }
}
