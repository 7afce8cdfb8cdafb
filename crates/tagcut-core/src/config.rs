use crate::errors::{TagcutError, io_error_with_path};
use crate::format::DEFAULT_HOST;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for tagcut, read from `.tagcut/config.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host used in changelog links
    pub github_host: String,
    /// Base URL of the GitHub REST API
    pub github_api_url: String,
    /// Packaging command, run from the checkout root
    pub build_command: Vec<String>,
    /// Where the packaging command leaves its artifacts, relative to the root
    pub dist_dir: PathBuf,
    /// Upload command; artifact paths are appended
    pub index_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_host: DEFAULT_HOST.to_string(),
            github_api_url: DEFAULT_API_URL.to_string(),
            build_command: [
                "python",
                "setup.py",
                "egg_info",
                "--tag-build=",
                "sdist",
                "bdist_wheel",
                "--universal",
            ]
            .map(String::from)
            .to_vec(),
            dist_dir: PathBuf::from("dist"),
            index_command: ["twine", "upload"].map(String::from).to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from .tagcut/config.toml
    pub fn load(root: &Path) -> Result<Self, TagcutError> {
        let path = root.join(".tagcut").join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| io_error_with_path(e, &path))?;
        Self::parse(&text)
    }

    /// Parse configuration text, falling back to defaults for missing keys.
    pub fn parse(text: &str) -> Result<Self, TagcutError> {
        let value: toml::Value = text
            .parse()
            .map_err(|e| TagcutError::Config(format!("invalid config.toml: {e}")))?;
        let defaults = Self::default();

        let github_host = table_str(&value, "github", "host")
            .unwrap_or(defaults.github_host);

        let github_api_url = table_str(&value, "github", "api_url")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.github_api_url);

        let build_command = table_argv(&value, "build", "command")?
            .unwrap_or(defaults.build_command);

        let dist_dir = table_str(&value, "build", "dist_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.dist_dir);

        let index_command = table_argv(&value, "index", "command")?
            .unwrap_or(defaults.index_command);

        Ok(Self {
            github_host,
            github_api_url,
            build_command,
            dist_dir,
            index_command,
        })
    }
}

fn table_str(value: &toml::Value, table: &str, key: &str) -> Option<String> {
    value
        .get(table)
        .and_then(|v| v.as_table())
        .and_then(|t| t.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn table_argv(value: &toml::Value, table: &str, key: &str) -> Result<Option<Vec<String>>, TagcutError> {
    let Some(raw) = value
        .get(table)
        .and_then(|v| v.as_table())
        .and_then(|t| t.get(key))
    else {
        return Ok(None);
    };

    let items = raw.as_array().ok_or_else(|| {
        TagcutError::Config(format!(
            "{table}.{key} must be an array of strings, e.g. [\"twine\", \"upload\"]"
        ))
    })?;

    let argv = items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                TagcutError::Config(format!("{table}.{key} contains a non-string value: {item}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if argv.is_empty() {
        return Err(TagcutError::Config(format!("{table}.{key} must not be empty")));
    }

    Ok(Some(argv))
}
