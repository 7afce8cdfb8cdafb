use super::{CHANGELOG_FILE_ENV, Packager};
use crate::config::Config;
use crate::errors::{Result, TagcutError};
use crate::process::{command_from_argv, format_command_display, spawn_error};
use crate::types::ArtifactSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs the project's packaging command and collects what lands in `dist/`.
#[derive(Debug, Clone)]
pub struct SetupTools {
    root: PathBuf,
    command: Vec<String>,
    dist_dir: PathBuf,
}

impl SetupTools {
    pub fn new(root: &Path, command: Vec<String>, dist_dir: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            command,
            dist_dir: root.join(dist_dir),
        }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(root, config.build_command.clone(), &config.dist_dir)
    }

    fn collect_artifacts(&self) -> Result<ArtifactSet> {
        let escaped = glob::Pattern::escape(&self.dist_dir.to_string_lossy());
        let pattern = format!("{escaped}/*");
        let paths = glob::glob(&pattern)
            .map_err(|e| TagcutError::Build(format!("invalid artifact pattern {pattern}: {e}")))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable dist entry");
                    None
                }
            })
            .filter(|path| path.is_file())
            .map(|path| {
                if path.is_absolute() {
                    path
                } else {
                    std::path::absolute(&path).unwrap_or(path)
                }
            })
            .collect::<Vec<_>>();

        Ok(ArtifactSet::new(paths))
    }
}

impl Packager for SetupTools {
    fn build(&self, changelog: &Path) -> Result<ArtifactSet> {
        // Stale files from an earlier build must not be uploaded with this one.
        if self.dist_dir.exists() {
            debug!(dir = %self.dist_dir.display(), "removing previous build output");
            fs::remove_dir_all(&self.dist_dir).map_err(|e| {
                TagcutError::Build(format!(
                    "failed to clean {}: {}",
                    self.dist_dir.display(),
                    e
                ))
            })?;
        }

        let mut cmd = command_from_argv(&self.command)?;
        cmd.current_dir(&self.root)
            .env(CHANGELOG_FILE_ENV, changelog);

        println!("Running: {}", format_command_display(&cmd));

        let status = cmd
            .status()
            .map_err(|e| spawn_error(e, &self.command[0]))?;
        if !status.success() {
            return Err(TagcutError::Build(format!(
                "`{}` failed with status {}",
                self.command.join(" "),
                status
            )));
        }

        let artifacts = self.collect_artifacts()?;
        if artifacts.is_empty() {
            return Err(TagcutError::Build(format!(
                "the build produced no files in {}",
                self.dist_dir.display()
            )));
        }

        info!(count = artifacts.len(), "artifacts built");
        Ok(artifacts)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[test]
    fn build_exposes_changelog_and_collects_dist() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        let changelog = root.join("changelog-test.rst");
        fs::write(&changelog, "Changes since last version\n").unwrap();

        let packager = SetupTools::new(
            root,
            sh("mkdir -p dist && cp \"$CHANGELOG_FILE\" dist/widget-1.0.tar.gz && touch dist/widget-1.0-py3-none-any.whl"),
            Path::new("dist"),
        );
        let artifacts = packager.build(&changelog).unwrap();

        let names: Vec<_> = artifacts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["widget-1.0-py3-none-any.whl", "widget-1.0.tar.gz"]);
        assert!(artifacts.iter().all(Path::is_absolute));
        assert_eq!(
            fs::read_to_string(root.join("dist/widget-1.0.tar.gz")).unwrap(),
            "Changes since last version\n"
        );
    }

    #[test]
    fn stale_artifacts_are_removed_before_building() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/old-0.9.tar.gz"), "old").unwrap();

        let packager = SetupTools::new(
            root,
            sh("mkdir -p dist && touch dist/new-1.0.tar.gz"),
            Path::new("dist"),
        );
        let artifacts = packager.build(&root.join("unused.rst")).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts.paths()[0].ends_with("dist/new-1.0.tar.gz"));
    }

    #[test]
    fn failing_command_is_a_build_error() {
        let temp = tempfile::tempdir().unwrap();
        let packager = SetupTools::new(temp.path(), sh("exit 3"), Path::new("dist"));
        let err = packager.build(&temp.path().join("c.rst")).unwrap_err();
        assert!(matches!(err, TagcutError::Build(msg) if msg.contains("failed with status")));
    }

    #[test]
    fn empty_dist_is_a_build_error() {
        let temp = tempfile::tempdir().unwrap();
        let packager = SetupTools::new(temp.path(), sh("mkdir -p dist"), Path::new("dist"));
        let err = packager.build(&temp.path().join("c.rst")).unwrap_err();
        assert!(matches!(err, TagcutError::Build(msg) if msg.contains("no files")));
    }

    #[test]
    fn missing_tool_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let packager = SetupTools::new(
            temp.path(),
            vec!["definitely-not-a-real-packager".into()],
            Path::new("dist"),
        );
        let err = packager.build(&temp.path().join("c.rst")).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-packager not found in PATH"));
    }
}
