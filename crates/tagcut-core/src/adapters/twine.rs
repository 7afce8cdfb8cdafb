use super::PackageIndex;
use crate::credentials::{Credentials, TWINE_PASSWORD, TWINE_USERNAME};
use crate::errors::{Result, TagcutError};
use crate::process::{command_from_argv, format_command_display, spawn_error};
use crate::types::ArtifactSet;
use std::process::Command;

/// Uploads distributions to PyPI with `twine upload`.
#[derive(Debug, Clone)]
pub struct Twine {
    command: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    dry_run: bool,
}

impl Twine {
    pub fn new(command: Vec<String>, credentials: &Credentials, dry_run: bool) -> Self {
        Self {
            command,
            username: credentials.index_username.clone(),
            password: credentials.index_password.clone(),
            dry_run,
        }
    }

    fn upload_command(&self, artifacts: &ArtifactSet) -> Result<Command> {
        let mut cmd = command_from_argv(&self.command)?;
        cmd.args(artifacts.iter());
        if let Some(username) = &self.username {
            cmd.env(TWINE_USERNAME, username);
        }
        if let Some(password) = &self.password {
            cmd.env(TWINE_PASSWORD, password);
        }
        Ok(cmd)
    }
}

impl PackageIndex for Twine {
    fn upload(&self, artifacts: &ArtifactSet) -> Result<()> {
        let mut cmd = self.upload_command(artifacts)?;

        if self.dry_run {
            println!("Dry run. Would have called: {}", format_command_display(&cmd));
            return Ok(());
        }

        println!("Running: {}", format_command_display(&cmd));
        let status = cmd
            .status()
            .map_err(|e| spawn_error(e, &self.command[0]))?;

        if !status.success() {
            return Err(TagcutError::Upload(format!(
                "Failed to upload artifacts to PyPI ({} exited with {})",
                self.command[0], status
            )));
        }

        Ok(())
    }
}
