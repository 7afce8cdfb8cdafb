use crate::errors::{Result, TagcutError};
use std::process::Command;

/// Creates a `Command` that can resolve `.cmd` and `.bat` scripts on Windows.
///
/// Python tooling (twine, build front-ends) is frequently installed as batch
/// shims on Windows, and `std::process::Command` only auto-resolves `.exe`
/// (see rust-lang/rust#37519). On Windows the program is run through
/// `cmd.exe /C` so PATHEXT resolution applies.
pub fn command(program: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", program]);
        cmd
    } else {
        Command::new(program)
    }
}

/// Builds a command from a configured argv (`["twine", "upload"]`).
pub fn command_from_argv(argv: &[String]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| TagcutError::Config("command must not be empty".into()))?;
    let mut cmd = command(program);
    cmd.args(args);
    Ok(cmd)
}

/// Renders a command the way a user would type it.
pub fn format_command_display(cmd: &Command) -> String {
    let mut text = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        text.push(' ');
        text.push_str(&arg.to_string_lossy());
    }
    text
}

/// Maps a spawn failure to an error naming the missing tool.
pub(crate) fn spawn_error(err: std::io::Error, program: &str) -> TagcutError {
    if err.kind() == std::io::ErrorKind::NotFound {
        TagcutError::Io(std::io::Error::new(
            err.kind(),
            format!("{program} not found in PATH"),
        ))
    } else {
        TagcutError::Io(err)
    }
}
