use dialoguer::console::{Style, style};

pub const SUCCESS_PREFIX: &str = "✔";
pub const ERROR_PREFIX: &str = "✘";
pub const HINT_PREFIX: &str = "💡";

pub fn log_success_value(label: &str, value: &str) {
    let line = format!(
        "{} {}: {}",
        style(SUCCESS_PREFIX).green(),
        label,
        Style::new().bold().apply_to(value),
    );
    println!("{line}");
}

pub fn log_error(message: &str) {
    let prefix = style(ERROR_PREFIX).for_stderr().red();
    let message_style = Style::new().for_stderr().red();
    eprintln!("{} {}", prefix, message_style.apply_to(message));
}

/// Prints a hint message to stderr with a distinct visual style.
pub fn log_hint(message: &str) {
    let prefix = style(HINT_PREFIX).for_stderr().yellow();
    let message_style = Style::new().for_stderr().yellow();
    eprintln!("{} {}", prefix, message_style.apply_to(message));
}
