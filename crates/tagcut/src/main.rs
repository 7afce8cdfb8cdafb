mod cli;
mod ui;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tagcut_core::Credentials;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status when `GITHUB_TOKEN` is missing.
const MISSING_TOKEN: u8 = 3;

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            ui::log_error(&e.to_string());
            return ExitCode::from(MISSING_TOKEN);
        }
    };

    let options = cli.into_options();
    let slug = options.slug();
    let dry_run = options.dry_run;
    debug!(?options, ?credentials, "starting release");

    if !dry_run && !credentials.has_index_credentials() {
        ui::log_hint("TWINE_USERNAME/TWINE_PASSWORD not set; twine may prompt for them.");
    }

    match tagcut_core::publish(&options, &credentials) {
        Ok(0) => {
            let label = if dry_run { "Dry run complete" } else { "Published" };
            ui::log_success_value(label, &slug);
            ExitCode::SUCCESS
        }
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            ui::log_error(&format!("Failed to publish release: {e}"));
            ExitCode::from(1)
        }
    }
}

/// Logs go to stderr, filtered by `TAGCUT_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TAGCUT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
