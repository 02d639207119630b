//! Fundbook command-line front end.
//!
//! Main entry point for managing a member fund from the terminal.

mod app;
mod cli;

use std::io;

use clap::Parser;
use fundbook_core::ledger::LedgerError;
use fundbook_shared::AppConfig;
use tracing::warn;

use crate::app::App;
use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fundbook=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    let app = App::open(&config)?;
    let mut stdout = io::stdout().lock();
    if let Err(err) = app.run(cli.command, &mut stdout) {
        if let Some(ledger) = err.downcast_ref::<LedgerError>()
            && ledger.is_rejection()
        {
            warn!(code = ledger.error_code(), "Ledger operation rejected");
        }
        return Err(err);
    }
    Ok(())
}
