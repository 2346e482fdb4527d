//! tabledesk command-line interface
//!
//! Lists, edits, deletes and exports rows of the community events table.
//!
//! # Usage
//!
//! ```bash
//! export TABLEDESK_URL=https://project.example.co
//! export TABLEDESK_API_KEY=anon-key
//!
//! tabledesk events list
//! tabledesk events edit 12 hours=5 "location=Main Hall"
//! tabledesk events delete 12
//! tabledesk events export --dir ./exports
//! ```

use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use simplelog::Config;
use simplelog::WriteLogger;

mod cli;
mod confirm;
mod error;
mod events;
mod output;

use cli::Cli;
use cli::Command;
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env is fine; flags and the environment still apply
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let log_file = File::create(&cli.log_file).map_err(|source| CliError::LogFile {
        path: cli.log_file.clone(),
        source,
    })?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)?;
    log::info!("tabledesk {} starting", env!("CARGO_PKG_VERSION"));

    let context = events::Context::from_cli(&cli)?;
    match cli.command {
        Command::Events(command) => events::run(&context, command).await,
    }
}
