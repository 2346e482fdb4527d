//! Command-line arguments

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use simplelog::LevelFilter;
use tabledesk_lib::model::RowId;

/// Edit rows of a remote table from the terminal
#[derive(Parser, Debug)]
#[command(name = "tabledesk", version, about)]
pub struct Cli {
    /// Project base URL
    #[arg(long, env = "TABLEDESK_URL")]
    pub url: String,

    /// API key sent with every request
    #[arg(long, env = "TABLEDESK_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Signed-in user's access token (defaults to the API key)
    #[arg(long, env = "TABLEDESK_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log file path
    #[arg(long, value_name = "FILE", default_value = "tabledesk.log")]
    pub log_file: PathBuf,

    /// Log level written to the log file
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Community events
    #[command(subcommand)]
    Events(EventsCommand),
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// Show every event
    List,

    /// Change columns of one event
    Edit(EditArgs),

    /// Delete one event
    Delete(DeleteArgs),

    /// Write every event to a dated CSV file
    Export {
        /// Directory to write into
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Event id
    pub id: RowId,

    /// Changes as column=value, e.g. hours=5
    #[arg(required = true, value_parser = parse_change)]
    pub changes: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Event id
    pub id: RowId,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

fn parse_change(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, got {:?}", s)),
    }
}
