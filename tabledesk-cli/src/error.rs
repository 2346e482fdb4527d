//! CLI errors

use std::io;
use std::path::PathBuf;

use tabledesk_lib::error::ConfigError;
use tabledesk_lib::error::GatewayError;
use tabledesk_lib::error::TableError;
use tabledesk_lib::error::TransitionError;
use tabledesk_lib::model::RowId;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("failed to initialize logging: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Already shown as a notification.
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("no {data_name} with id {id}")]
    RowNotFound { data_name: String, id: RowId },

    #[error("{0} is not an editable column")]
    NotEditable(String),

    #[error("failed to write export: {0}")]
    Export(#[source] io::Error),
}
