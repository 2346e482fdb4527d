//! Table and row lifecycle errors

use crate::error::GatewayError;
use crate::table::RowState;

/// A failed table operation.
///
/// The `Display` output is the message shown to the user; `cause` holds the
/// detail, which is logged but never shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The initial `select` failed.
    #[error("Failed to fetch {data_name}s")]
    FetchFailed { data_name: String, cause: String },

    /// An `update` failed.
    #[error("Failed to update {data_name}")]
    UpdateFailed { data_name: String, cause: String },

    /// A `delete` failed.
    #[error("Failed to delete {data_name}")]
    DeleteFailed { data_name: String, cause: String },

    /// A draft value did not parse into its column type.
    #[error("Invalid {header}: {reason}")]
    InvalidField { header: String, reason: String },
}

impl TableError {
    pub(crate) fn fetch_failed(data_name: &str, error: &GatewayError) -> Self {
        Self::FetchFailed {
            data_name: data_name.to_string(),
            cause: error.to_string(),
        }
    }

    pub(crate) fn update_failed(data_name: &str, error: &GatewayError) -> Self {
        Self::UpdateFailed {
            data_name: data_name.to_string(),
            cause: error.to_string(),
        }
    }

    pub(crate) fn delete_failed(data_name: &str, error: &GatewayError) -> Self {
        Self::DeleteFailed {
            data_name: data_name.to_string(),
            cause: error.to_string(),
        }
    }

    /// Returns the underlying cause.
    pub fn cause(&self) -> &str {
        match self {
            Self::FetchFailed { cause, .. }
            | Self::UpdateFailed { cause, .. }
            | Self::DeleteFailed { cause, .. } => cause,
            Self::InvalidField { reason, .. } => reason,
        }
    }
}

/// A row action was requested from a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} while row is {state}")]
pub struct TransitionError {
    /// The rejected action.
    pub action: &'static str,
    /// The state the row was in.
    pub state: RowState,
}

impl TransitionError {
    pub(crate) fn new(action: &'static str, state: RowState) -> Self {
        Self { action, state }
    }
}
