//! Remote collection gateway.
//!
//! The core only needs three calls against a table: read every row under a
//! projection, patch one row by id, delete one row by id. [`RestGateway`]
//! speaks the PostgREST dialect over HTTP; [`MemoryGateway`] keeps tables in
//! process.

mod memory;
mod rest;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use memory::*;
pub use rest::*;

use crate::error::ConfigError;
use crate::error::GatewayError;
use crate::model::Patch;
use crate::model::Row;
use crate::model::RowId;

/// Projection that selects every column.
pub const DEFAULT_PROJECTION: &str = "*";

/// A validated table name.
///
/// Names must look like identifiers (`communityEvents`, `event_types`), which
/// keeps them safe to place in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    /// Validates a table name.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid_start && valid_rest {
            Ok(Self(name))
        } else {
            Err(ConfigError::InvalidTableName(name))
        }
    }

    /// Returns the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kinds of gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    Select,
    Update,
    Delete,
}

/// Request/response access to the remote tables.
///
/// Implementations carry transport only; they never retry on their own.
#[async_trait]
pub trait Gateway: fmt::Debug + Send + Sync {
    /// Returns every row of `table` under `projection`, in store order.
    async fn select(&self, table: &TableName, projection: &str) -> Result<Vec<Row>, GatewayError>;

    /// Applies `patch` to the row with `id`.
    ///
    /// Returns the stored row when the store echoes it, `None` otherwise.
    async fn update(
        &self,
        table: &TableName,
        id: &RowId,
        patch: &Patch,
    ) -> Result<Option<Row>, GatewayError>;

    /// Deletes the row with `id`.
    async fn delete(&self, table: &TableName, id: &RowId) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn select(&self, table: &TableName, projection: &str) -> Result<Vec<Row>, GatewayError> {
        (**self).select(table, projection).await
    }

    async fn update(
        &self,
        table: &TableName,
        id: &RowId,
        patch: &Patch,
    ) -> Result<Option<Row>, GatewayError> {
        (**self).update(table, id, patch).await
    }

    async fn delete(&self, table: &TableName, id: &RowId) -> Result<(), GatewayError> {
        (**self).delete(table, id).await
    }
}
