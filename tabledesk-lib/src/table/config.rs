//! Host-supplied table configuration

use crate::gateway::DEFAULT_PROJECTION;
use crate::gateway::TableName;
use crate::model::ID_COLUMN;
use crate::schema::Schema;

/// Everything a host page supplies when it mounts a table.
///
/// Immutable once handed to a [`TableController`](super::TableController).
///
/// # Example
///
/// ```
/// use tabledesk_lib::gateway::TableName;
/// use tabledesk_lib::schema::{Field, Schema};
/// use tabledesk_lib::table::TableConfig;
///
/// let schema = Schema::new(vec![
///     Field::text("name", "Name").editable(),
///     Field::integer("hours", "Hours").editable(),
/// ])
/// .unwrap();
///
/// let config = TableConfig::new(TableName::new("communityEvents").unwrap(), schema, "event")
///     .selection("*, type (name)")
///     .delete_confirm_field("name");
///
/// assert_eq!(config.data_name(), "event");
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    table: TableName,
    schema: Schema,
    selection: String,
    data_name: String,
    delete_confirm_field: String,
}

impl TableConfig {
    /// Creates a configuration selecting `*` and confirming deletes by id.
    ///
    /// `data_name` is the singular, lowercase noun used in messages
    /// (`"event"`, `"event type"`).
    pub fn new(table: TableName, schema: Schema, data_name: impl Into<String>) -> Self {
        Self {
            table,
            schema,
            selection: DEFAULT_PROJECTION.to_string(),
            data_name: data_name.into(),
            delete_confirm_field: ID_COLUMN.to_string(),
        }
    }

    /// Sets the projection passed to `select`.
    pub fn selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = selection.into();
        self
    }

    /// Sets the column shown in the delete confirmation prompt.
    pub fn delete_confirm_field(mut self, field: impl Into<String>) -> Self {
        self.delete_confirm_field = field.into();
        self
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn table_selection(&self) -> &str {
        &self.selection
    }

    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    pub fn confirm_field(&self) -> &str {
        &self.delete_confirm_field
    }
}
