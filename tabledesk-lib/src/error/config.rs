//! Configuration error types

/// Errors raised while building a table configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Table names must be plain identifiers.
    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    /// A table needs at least one column.
    #[error("Schema has no fields")]
    EmptySchema,

    /// Two fields share a key.
    #[error("Duplicate field key: {0}")]
    DuplicateField(String),

    /// Lookup columns are display-only.
    #[error("Lookup field '{0}' cannot be editable")]
    EditableLookup(String),
}
