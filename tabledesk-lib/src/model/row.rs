//! Rows and row ids

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Value;
use crate::error::FieldError;

/// Column that holds the store-assigned row id.
pub const ID_COLUMN: &str = "id";

/// The store-assigned identifier of a row.
///
/// Stores hand out either integer keys or UUIDs; anything else is kept as
/// text so it can still be echoed back in filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    /// Integer primary key.
    Int(i64),
    /// UUID primary key.
    Uuid(Uuid),
    /// Any other textual key.
    Text(String),
}

impl RowId {
    /// Converts a column value into an id, if it can be one.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(RowId::Int(*n)),
            Value::String(s) if !s.is_empty() => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{}", n),
            RowId::Uuid(u) => write!(f, "{}", u),
            RowId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for RowId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(RowId::Int(n));
        }
        if let Ok(u) = Uuid::parse_str(s) {
            return Ok(RowId::Uuid(u));
        }
        Ok(RowId::Text(s.to_string()))
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        RowId::Int(v)
    }
}

impl From<Uuid> for RowId {
    fn from(v: Uuid) -> Self {
        RowId::Uuid(v)
    }
}

/// A row fetched from the store.
///
/// The id is mandatory and lives outside the field map. Every other column
/// the store returned is kept, including columns no schema field mentions,
/// so merging a patch never drops data.
///
/// # Example
///
/// ```
/// use tabledesk_lib::model::Row;
///
/// let row = Row::new(1)
///     .set("name", "Drive")
///     .set("hours", 3i64);
///
/// assert_eq!(row.get_string("name").unwrap(), Some("Drive"));
/// assert_eq!(row.get_int("hours").unwrap(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub(crate) id: RowId,
    pub(crate) fields: BTreeMap<String, Value>,
}

impl Row {
    /// Creates a new empty row with the given id.
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Returns the row id.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the column value, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the row contains the given column.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns all non-id columns.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Sets a column value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts a column value.
    ///
    /// The id column is immutable; writes to it are ignored.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        if field == ID_COLUMN {
            log::warn!("ignoring write to id column of row {}", self.id);
            return;
        }
        self.fields.insert(field, value.into());
    }

    /// Overwrites columns with the ones in `patch`; other columns are kept.
    pub fn merge(&mut self, patch: &Patch) {
        for (key, value) in patch.iter() {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Overwrites columns with every column of `other`; the id is kept.
    pub fn merge_row(&mut self, other: Row) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if column is missing or wrong type.
    // Return Ok(None) only if the column exists and is Value::Null.
    // =========================================================================

    /// Gets a string column value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(
                field,
                "string",
                other.type_name(),
            )),
        }
    }

    /// Gets an integer column value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }
}

/// The columns sent in an `update` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Patch(BTreeMap<String, Value>);

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts a column.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the value for a column.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Iterates over the columns in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of columns in the patch.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the patch has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
