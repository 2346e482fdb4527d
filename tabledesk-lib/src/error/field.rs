//! FieldError for row accessors and field parsing

/// Error type for reading or parsing a single column value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The requested column does not exist in the row.
    #[error("Column '{field}' is not in the row")]
    Missing { field: String },

    /// The column exists but has a different type than requested.
    #[error("Column '{field}' holds {actual}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A raw input value could not be turned into the column's type.
    #[error("{reason}")]
    Invalid { field: String, reason: String },
}

impl FieldError {
    /// Column absent from the row.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// Column present with the wrong type.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates a new invalid input error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the column the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::TypeMismatch { field, .. } | Self::Invalid { field, .. } => {
                field
            }
        }
    }
}
