//! Field descriptors and the ordered table schema.

use std::collections::HashSet;

use crate::display;
use crate::error::ConfigError;
use crate::error::FieldError;
use crate::model::Value;

/// How a column is shown and how raw input turns back into a stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. Input is stored as-is.
    Text,
    /// Whole number. Empty input stores null.
    Integer,
    /// Floating point number. Empty input stores null.
    Decimal,
    /// Yes/No flag.
    Boolean,
    /// Calendar day; shown as the stored day.
    Date,
    /// Embedded relation, shown by one of its columns. Never editable.
    Lookup {
        /// Column of the related row to show.
        display: String,
    },
}

/// Describes one column of a table.
///
/// # Example
///
/// ```
/// use tabledesk_lib::model::Value;
/// use tabledesk_lib::schema::Field;
///
/// let hours = Field::integer("hours", "Hours").editable();
/// assert!(hours.is_editable());
/// assert_eq!(hours.parse("5").unwrap(), Value::Int(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    key: String,
    header: String,
    editable: bool,
    kind: FieldKind,
}

impl Field {
    /// Creates a read-only field of the given kind.
    pub fn new(key: impl Into<String>, header: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            editable: false,
            kind,
        }
    }

    /// Creates a text field.
    pub fn text(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, FieldKind::Text)
    }

    /// Creates an integer field.
    pub fn integer(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, FieldKind::Integer)
    }

    /// Creates a decimal field.
    pub fn decimal(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, FieldKind::Decimal)
    }

    /// Creates a Yes/No field.
    pub fn boolean(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, FieldKind::Boolean)
    }

    /// Creates a date field.
    pub fn date(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, FieldKind::Date)
    }

    /// Creates a lookup field shown by the related row's `display` column.
    pub fn lookup(
        key: impl Into<String>,
        header: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self::new(
            key,
            header,
            FieldKind::Lookup {
                display: display.into(),
            },
        )
    }

    /// Marks the field editable.
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Column key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Column header.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether the field takes part in edits.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Render/parse hint.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Text shown in a table cell.
    pub fn render(&self, value: Option<&Value>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match &self.kind {
            FieldKind::Boolean => match value {
                Value::Bool(true) => "Yes".to_string(),
                Value::Bool(false) => "No".to_string(),
                other => other.to_text(),
            },
            FieldKind::Date => match display::date_value(value) {
                Some(stored) => display::format_date(stored),
                None => value.to_text(),
            },
            FieldKind::Lookup { display } => lookup_text(value, display),
            FieldKind::Text | FieldKind::Integer | FieldKind::Decimal => value.to_text(),
        }
    }

    /// Text a form control starts with when the row enters edit mode.
    pub fn input_text(&self, value: Option<&Value>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match &self.kind {
            FieldKind::Date => match display::date_value(value) {
                Some(stored) => display::format_day(stored),
                None => value.to_text(),
            },
            FieldKind::Lookup { display } => lookup_text(value, display),
            _ => value.to_text(),
        }
    }

    /// Turns raw control text back into the column's stored type.
    pub fn parse(&self, raw: &str) -> Result<Value, FieldError> {
        let trimmed = raw.trim();
        match &self.kind {
            FieldKind::Text => Ok(Value::String(raw.to_string())),
            FieldKind::Integer => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                trimmed
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| FieldError::invalid(&self.key, "expected a whole number"))
            }
            FieldKind::Decimal => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Value::Float(n)),
                    _ => Err(FieldError::invalid(&self.key, "expected a number")),
                }
            }
            FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "0" | "off" => Ok(Value::Bool(false)),
                "" => Ok(Value::Null),
                _ => Err(FieldError::invalid(&self.key, "expected yes or no")),
            },
            FieldKind::Date => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                match display::parse_stored_date(trimmed) {
                    Some(_) => Ok(Value::String(trimmed.to_string())),
                    None => Err(FieldError::invalid(&self.key, "expected a date (YYYY-MM-DD)")),
                }
            }
            FieldKind::Lookup { .. } => Err(FieldError::invalid(&self.key, "column is read-only")),
        }
    }
}

fn lookup_text(value: &Value, display: &str) -> String {
    match value {
        Value::Record(related) => related.get(display).map(Value::to_text).unwrap_or_default(),
        other => other.to_text(),
    }
}

/// The ordered columns of a table. Order is column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Validates and wraps a field list.
    ///
    /// Rejects an empty list, duplicate keys and editable lookups.
    pub fn new(fields: Vec<Field>) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(ConfigError::DuplicateField(field.key.clone()));
            }
            if field.editable && matches!(field.kind, FieldKind::Lookup { .. }) {
                return Err(ConfigError::EditableLookup(field.key.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// All fields in column order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields that take part in edits, in column order.
    pub fn editable(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.editable)
    }

    /// Looks up a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Column headers in order.
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.header.clone()).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_render_boolean() {
        let field = Field::boolean("virtual", "Virtual");
        assert_eq!(field.render(Some(&Value::Bool(true))), "Yes");
        assert_eq!(field.render(Some(&Value::Bool(false))), "No");
        assert_eq!(field.render(None), "");
    }

    #[test]
    fn test_render_lookup() {
        let mut related = BTreeMap::new();
        related.insert("name".to_string(), Value::from("Pantry"));
        let field = Field::lookup("type", "Type", "name");
        assert_eq!(field.render(Some(&Value::Record(related))), "Pantry");
        assert_eq!(field.render(Some(&Value::Null)), "");
    }

    #[test]
    fn test_render_date_keeps_stored_day() {
        let field = Field::date("date", "Date");
        let value = Value::from("2024-01-15T00:00:00Z");
        assert_eq!(field.render(Some(&value)), "Mon, 1/15/2024");
        assert_eq!(field.input_text(Some(&value)), "2024-01-15");
    }

    #[test]
    fn test_parse_integer() {
        let field = Field::integer("hours", "Hours");
        assert_eq!(field.parse(" 5 ").unwrap(), Value::Int(5));
        assert_eq!(field.parse("").unwrap(), Value::Null);
        assert!(matches!(
            field.parse("five"),
            Err(FieldError::Invalid { .. })
        ));
    }

    #[test]
    fn test_parse_decimal_and_boolean() {
        assert_eq!(
            Field::decimal("foodPounds", "Pounds").parse("12.5").unwrap(),
            Value::Float(12.5)
        );
        assert!(Field::decimal("foodPounds", "Pounds").parse("NaN").is_err());
        assert_eq!(
            Field::boolean("virtual", "Virtual").parse("Yes").unwrap(),
            Value::Bool(true)
        );
        assert!(Field::boolean("virtual", "Virtual").parse("maybe").is_err());
        assert_eq!(Field::boolean("virtual", "Virtual").parse(" ").unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_date() {
        let field = Field::date("date", "Date");
        assert_eq!(field.parse("2024-02-29").unwrap(), Value::from("2024-02-29"));
        assert!(field.parse("2024-02-30").is_err());
    }

    #[test]
    fn test_schema_validation() {
        assert_eq!(Schema::new(vec![]), Err(ConfigError::EmptySchema));
        assert_eq!(
            Schema::new(vec![Field::text("name", "Name"), Field::text("name", "Other")]),
            Err(ConfigError::DuplicateField("name".to_string()))
        );
        assert_eq!(
            Schema::new(vec![Field::lookup("type", "Type", "name").editable()]),
            Err(ConfigError::EditableLookup("type".to_string()))
        );
    }

    #[test]
    fn test_schema_order() {
        let schema = Schema::new(vec![
            Field::text("name", "Name").editable(),
            Field::lookup("type", "Type", "name"),
            Field::integer("hours", "Hours").editable(),
        ])
        .unwrap();
        assert_eq!(schema.headers(), vec!["Name", "Type", "Hours"]);
        let editable: Vec<&str> = schema.editable().map(Field::key).collect();
        assert_eq!(editable, vec!["name", "hours"]);
        assert_eq!(schema.len(), 3);
        assert!(!schema.is_empty());
    }
}
