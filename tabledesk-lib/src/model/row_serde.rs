//! Serialization for Row.
//!
//! On the wire a row is a flat JSON object whose `id` column sits next to the
//! other columns. Reading a row is where payloads are checked: anything that
//! is not an object, or an object without a usable `id`, is rejected here
//! rather than trusted further in.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::ID_COLUMN;
use super::Row;
use super::RowId;
use super::Value;

// =============================================================================
// Serialization
// =============================================================================

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_COLUMN, &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Deserialization
// =============================================================================

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RowVisitor)
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a row object with an id column")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Row, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut id: Option<RowId> = None;
        let mut fields: BTreeMap<String, Value> = BTreeMap::new();

        while let Some(key) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;

            if key == ID_COLUMN {
                let parsed = RowId::from_value(&value).ok_or_else(|| {
                    M::Error::custom(format!("unusable row id of type {}", value.type_name()))
                })?;
                id = Some(parsed);
            } else {
                fields.insert(key, value);
            }
        }

        let id = id.ok_or_else(|| M::Error::missing_field(ID_COLUMN))?;
        Ok(Row { id, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_all_columns() {
        let json = r#"{"id": 1, "name": "Drive", "hours": 3, "secret": "kept"}"#;
        let row: Row = serde_json::from_str(json).unwrap();

        assert_eq!(row.id(), &RowId::Int(1));
        assert_eq!(row.get_string("name").unwrap(), Some("Drive"));
        assert_eq!(row.get_int("hours").unwrap(), Some(3));
        assert_eq!(row.get_string("secret").unwrap(), Some("kept"));
        assert!(!row.contains("id"));
    }

    #[test]
    fn test_deserialize_uuid_id() {
        let json = r#"{"id": "12345678-1234-1234-1234-123456789012"}"#;
        let row: Row = serde_json::from_str(json).unwrap();
        assert!(matches!(row.id(), RowId::Uuid(_)));
    }

    #[test]
    fn test_deserialize_rejects_missing_id() {
        let result = serde_json::from_str::<Row>(r#"{"name": "Drive"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_null_id() {
        let result = serde_json::from_str::<Row>(r#"{"id": null, "name": "Drive"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_non_object() {
        assert!(serde_json::from_str::<Row>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Vec<Row>>(r#"[{"id": 1}, 7]"#).is_err());
    }

    #[test]
    fn test_serialize_puts_id_first() {
        let row = Row::new(7).set("name", "Drive");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"Drive"}"#);
    }
}
