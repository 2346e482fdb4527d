//! In-process gateway backed by DashMap

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use super::Gateway;
use super::GatewayOp;
use super::TableName;
use crate::error::GatewayError;
use crate::model::Patch;
use crate::model::Row;
use crate::model::RowId;

/// A gateway that keeps its tables in memory.
///
/// Useful offline and in tests: failures can be injected per table and
/// operation, a fixed latency can be added to every call, and the number of
/// calls per operation is counted.
///
/// # Example
///
/// ```
/// use tabledesk_lib::gateway::{GatewayOp, MemoryGateway, TableName};
/// use tabledesk_lib::model::Row;
///
/// let events = TableName::new("communityEvents").unwrap();
/// let gateway = MemoryGateway::new()
///     .with_table(&events, vec![Row::new(1).set("name", "Drive")]);
///
/// gateway.fail(&events, GatewayOp::Delete, "permission denied");
/// assert_eq!(gateway.rows(&events).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: DashMap<String, Vec<Row>>,
    failures: DashMap<(String, GatewayOp), String>,
    calls: DashMap<GatewayOp, usize>,
    latency_ms: AtomicU64,
    skip_update_echo: AtomicBool,
}

impl MemoryGateway {
    /// Creates an empty gateway with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table (builder pattern).
    pub fn with_table(self, table: &TableName, rows: Vec<Row>) -> Self {
        self.insert_table(table, rows);
        self
    }

    /// Creates or replaces a table.
    pub fn insert_table(&self, table: &TableName, rows: Vec<Row>) {
        self.tables.insert(table.as_str().to_string(), rows);
    }

    /// Returns a copy of a table's rows.
    pub fn rows(&self, table: &TableName) -> Option<Vec<Row>> {
        self.tables.get(table.as_str()).map(|rows| rows.clone())
    }

    /// Makes every `op` on `table` fail with `message` until cleared.
    pub fn fail(&self, table: &TableName, op: GatewayOp, message: impl Into<String>) {
        self.failures
            .insert((table.as_str().to_string(), op), message.into());
    }

    /// Stops failing `op` on `table`.
    pub fn clear_failure(&self, table: &TableName, op: GatewayOp) {
        self.failures.remove(&(table.as_str().to_string(), op));
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// When `false`, `update` returns `None` like a store that does not echo rows.
    pub fn set_update_echo(&self, echo: bool) {
        self.skip_update_echo.store(!echo, Ordering::SeqCst);
    }

    /// Number of calls made for `op`, failed ones included.
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.calls.get(&op).map(|n| *n).unwrap_or(0)
    }

    async fn begin(&self, table: &TableName, op: GatewayOp) -> Result<(), GatewayError> {
        *self.calls.entry(op).or_insert(0) += 1;

        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if let Some(message) = self.failures.get(&(table.as_str().to_string(), op)) {
            return Err(GatewayError::Rejected(message.clone()));
        }
        if !self.tables.contains_key(table.as_str()) {
            return Err(GatewayError::UnknownTable(table.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, table: &TableName, projection: &str) -> Result<Vec<Row>, GatewayError> {
        self.begin(table, GatewayOp::Select).await?;

        let rows = self
            .tables
            .get(table.as_str())
            .map(|rows| rows.clone())
            .unwrap_or_default();

        Ok(match projected_columns(projection) {
            None => rows,
            Some(columns) => rows.iter().map(|row| project(row, &columns)).collect(),
        })
    }

    async fn update(
        &self,
        table: &TableName,
        id: &RowId,
        patch: &Patch,
    ) -> Result<Option<Row>, GatewayError> {
        self.begin(table, GatewayOp::Update).await?;

        let updated = {
            let mut rows = self
                .tables
                .get_mut(table.as_str())
                .ok_or_else(|| GatewayError::UnknownTable(table.to_string()))?;
            let row = rows
                .iter_mut()
                .find(|row| row.id() == id)
                .ok_or_else(|| GatewayError::not_found(table.as_str(), id))?;
            row.merge(patch);
            row.clone()
        };

        if self.skip_update_echo.load(Ordering::SeqCst) {
            Ok(None)
        } else {
            Ok(Some(updated))
        }
    }

    async fn delete(&self, table: &TableName, id: &RowId) -> Result<(), GatewayError> {
        self.begin(table, GatewayOp::Delete).await?;

        if let Some(mut rows) = self.tables.get_mut(table.as_str()) {
            rows.retain(|row| row.id() != id);
        }
        Ok(())
    }
}

/// Output column name and source column for each projection item, or `None`
/// when the projection includes `*`.
fn projected_columns(projection: &str) -> Option<Vec<(String, String)>> {
    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in projection.chars().chain(std::iter::once(',')) {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                let item = current.trim();
                if item == "*" {
                    return None;
                }
                if !item.is_empty() {
                    // `alias:column (embedded, columns)`
                    let head = item.split('(').next().unwrap_or(item).trim();
                    let (alias, source) = head.split_once(':').unwrap_or((head, head));
                    columns.push((alias.trim().to_string(), source.trim().to_string()));
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if columns.is_empty() { None } else { Some(columns) }
}

fn project(row: &Row, columns: &[(String, String)]) -> Row {
    let mut projected = Row::new(row.id().clone());
    for (alias, source) in columns {
        if let Some(value) = row.get(source) {
            projected.insert(alias.clone(), value.clone());
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> TableName {
        TableName::new("communityEvents").unwrap()
    }

    fn gateway() -> MemoryGateway {
        MemoryGateway::new().with_table(
            &events(),
            vec![
                Row::new(1).set("name", "Drive").set("hours", 3i64),
                Row::new(2).set("name", "Pantry").set("hours", 2i64),
            ],
        )
    }

    #[test]
    fn test_projected_columns() {
        assert_eq!(projected_columns("*"), None);
        assert_eq!(projected_columns("*, type (name)"), None);
        assert_eq!(
            projected_columns("name, kind:type (name, id)"),
            Some(vec![
                ("name".to_string(), "name".to_string()),
                ("kind".to_string(), "type".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_select_with_projection() {
        let rows = gateway().select(&events(), "name").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("name"));
        assert!(!rows[0].contains("hours"));
    }

    #[tokio::test]
    async fn test_update_echo() {
        let gateway = gateway();
        let patch = Patch::new().set("hours", 5i64);

        let echoed = gateway.update(&events(), &RowId::Int(1), &patch).await.unwrap();
        assert_eq!(echoed.unwrap().get_int("hours").unwrap(), Some(5));

        gateway.set_update_echo(false);
        let silent = gateway.update(&events(), &RowId::Int(1), &patch).await.unwrap();
        assert!(silent.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let result = gateway()
            .update(&events(), &RowId::Int(9), &Patch::new())
            .await;
        assert!(matches!(result, Err(GatewayError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_injected_failure_and_counts() {
        let gateway = gateway();
        gateway.fail(&events(), GatewayOp::Delete, "denied");

        assert!(gateway.delete(&events(), &RowId::Int(1)).await.is_err());
        assert_eq!(gateway.rows(&events()).unwrap().len(), 2);

        gateway.clear_failure(&events(), GatewayOp::Delete);
        gateway.delete(&events(), &RowId::Int(1)).await.unwrap();
        assert_eq!(gateway.rows(&events()).unwrap().len(), 1);
        assert_eq!(gateway.calls(GatewayOp::Delete), 2);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let other = TableName::new("users").unwrap();
        let result = gateway().select(&other, "*").await;
        assert!(matches!(result, Err(GatewayError::UnknownTable(_))));
    }
}
