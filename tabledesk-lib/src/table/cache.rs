//! Cached rows of one table

use std::sync::Arc;
use std::sync::RwLock;

use crate::model::Row;
use crate::model::RowId;

/// The ordered rows of one table, shared between a controller and its editors.
///
/// `None` until the first successful fetch, then always `Some` (possibly
/// empty). Only the controller mutates it; editors hold clones for reading.
#[derive(Debug, Clone, Default)]
pub struct TableCache {
    rows: Arc<RwLock<Option<Vec<Row>>>>,
}

impl TableCache {
    /// Creates an empty, not-yet-loaded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once rows have been fetched.
    pub fn is_loaded(&self) -> bool {
        self.rows.read().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Returns a copy of the rows, or `None` before the first fetch.
    pub fn snapshot(&self) -> Option<Vec<Row>> {
        self.rows.read().ok().and_then(|g| g.clone())
    }

    /// Returns a copy of one row.
    pub fn get(&self, id: &RowId) -> Option<Row> {
        let guard = self.rows.read().ok()?;
        guard.as_ref()?.iter().find(|row| row.id() == id).cloned()
    }

    /// Returns `true` if a row with `id` is cached.
    pub fn contains(&self, id: &RowId) -> bool {
        self.rows
            .read()
            .map(|g| g.as_ref().is_some_and(|rows| rows.iter().any(|row| row.id() == id)))
            .unwrap_or(false)
    }

    /// Row ids in cache order.
    pub fn ids(&self) -> Vec<RowId> {
        self.rows
            .read()
            .map(|g| {
                g.as_ref()
                    .map(|rows| rows.iter().map(|row| row.id().clone()).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Number of cached rows (zero before the first fetch).
    pub fn len(&self) -> usize {
        self.rows
            .read()
            .map(|g| g.as_ref().map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Returns `true` if no rows are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn replace_all(&self, rows: Vec<Row>) {
        if let Ok(mut guard) = self.rows.write() {
            *guard = Some(rows);
        }
    }

    /// Replaces the row with `id` in place. Returns `false` if absent.
    pub(crate) fn apply_update(&self, id: &RowId, row: Row) -> bool {
        let Ok(mut guard) = self.rows.write() else {
            return false;
        };
        let Some(slot) = guard
            .as_mut()
            .and_then(|rows| rows.iter_mut().find(|r| r.id() == id))
        else {
            return false;
        };
        *slot = row;
        true
    }

    /// Removes the row with `id`. Returns `false` if absent.
    pub(crate) fn apply_removal(&self, id: &RowId) -> bool {
        let Ok(mut guard) = self.rows.write() else {
            return false;
        };
        let Some(rows) = guard.as_mut() else {
            return false;
        };
        let Some(index) = rows.iter().position(|r| r.id() == id) else {
            return false;
        };
        rows.remove(index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> TableCache {
        let cache = TableCache::new();
        cache.replace_all(vec![
            Row::new(1).set("name", "a"),
            Row::new(2).set("name", "b"),
            Row::new(3).set("name", "c"),
        ]);
        cache
    }

    #[test]
    fn test_starts_absent() {
        let cache = TableCache::new();
        assert!(!cache.is_loaded());
        assert_eq!(cache.snapshot(), None);
        assert!(!cache.apply_removal(&RowId::Int(1)));
        assert!(!cache.apply_update(&RowId::Int(1), Row::new(1)));
    }

    #[test]
    fn test_update_keeps_position() {
        let cache = loaded();
        assert!(cache.apply_update(&RowId::Int(2), Row::new(2).set("name", "B")));
        let rows = cache.snapshot().unwrap();
        assert_eq!(rows[1].get_string("name").unwrap(), Some("B"));
        assert_eq!(cache.ids(), vec![RowId::Int(1), RowId::Int(2), RowId::Int(3)]);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let cache = loaded();
        let before = cache.snapshot();
        assert!(!cache.apply_update(&RowId::Int(9), Row::new(9)));
        assert_eq!(cache.snapshot(), before);
    }

    #[test]
    fn test_removal_closes_gap_and_is_idempotent() {
        let cache = loaded();
        assert!(cache.apply_removal(&RowId::Int(2)));
        assert!(!cache.apply_removal(&RowId::Int(2)));
        assert_eq!(cache.ids(), vec![RowId::Int(1), RowId::Int(3)]);
    }
}
