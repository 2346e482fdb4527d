//! Table controller

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use super::ACTION_HEADER;
use super::Action;
use super::RenderedRow;
use super::RenderedTable;
use super::RowCallbacks;
use super::RowEditor;
use super::RowState;
use super::TableBody;
use super::TableCache;
use super::TableConfig;
use crate::error::TableError;
use crate::gateway::Gateway;
use crate::model::Row;
use crate::model::RowId;
use crate::notify::Notifier;

/// Result of [`TableController::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows were fetched and cached.
    Loaded(usize),
    /// The fetch failed; the table keeps showing the loading row.
    Failed(TableError),
    /// `load` already ran on this controller.
    AlreadyLoaded,
}

type EditorMap = Arc<Mutex<HashMap<RowId, RowEditor>>>;

/// Owns the cached rows of one table and the editors for those rows.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tabledesk_lib::gateway::{MemoryGateway, TableName};
/// use tabledesk_lib::model::Row;
/// use tabledesk_lib::notify::Notifier;
/// use tabledesk_lib::schema::{Field, Schema};
/// use tabledesk_lib::table::{TableConfig, TableController};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let table = TableName::new("events")?;
/// let gateway = MemoryGateway::new()
///     .with_table(&table, vec![Row::new(1).set("name", "Drive")]);
/// let schema = Schema::new(vec![Field::text("name", "Name").editable()])?;
///
/// let controller = TableController::new(
///     Arc::new(gateway),
///     TableConfig::new(table, schema, "event"),
///     Notifier::new(),
/// );
/// controller.load().await;
/// println!("{}", controller.render());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TableController {
    config: Arc<TableConfig>,
    gateway: Arc<dyn Gateway>,
    notifier: Notifier,
    rows: TableCache,
    editors: EditorMap,
    load_started: Arc<AtomicBool>,
}

impl TableController {
    /// Creates a controller whose cache is empty until [`load`](Self::load).
    pub fn new(gateway: Arc<dyn Gateway>, config: TableConfig, notifier: Notifier) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            notifier,
            rows: TableCache::new(),
            editors: Arc::new(Mutex::new(HashMap::new())),
            load_started: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Shared read handle on the cached rows.
    pub fn cache(&self) -> &TableCache {
        &self.rows
    }

    pub fn is_loaded(&self) -> bool {
        self.rows.is_loaded()
    }

    /// Copy of the cached rows, or `None` before the first fetch.
    pub fn rows(&self) -> Option<Vec<Row>> {
        self.rows.snapshot()
    }

    /// Fetches every row under the configured projection. Runs once.
    pub async fn load(&self) -> LoadOutcome {
        if self.load_started.swap(true, Ordering::SeqCst) {
            return LoadOutcome::AlreadyLoaded;
        }

        let table = self.config.table();
        log::debug!("fetching {} with selection {:?}", table, self.config.table_selection());
        match self.gateway.select(table, self.config.table_selection()).await {
            Ok(rows) => {
                let count = rows.len();
                log::info!("fetched {} rows from {}", count, table);
                self.rows.replace_all(rows);
                LoadOutcome::Loaded(count)
            }
            Err(cause) => {
                log::error!("fetch of {} failed: {}", table, cause);
                let error = TableError::fetch_failed(self.config.data_name(), &cause);
                self.notifier.error(error.to_string());
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Replaces the cached row with `id`, keeping its position.
    pub fn apply_update(&self, id: &RowId, row: Row) {
        apply_update(&self.rows, id, row);
    }

    /// Removes the cached row with `id` and drops its editor.
    pub fn apply_removal(&self, id: &RowId) {
        apply_removal(&self.rows, &self.editors, id);
    }

    /// The editor for a cached row. Repeated calls return handles to the
    /// same editor.
    pub fn editor(&self, id: &RowId) -> Option<RowEditor> {
        if !self.rows.contains(id) {
            return None;
        }
        let Ok(mut editors) = self.editors.lock() else {
            return None;
        };
        let editor = editors
            .entry(id.clone())
            .or_insert_with(|| self.new_editor(id.clone()));
        Some(editor.clone())
    }

    /// Editors for every cached row, in cache order.
    pub fn editors(&self) -> Vec<RowEditor> {
        self.rows
            .ids()
            .iter()
            .filter_map(|id| self.editor(id))
            .collect()
    }

    /// Builds what the table currently shows.
    pub fn render(&self) -> RenderedTable {
        let schema = self.config.schema();
        let mut headers = schema.headers();
        headers.push(ACTION_HEADER.to_string());

        let Some(rows) = self.rows.snapshot() else {
            return RenderedTable {
                body: TableBody::Loading {
                    span: headers.len(),
                },
                headers,
            };
        };

        let rendered = rows
            .iter()
            .map(|row| {
                let editor = self.editor(row.id());
                let state = editor.as_ref().map(RowEditor::state).unwrap_or_default();
                let draft = match state {
                    RowState::Editing | RowState::Submitting => {
                        editor.as_ref().and_then(RowEditor::draft)
                    }
                    RowState::Viewing | RowState::Deleting => None,
                };

                let cells = schema
                    .fields()
                    .iter()
                    .map(|field| {
                        let drafted = draft
                            .as_ref()
                            .filter(|_| field.is_editable())
                            .and_then(|d| d.get(field.key()));
                        match drafted {
                            Some(text) => text.clone(),
                            None => field.render(row.get(field.key())),
                        }
                    })
                    .collect();

                let actions = match state {
                    RowState::Viewing => vec![Action::Edit, Action::Delete],
                    RowState::Editing => vec![Action::Save, Action::Cancel],
                    RowState::Submitting | RowState::Deleting => Vec::new(),
                };

                RenderedRow {
                    id: row.id().clone(),
                    state,
                    cells,
                    actions,
                }
            })
            .collect();

        RenderedTable {
            headers,
            body: TableBody::Rows(rendered),
        }
    }

    fn new_editor(&self, id: RowId) -> RowEditor {
        let updates = self.rows.clone();
        let removals = self.rows.clone();
        let editors = Arc::downgrade(&self.editors);
        let callbacks = RowCallbacks::new(
            move |id, row| apply_update(&updates, id, row),
            move |id| {
                if let Some(editors) = editors.upgrade() {
                    apply_removal(&removals, &editors, id);
                } else {
                    removals.apply_removal(id);
                }
            },
        );
        RowEditor::new(
            id,
            Arc::clone(&self.config),
            Arc::clone(&self.gateway),
            self.rows.clone(),
            self.notifier.clone(),
            callbacks,
        )
    }
}

fn apply_update(rows: &TableCache, id: &RowId, row: Row) {
    if !rows.apply_update(id, row) {
        log::debug!("ignoring update for {} which is no longer cached", id);
    }
}

fn apply_removal(rows: &TableCache, editors: &EditorMap, id: &RowId) {
    if !rows.apply_removal(id) {
        log::debug!("ignoring removal of {} which is no longer cached", id);
    }
    if let Ok(mut editors) = editors.lock() {
        editors.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::gateway::TableName;
    use crate::schema::Field;
    use crate::schema::Schema;

    fn controller() -> TableController {
        let table = TableName::new("events").unwrap();
        let gateway = MemoryGateway::new().with_table(
            &table,
            vec![Row::new(1).set("name", "a"), Row::new(2).set("name", "b")],
        );
        let schema = Schema::new(vec![Field::text("name", "Name").editable()]).unwrap();
        TableController::new(
            Arc::new(gateway),
            TableConfig::new(table, schema, "event"),
            Notifier::new(),
        )
    }

    #[test]
    fn test_renders_loading_before_fetch() {
        let controller = controller();
        let table = controller.render();
        assert_eq!(table.body, TableBody::Loading { span: 2 });
        assert_eq!(table.headers, vec!["Name", "Action"]);
        assert!(controller.editor(&RowId::Int(1)).is_none());
    }

    #[tokio::test]
    async fn test_load_runs_once() {
        let controller = controller();
        assert_eq!(controller.load().await, LoadOutcome::Loaded(2));
        assert_eq!(controller.load().await, LoadOutcome::AlreadyLoaded);
    }

    #[tokio::test]
    async fn test_editor_is_shared() {
        let controller = controller();
        controller.load().await;
        let first = controller.editor(&RowId::Int(1)).unwrap();
        first.begin_edit().unwrap();
        let second = controller.editor(&RowId::Int(1)).unwrap();
        assert_eq!(second.state(), RowState::Editing);
    }

    #[tokio::test]
    async fn test_removal_drops_editor() {
        let controller = controller();
        controller.load().await;
        controller.editor(&RowId::Int(1)).unwrap().begin_edit().unwrap();
        controller.apply_removal(&RowId::Int(1));
        assert!(controller.editor(&RowId::Int(1)).is_none());
        assert_eq!(controller.render().rows().len(), 1);
    }
}
