//! Per-row edit and delete lifecycle

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use super::Confirm;
use super::TableCache;
use super::TableConfig;
use crate::error::TableError;
use crate::error::TransitionError;
use crate::gateway::Gateway;
use crate::model::ID_COLUMN;
use crate::model::Patch;
use crate::model::Row;
use crate::model::RowId;
use crate::notify::Notifier;

// ============================================================================
// State
// ============================================================================

/// Where a row is in its edit/delete lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RowState {
    /// Read-only cells with Edit and Delete actions.
    #[default]
    Viewing,
    /// Editable cells backed by a draft, with Save and Cancel actions.
    Editing,
    /// An update is in flight.
    Submitting,
    /// A delete is in flight.
    Deleting,
}

impl RowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewing => "viewing",
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Deleting => "deleting",
        }
    }

    /// Returns `true` while a remote call for the row is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting | Self::Deleting)
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`RowEditor::save`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The store accepted the patch. Holds the row now in the cache.
    Saved(Row),
    /// A draft value did not parse. Nothing was sent.
    Invalid(TableError),
    /// The store rejected the update.
    Failed(TableError),
}

/// Result of [`RowEditor::request_delete`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The row was deleted and removed from the cache.
    Deleted,
    /// The user declined the confirmation.
    Declined,
    /// The store rejected the delete.
    Failed(TableError),
}

// ============================================================================
// Callbacks
// ============================================================================

type UpdatedFn = dyn Fn(&RowId, Row) + Send + Sync;
type RemovedFn = dyn Fn(&RowId) + Send + Sync;

/// Hooks an editor uses to report confirmed changes to its table.
#[derive(Clone)]
pub struct RowCallbacks {
    on_row_updated: Arc<UpdatedFn>,
    on_row_removed: Arc<RemovedFn>,
}

impl RowCallbacks {
    pub fn new(
        on_row_updated: impl Fn(&RowId, Row) + Send + Sync + 'static,
        on_row_removed: impl Fn(&RowId) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_row_updated: Arc::new(on_row_updated),
            on_row_removed: Arc::new(on_row_removed),
        }
    }
}

impl fmt::Debug for RowCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCallbacks").finish_non_exhaustive()
    }
}

// ============================================================================
// RowEditor
// ============================================================================

#[derive(Debug, Default)]
struct EditorInner {
    state: RowState,
    draft: Option<BTreeMap<String, String>>,
    /// Input text each editable field started with; unchanged fields are not sent.
    seed: BTreeMap<String, String>,
}

/// Drives one cached row through viewing, editing, saving and deleting.
///
/// Cheap to clone; clones share the same state. Obtain one from
/// [`TableController::editor`](super::TableController::editor).
///
/// Every operation returns `Err` only when the row is in a state that does
/// not allow it. Remote failures are logged, shown through the notifier and
/// reported in the returned outcome.
#[derive(Debug, Clone)]
pub struct RowEditor {
    id: RowId,
    config: Arc<TableConfig>,
    gateway: Arc<dyn Gateway>,
    rows: TableCache,
    notifier: Notifier,
    callbacks: RowCallbacks,
    inner: Arc<Mutex<EditorInner>>,
}

impl RowEditor {
    pub(crate) fn new(
        id: RowId,
        config: Arc<TableConfig>,
        gateway: Arc<dyn Gateway>,
        rows: TableCache,
        notifier: Notifier,
        callbacks: RowCallbacks,
    ) -> Self {
        Self {
            id,
            config,
            gateway,
            rows,
            notifier,
            callbacks,
            inner: Arc::new(Mutex::new(EditorInner::default())),
        }
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RowState {
        self.inner
            .lock()
            .map(|inner| inner.state)
            .unwrap_or_default()
    }

    /// The cached row, or `None` once it has been removed.
    pub fn row(&self) -> Option<Row> {
        self.rows.get(&self.id)
    }

    /// A copy of the edit draft, if an edit session is open.
    pub fn draft(&self) -> Option<BTreeMap<String, String>> {
        self.inner.lock().ok().and_then(|inner| inner.draft.clone())
    }

    /// Opens an edit session seeded from the row's editable fields.
    pub fn begin_edit(&self) -> Result<(), TransitionError> {
        let row = self.row();
        let seed: BTreeMap<String, String> = self
            .config
            .schema()
            .editable()
            .map(|field| {
                let value = row.as_ref().and_then(|r| r.get(field.key()));
                (field.key().to_string(), field.input_text(value))
            })
            .collect();

        self.transition("edit", RowState::Viewing, RowState::Editing, |inner| {
            inner.draft = Some(seed.clone());
            inner.seed = seed;
        })
    }

    /// Sets one draft value. No validation happens until [`save`](Self::save).
    pub fn update_draft(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TransitionError> {
        let (key, value) = (key.into(), value.into());
        self.transition("update draft", RowState::Editing, RowState::Editing, |inner| {
            inner.draft.get_or_insert_with(BTreeMap::new).insert(key, value);
        })
    }

    /// Closes the edit session without saving.
    pub fn cancel_edit(&self) -> Result<(), TransitionError> {
        self.transition("cancel", RowState::Editing, RowState::Viewing, |inner| {
            inner.draft = None;
            inner.seed.clear();
        })
    }

    /// Parses the changed draft fields and sends them to the store.
    ///
    /// Fields whose text still matches what [`begin_edit`](Self::begin_edit)
    /// seeded are left out of the patch, so stored values the user never
    /// touched (nulls included) are not rewritten. A draft with no changes
    /// closes the session without a remote call.
    pub async fn save(&self) -> Result<SaveOutcome, TransitionError> {
        let (draft, seed) = {
            let Ok(mut inner) = self.inner.lock() else {
                return Err(TransitionError::new("save", RowState::default()));
            };
            if inner.state != RowState::Editing {
                return Err(TransitionError::new("save", inner.state));
            }
            inner.state = RowState::Submitting;
            (inner.draft.clone().unwrap_or_default(), inner.seed.clone())
        };

        let patch = match self.build_patch(&draft, &seed) {
            Ok(patch) => patch,
            Err(error) => {
                log::warn!("rejected draft for {} {}: {}", self.config.table(), self.id, error);
                self.set_state(RowState::Editing);
                self.notifier.error(error.to_string());
                return Ok(SaveOutcome::Invalid(error));
            }
        };

        if patch.is_empty() {
            log::debug!("nothing changed on {} {}", self.config.table(), self.id);
            self.finish_edit();
            let row = self.row().unwrap_or_else(|| Row::new(self.id.clone()));
            return Ok(SaveOutcome::Saved(row));
        }

        log::debug!("updating {} {} ({} fields)", self.config.table(), self.id, patch.len());
        match self.gateway.update(self.config.table(), &self.id, &patch).await {
            Ok(echo) => {
                let Some(mut merged) = self.row() else {
                    log::debug!("{} {} left the cache before its update landed", self.config.table(), self.id);
                    self.finish_edit();
                    let fallback = echo.unwrap_or_else(|| {
                        let mut row = Row::new(self.id.clone());
                        row.merge(&patch);
                        row
                    });
                    return Ok(SaveOutcome::Saved(fallback));
                };
                match echo {
                    Some(returned) => merged.merge_row(returned),
                    None => merged.merge(&patch),
                }
                self.finish_edit();
                (self.callbacks.on_row_updated)(&self.id, merged.clone());
                Ok(SaveOutcome::Saved(merged))
            }
            Err(cause) => {
                log::error!("update of {} {} failed: {}", self.config.table(), self.id, cause);
                let error = TableError::update_failed(self.config.data_name(), &cause);
                self.set_state(RowState::Editing);
                self.notifier.error(error.to_string());
                Ok(SaveOutcome::Failed(error))
            }
        }
    }

    /// Asks for confirmation, then deletes the row from the store.
    pub async fn request_delete(
        &self,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, TransitionError> {
        self.expect_state("delete", RowState::Viewing)?;

        let prompt = self.delete_prompt();
        if !confirm.confirm(&prompt).await {
            log::debug!("delete of {} {} declined", self.config.table(), self.id);
            return Ok(DeleteOutcome::Declined);
        }

        // the row may have moved on while the prompt was open
        self.transition("delete", RowState::Viewing, RowState::Deleting, |_| {})?;

        log::debug!("deleting {} {}", self.config.table(), self.id);
        match self.gateway.delete(self.config.table(), &self.id).await {
            Ok(()) => {
                self.set_state(RowState::Viewing);
                (self.callbacks.on_row_removed)(&self.id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(cause) => {
                log::error!("delete of {} {} failed: {}", self.config.table(), self.id, cause);
                let error = TableError::delete_failed(self.config.data_name(), &cause);
                self.set_state(RowState::Viewing);
                self.notifier.error(error.to_string());
                Ok(DeleteOutcome::Failed(error))
            }
        }
    }

    /// The confirmation prompt for deleting this row.
    pub fn delete_prompt(&self) -> String {
        let key = self.config.confirm_field();
        let value = if key == ID_COLUMN {
            self.id.to_string()
        } else {
            let row = self.row();
            let value = row.as_ref().and_then(|r| r.get(key));
            match self.config.schema().field(key) {
                Some(field) => field.render(value),
                None => value.map(|v| v.to_text()).unwrap_or_default(),
            }
        };
        format!("Delete {} '{}'?", self.config.data_name(), value)
    }

    // ------------------------------------------------------------------------

    fn build_patch(
        &self,
        draft: &BTreeMap<String, String>,
        seed: &BTreeMap<String, String>,
    ) -> Result<Patch, TableError> {
        let mut patch = Patch::new();
        for field in self.config.schema().editable() {
            let Some(raw) = draft.get(field.key()) else {
                continue;
            };
            if seed.get(field.key()) == Some(raw) {
                continue;
            }
            let value = field.parse(raw).map_err(|e| TableError::InvalidField {
                header: field.header().to_string(),
                reason: e.to_string(),
            })?;
            patch.insert(field.key(), value);
        }
        Ok(patch)
    }

    fn expect_state(&self, action: &'static str, expected: RowState) -> Result<(), TransitionError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(TransitionError::new(action, state))
        }
    }

    fn transition(
        &self,
        action: &'static str,
        from: RowState,
        to: RowState,
        apply: impl FnOnce(&mut EditorInner),
    ) -> Result<(), TransitionError> {
        let Ok(mut inner) = self.inner.lock() else {
            return Err(TransitionError::new(action, RowState::default()));
        };
        if inner.state != from {
            return Err(TransitionError::new(action, inner.state));
        }
        inner.state = to;
        apply(&mut inner);
        Ok(())
    }

    fn set_state(&self, state: RowState) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = state;
        }
    }

    fn finish_edit(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = RowState::Viewing;
            inner.draft = None;
            inner.seed.clear();
        }
    }
}
