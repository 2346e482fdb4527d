//! Rendered table model
//!
//! Hosts draw whatever they like from a [`RenderedTable`]; the CLI prints it
//! with comfy-table and the tests compare its text lines.

use std::fmt;

use super::RowState;
use crate::model::RowId;

/// Text of the single placeholder row shown before the first fetch.
pub const LOADING_TEXT: &str = "Loading...";

/// Header of the trailing actions column.
pub const ACTION_HEADER: &str = "Action";

/// A user action offered on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Edit,
    Delete,
    Save,
    Cancel,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::Save => "Save",
            Self::Cancel => "Cancel",
        }
    }
}

/// One data row, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub id: RowId,
    pub state: RowState,
    /// One cell per schema field, in schema order.
    pub cells: Vec<String>,
    /// Actions available in the current state; empty while busy.
    pub actions: Vec<Action>,
}

impl RenderedRow {
    /// Text of the actions cell.
    pub fn action_label(&self) -> String {
        match self.state {
            RowState::Submitting => "Saving...".to_string(),
            RowState::Deleting => "Deleting...".to_string(),
            RowState::Viewing | RowState::Editing => self
                .actions
                .iter()
                .map(Action::label)
                .collect::<Vec<_>>()
                .join(" / "),
        }
    }
}

/// Table body: a loading placeholder or the cached rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    /// One full-width row spanning `span` columns.
    Loading { span: usize },
    Rows(Vec<RenderedRow>),
}

/// A snapshot of what the table shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    /// Field headers followed by [`ACTION_HEADER`].
    pub headers: Vec<String>,
    pub body: TableBody,
}

impl RenderedTable {
    pub fn is_loading(&self) -> bool {
        matches!(self.body, TableBody::Loading { .. })
    }

    /// Rendered data rows; empty while loading.
    pub fn rows(&self) -> &[RenderedRow] {
        match &self.body {
            TableBody::Loading { .. } => &[],
            TableBody::Rows(rows) => rows,
        }
    }

    /// Header line followed by one line per body row, cells joined by `" | "`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.headers.join(" | ")];
        match &self.body {
            TableBody::Loading { .. } => lines.push(LOADING_TEXT.to_string()),
            TableBody::Rows(rows) => {
                for row in rows {
                    let mut cells = row.cells.clone();
                    cells.push(row.action_label());
                    lines.push(cells.join(" | "));
                }
            }
        }
        lines
    }
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_label() {
        let mut row = RenderedRow {
            id: RowId::Int(1),
            state: RowState::Viewing,
            cells: vec!["Drive".into()],
            actions: vec![Action::Edit, Action::Delete],
        };
        assert_eq!(row.action_label(), "Edit / Delete");
        row.state = RowState::Deleting;
        row.actions.clear();
        assert_eq!(row.action_label(), "Deleting...");
    }

    #[test]
    fn test_loading_lines() {
        let table = RenderedTable {
            headers: vec!["Name".into(), ACTION_HEADER.into()],
            body: TableBody::Loading { span: 2 },
        };
        assert!(table.is_loading());
        assert!(table.rows().is_empty());
        assert_eq!(table.to_string(), "Name | Action\nLoading...");
    }
}
