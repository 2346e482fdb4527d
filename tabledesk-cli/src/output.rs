//! Terminal output

use comfy_table::Cell;
use comfy_table::ContentArrangement;
use comfy_table::Table;
use tabledesk_lib::notify::Notifier;
use tabledesk_lib::table::LOADING_TEXT;
use tabledesk_lib::table::RenderedTable;
use tabledesk_lib::table::TableBody;

/// Formats a rendered table with box drawing.
pub fn format_table(rendered: &RenderedTable) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(rendered.headers.iter().map(Cell::new));

    match &rendered.body {
        TableBody::Loading { .. } => {
            table.add_row(vec![Cell::new(LOADING_TEXT)]);
        }
        TableBody::Rows(rows) => {
            for row in rows {
                let mut cells: Vec<Cell> = row.cells.iter().map(Cell::new).collect();
                cells.push(Cell::new(row.action_label()));
                table.add_row(cells);
            }
        }
    }

    table.to_string()
}

/// Prints the current notification to stderr if it is visible, then hides it.
pub fn report(notifier: &Notifier) {
    let notification = notifier.current();
    if notification.visible {
        eprintln!("[{}] {}", notification.severity, notification.message);
        notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabledesk_lib::model::RowId;
    use tabledesk_lib::table::Action;
    use tabledesk_lib::table::RenderedRow;
    use tabledesk_lib::table::RowState;

    #[test]
    fn test_format_table_includes_actions() {
        let rendered = RenderedTable {
            headers: vec!["Event".into(), "Action".into()],
            body: TableBody::Rows(vec![RenderedRow {
                id: RowId::Int(1),
                state: RowState::Viewing,
                cells: vec!["Drive".into()],
                actions: vec![Action::Edit, Action::Delete],
            }]),
        };
        let text = format_table(&rendered);
        assert!(text.contains("Event"));
        assert!(text.contains("Drive"));
        assert!(text.contains("Edit / Delete"));
    }

    #[test]
    fn test_format_loading() {
        let rendered = RenderedTable {
            headers: vec!["Event".into(), "Action".into()],
            body: TableBody::Loading { span: 2 },
        };
        assert!(format_table(&rendered).contains(LOADING_TEXT));
    }

    #[test]
    fn test_report_dismisses() {
        let notifier = Notifier::new();
        notifier.error("Failed to fetch events");
        report(&notifier);
        assert!(!notifier.current().visible);
    }
}
