//! CSV export of fetched rows

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::display;
use crate::model::ID_COLUMN;
use crate::model::Row;
use crate::model::Value;

const QUALIFIER: char = '"';
const DELIMITER: char = ',';
const LINE_END: &str = "\n";

/// Writes rows as CSV.
///
/// Every cell is quoted. Columns default to `id` followed by every other
/// column in the order it is first seen.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use tabledesk_lib::export::CsvExport;
/// use tabledesk_lib::model::{Row, Value};
///
/// let rows = vec![Row::new(1).set("name", "Food \"Drive\"").set("hours", 3)];
/// let csv = CsvExport::new("community-events").render(&rows);
/// assert_eq!(csv, "\"id\",\"hours\",\"name\"\n\"1\",\"3\",\"Food \"\"Drive\"\"\"\n");
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// assert_eq!(
///     CsvExport::new("community-events").file_name(day),
///     "community-events-2024-01-15.csv"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CsvExport {
    prefix: String,
    columns: Option<Vec<String>>,
    flatten: HashMap<String, String>,
    dates: Vec<String>,
}

impl CsvExport {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            columns: None,
            flatten: HashMap::new(),
            dates: Vec::new(),
        }
    }

    /// Exports exactly these columns, in this order.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces an embedded relation with one of its columns.
    pub fn flatten(mut self, column: impl Into<String>, display: impl Into<String>) -> Self {
        self.flatten.insert(column.into(), display.into());
        self
    }

    /// Exports a column as a `YYYY-MM-DD` calendar day.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.dates.push(column.into());
        self
    }

    /// `{prefix}-{YYYY-MM-DD}.csv`
    pub fn file_name(&self, day: NaiveDate) -> String {
        format!("{}-{}.csv", self.prefix, day.format(display::ISO_DAY_FORMAT))
    }

    /// Renders the header line and one line per row.
    pub fn render(&self, rows: &[Row]) -> String {
        let columns = self.columns.clone().unwrap_or_else(|| default_columns(rows));

        let mut out = String::new();
        push_line(&mut out, columns.iter().map(String::as_str));
        for row in rows {
            let cells: Vec<String> = columns.iter().map(|c| self.cell(row, c)).collect();
            push_line(&mut out, cells.iter().map(String::as_str));
        }
        out
    }

    /// Writes the CSV into `dir` under [`file_name`](Self::file_name).
    pub fn write_to_dir(&self, dir: &Path, rows: &[Row], day: NaiveDate) -> io::Result<PathBuf> {
        let path = dir.join(self.file_name(day));
        fs::write(&path, self.render(rows))?;
        log::info!("exported {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    fn cell(&self, row: &Row, column: &str) -> String {
        if column == ID_COLUMN {
            return row.id().to_string();
        }
        let Some(value) = row.get(column) else {
            return String::new();
        };
        if let Some(display) = self.flatten.get(column) {
            return match value {
                Value::Record(fields) => fields.get(display).map(Value::to_text).unwrap_or_default(),
                other => other.to_text(),
            };
        }
        if self.dates.iter().any(|d| d == column) {
            if let Some(stored) = display::date_value(value) {
                return display::format_day(stored);
            }
        }
        value.to_text()
    }
}

fn default_columns(rows: &[Row]) -> Vec<String> {
    let mut columns = vec![ID_COLUMN.to_string()];
    for row in rows {
        for key in row.fields().keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&qualify(cell));
    }
    out.push_str(LINE_END);
}

fn qualify(value: &str) -> String {
    let escaped = value.replace(QUALIFIER, &format!("{QUALIFIER}{QUALIFIER}"));
    format!("{QUALIFIER}{escaped}{QUALIFIER}")
}
