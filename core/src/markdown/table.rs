#![deny(missing_docs)]

//! # Table Parsing
//!
//! Turns pipe-delimited Markdown tables into ordered field rows.
//!
//! Rows whose column count differs from the header are skipped rather than
//! rejected: crawled pages regularly contain descriptions with stray pipes.

use log::debug;

/// The cell value marking a field as required ("yes").
pub const REQUIRED_MARKER: &str = "是";

/// A raw table: header cells plus data rows, separator rows removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Header cells, trimmed.
    pub headers: Vec<String>,
    /// Data rows, trimmed cells.
    pub rows: Vec<Vec<String>>,
}

/// One field described by a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    /// Field name.
    pub name: String,
    /// Raw type token as written in the table (e.g. `int`, `object`).
    pub type_: String,
    /// Whether the required cell carried the affirmative marker.
    pub required: bool,
    /// Free-text description, possibly empty.
    pub description: String,
}

impl FieldRow {
    /// Convenience constructor used by callers that synthesize rows.
    pub fn new(
        name: impl Into<String>,
        type_: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_: type_.into(),
            required,
            description: description.into(),
        }
    }
}

/// Column indices for the four semantic columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    type_: usize,
    required: usize,
    description: usize,
}

impl Columns {
    /// Locates columns by header keyword, falling back to the canonical
    /// `name | type | required | description` order.
    fn resolve(headers: &[String]) -> Self {
        let find = |keys: &[&str], fallback: usize| {
            headers
                .iter()
                .position(|h| {
                    let h = h.to_lowercase();
                    keys.iter().any(|k| h.contains(k))
                })
                .unwrap_or(fallback)
        };

        Self {
            name: find(&["名称", "name"], 0),
            type_: find(&["类型", "type"], 1),
            required: find(&["必填", "required"], 2),
            description: find(&["描述", "说明", "description"], 3),
        }
    }
}

impl Table {
    /// Parses the `|` lines of `text`. Returns `None` when there is no header row.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('|'));

        let headers = split_row(lines.next()?);
        let rows = lines
            .map(split_row)
            .filter(|cells| !is_separator(cells))
            .collect();

        Some(Self { headers, rows })
    }

    /// Converts data rows into field rows.
    pub fn fields(&self) -> Vec<FieldRow> {
        let columns = Columns::resolve(&self.headers);
        let cell = |row: &[String], idx: usize| row.get(idx).cloned().unwrap_or_default();

        self.rows
            .iter()
            .filter_map(|row| {
                if row.len() != self.headers.len() {
                    debug!(
                        "Skipping table row with {} cells (header has {}): {:?}",
                        row.len(),
                        self.headers.len(),
                        row
                    );
                    return None;
                }
                let name = cell(row, columns.name);
                if name.is_empty() {
                    return None;
                }
                Some(FieldRow {
                    name,
                    type_: cell(row, columns.type_),
                    required: cell(row, columns.required) == REQUIRED_MARKER,
                    description: cell(row, columns.description),
                })
            })
            .collect()
    }

    /// True if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses a Markdown table into ordered field rows.
pub fn parse_table(markdown_table: &str) -> Vec<FieldRow> {
    Table::parse(markdown_table)
        .map(|table| table.fields())
        .unwrap_or_default()
}

fn split_row(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn is_separator(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            !c.is_empty() && c.contains('-') && c.chars().all(|ch| ch == '-' || ch == ':')
        })
}
