use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, ToolError};

/// One output row: leaf tag name → text content.
///
/// A leaf element without text is stored as `None`; a column that never
/// appeared in this row has no entry at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, Option<String>>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value of a column. Later writes win.
    pub fn insert(&mut self, column: impl Into<String>, value: Option<String>) {
        self.values.insert(column.into(), value);
    }

    /// Returns the cell stored for `column`.
    pub fn cell(&self, column: &str) -> Cell<'_> {
        match self.values.get(column) {
            None => Cell::Missing,
            Some(None) => Cell::Empty,
            Some(Some(text)) => Cell::Text(text),
        }
    }

    /// Returns `true` when the row has an entry for `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// View of a single table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// The row never saw this column.
    Missing,
    /// The leaf was present but carried no text.
    Empty,
    /// The leaf's text content.
    Text(&'a str),
}

impl<'a> Cell<'a> {
    /// Returns the text when present.
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Cell::Text(text) => Some(text),
            Cell::Missing | Cell::Empty => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// Flat view of a hierarchical document: ordered columns and one row per
/// top-level element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, dropping row entries for columns the table does not
    /// declare.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.values.retain(|column, _| columns.contains(column));
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Returns the cell at `row` for `column`, or `None` when the row index
    /// is out of range.
    pub fn cell(&self, row: usize, column: &str) -> Option<Cell<'_>> {
        self.rows.get(row).map(|values| values.cell(column))
    }

    /// Returns all cells of `column` in row order.
    pub fn column_cells<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Cell<'a>> + 'a {
        self.rows.iter().map(move |row| row.cell(column))
    }

    /// Projects the table onto `selected`, in the given order.
    pub fn select<S: AsRef<str>>(&self, selected: &[S]) -> Result<Table> {
        let mut columns: Vec<String> = Vec::with_capacity(selected.len());
        for name in selected {
            let name = name.as_ref();
            if !self.columns.iter().any(|column| column == name) {
                return Err(ToolError::UnknownColumn(name.to_string()));
            }
            if !columns.iter().any(|column| column == name) {
                columns.push(name.to_string());
            }
        }
        Ok(Table::new(columns, self.rows.clone()))
    }
}

/// A cell value destined for, or read back from, a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Blank,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    /// Zero-based position of the top-left cell.
    pub origin: (u32, u16),
    /// Header row; empty for sheets carried over verbatim.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SheetCell>>,
}

impl SheetTable {
    /// Renders a [`Table`] as a sheet with a header row.
    pub fn from_table(sheet_name: impl Into<String>, table: &Table) -> Self {
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                table
                    .columns()
                    .iter()
                    .map(|column| match row.cell(column) {
                        Cell::Text(text) => SheetCell::Text(text.to_string()),
                        Cell::Missing | Cell::Empty => SheetCell::Blank,
                    })
                    .collect()
            })
            .collect();

        Self {
            sheet_name: sheet_name.into(),
            origin: (0, 0),
            columns: table.columns().to_vec(),
            rows,
        }
    }
}

/// Represents all sheets required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.sheet_name.as_str())
    }
}
