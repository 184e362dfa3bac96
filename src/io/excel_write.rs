use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::Result;
use crate::model::{SheetCell, SheetTable, WorkbookData};

/// Writes the provided workbook data to the given path, replacing any file
/// already there.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;
        write_sheet(worksheet, table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, table: &SheetTable) -> Result<()> {
    let (first_row, first_col) = table.origin;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(first_row, first_col + col_idx as u16, header)?;
    }

    let body_row = if table.columns.is_empty() {
        first_row
    } else {
        first_row + 1
    };

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = body_row + row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = first_col + col_idx as u16;
            match cell {
                SheetCell::Blank => {}
                SheetCell::Text(value) => {
                    worksheet.write_string(row_num, col_num, value)?;
                }
                SheetCell::Number(value) => {
                    worksheet.write_number(row_num, col_num, *value)?;
                }
                SheetCell::Bool(value) => {
                    worksheet.write_boolean(row_num, col_num, *value)?;
                }
            }
        }
    }

    if !table.columns.is_empty() && !table.rows.is_empty() {
        let col_end = first_col + (table.columns.len() as u16).saturating_sub(1);
        let row_end = first_row + table.rows.len() as u32;
        if has_case_insensitive_duplicates(&table.columns) {
            // Excel tables reject headers that differ only by case.
            worksheet.autofilter(first_row, first_col, row_end, col_end)?;
        } else {
            let mut excel_table = rust_xlsxwriter::Table::new();
            excel_table.set_autofilter(true);
            worksheet.add_table(first_row, first_col, row_end, col_end, &excel_table)?;
        }
    }

    Ok(())
}

fn has_case_insensitive_duplicates(headers: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(headers.len());
    headers
        .iter()
        .any(|header| !seen.insert(header.to_lowercase()))
}

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Turns `raw` into a valid sheet name that does not collide with any of
/// `existing`, appending `_1`, `_2`, … as needed.
pub fn unique_sheet_name<'a>(raw: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let mut registry = SheetNameRegistry::default();
    for name in existing {
        registry.claim(name);
    }
    registry.assign(raw)
}

#[derive(Debug, Default)]
struct SheetNameRegistry {
    // Excel compares sheet names case-insensitively.
    used: HashSet<String>,
}

impl SheetNameRegistry {
    fn claim(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    fn is_taken(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    fn assign(&mut self, raw: &str) -> String {
        let base = sanitize_sheet_name(raw);
        if !self.is_taken(&base) {
            self.claim(&base);
            return base;
        }

        let mut counter = 1;
        loop {
            let suffix = format!("_{counter}");
            let prefix = truncate_chars(&base, MAX_SHEET_NAME_LEN - suffix.len());
            let candidate = format!("{prefix}{suffix}");
            if !self.is_taken(&candidate) {
                self.claim(&candidate);
                return candidate;
            }
            counter += 1;
        }
    }
}

fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']'];
    let sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    // Excel rejects names that start or end with an apostrophe.
    let sanitized = sanitized.trim().trim_matches('\'');
    if sanitized.is_empty() {
        return "Sheet".to_string();
    }

    truncate_chars(sanitized, MAX_SHEET_NAME_LEN).to_string()
}

fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}
