use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};

use crate::error::{Result, ToolError};
use crate::model::{SheetCell, SheetTable, WorkbookData};

/// Reads every sheet of an existing workbook so it can be written back out
/// next to a new sheet.
///
/// Cell values are kept; formatting, formulas and other workbook features
/// are not.
pub fn read_workbook(path: &Path) -> Result<WorkbookData> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut tables = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = read_required_sheet(&mut workbook, &name)?;
        tables.push(range_to_sheet(name, &range));
    }

    Ok(WorkbookData { tables })
}

/// Lists the sheet names of an existing workbook.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_owned())
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn range_to_sheet(sheet_name: String, range: &Range<DataType>) -> SheetTable {
    let origin = match range.start() {
        Some((row, col)) => (row, u16::try_from(col).unwrap_or(u16::MAX)),
        None => (0, 0),
    };

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_sheet_cell).collect())
        .collect();

    SheetTable {
        sheet_name,
        origin,
        columns: Vec::new(),
        rows,
    }
}

fn cell_to_sheet_cell(cell: &DataType) -> SheetCell {
    match cell {
        DataType::String(value) => SheetCell::Text(value.clone()),
        DataType::Float(value) => SheetCell::Number(*value),
        DataType::Int(value) => SheetCell::Number(*value as f64),
        DataType::Bool(value) => SheetCell::Bool(*value),
        DataType::Empty => SheetCell::Blank,
        other => SheetCell::Text(other.to_string()),
    }
}
