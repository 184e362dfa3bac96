use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::io::excel_read;
use crate::io::excel_write::{self, unique_sheet_name};
use crate::io::xml_read;
use crate::model::{SheetTable, WorkbookData};
use crate::session::Session;

/// Extension enforced on exported workbooks.
pub const WORKBOOK_EXTENSION: &str = "xlsx";
/// Extension enforced on saved log files.
pub const LOG_EXTENSION: &str = "txt";

/// Options for [`export_excel`].
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// The XML file the table was loaded from; its base name becomes the
    /// sheet name.
    pub source: PathBuf,
    /// Destination workbook. `.xlsx` is appended when missing.
    pub output: PathBuf,
    /// Columns to export, in order. `None` exports every column.
    pub columns: Option<Vec<String>>,
}

/// Parses the XML file at `path` and publishes the result to the session's
/// table store.
///
/// On failure the store is cleared, the error is logged and returned.
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn load_xml(session: &mut Session, path: &Path) -> Result<()> {
    session.log.log_event(format!(
        "Start parsing XML file into a table: {}",
        path.display()
    ));

    match xml_read::parse_file(path) {
        Ok(table) => {
            info!(
                columns = table.column_count(),
                rows = table.row_count(),
                "flattened XML document"
            );
            session.log.log_event(format!(
                "{} columns and {} rows found",
                table.column_count(),
                table.row_count()
            ));
            session.store.set_result(Ok(table))?;
            session.log.log_event("Finished parsing XML file");
            Ok(())
        }
        Err(err) => {
            session
                .log
                .log_error(format!("Error while parsing XML file: {err}"));
            session.store.set_result(Err(err))
        }
    }
}

/// Drops the current table, e.g. when the user cancels a file selection.
pub fn clear_table(session: &mut Session) {
    session.store.clear();
    session.log.log_event("Selection canceled");
}

/// Exports the current table to an Excel workbook and returns the path
/// written.
///
/// An existing workbook keeps its sheets and receives the table as a new
/// sheet whose name is made unique against them.
#[instrument(
    level = "info",
    skip_all,
    fields(source = %request.source.display(), output = %request.output.display())
)]
pub fn export_excel(session: &mut Session, request: &ExportRequest) -> Result<PathBuf> {
    let output = ensure_extension(&request.output, WORKBOOK_EXTENSION);
    session.log.log_event("Exporting XML data to XLSX file");

    match write_export(session, request, &output) {
        Ok(()) => {
            session
                .log
                .log_event(format!("XML data exported to {}", output.display()));
            Ok(output)
        }
        Err(err) => {
            if err.is_resource_busy() {
                warn!(error = %err, "destination workbook is locked");
            }
            session.log.log_error(export_failure_message(&output, &err));
            Err(err)
        }
    }
}

fn export_failure_message(output: &Path, err: &ToolError) -> String {
    if err.is_resource_busy() {
        format!(
            "Error while opening the file '{}'. The file is opened by another app and cannot be edited",
            output.display()
        )
    } else {
        format!("Error while saving the file '{}': {err}", output.display())
    }
}

fn write_export(session: &mut Session, request: &ExportRequest, output: &Path) -> Result<()> {
    let table = session.store.table().ok_or(ToolError::NoTable)?;
    let table = match &request.columns {
        Some(columns) => table.select(columns.as_slice())?,
        None => table.clone(),
    };
    session.log.log_event(format!(
        "Exporting {} columns and {} rows",
        table.column_count(),
        table.row_count()
    ));

    let raw_name = sheet_base_name(&request.source);
    let mut workbook = if output.exists() {
        session
            .log
            .log_event("Add a new sheet to an existing workbook");
        excel_read::read_workbook(output)?
    } else {
        session.log.log_event("Create a new workbook");
        WorkbookData::default()
    };

    let sheet_name = unique_sheet_name(&raw_name, workbook.sheet_names());
    debug!(sheet = %sheet_name, existing = workbook.tables.len(), "sheet name assigned");
    workbook
        .tables
        .push(SheetTable::from_table(sheet_name, &table));

    excel_write::write_workbook(output, &workbook)
}

/// Saves the session's event log to `path` and returns the path written.
/// `.txt` is appended when missing.
#[instrument(level = "info", skip_all, fields(output = %path.display()))]
pub fn save_log(session: &mut Session, path: &Path) -> Result<PathBuf> {
    let output = ensure_extension(path, LOG_EXTENSION);
    session
        .log
        .log_event(format!("Save as {}", output.display()));

    match session.log.save_log(&output) {
        Ok(()) => Ok(output),
        Err(err) => {
            session.log.log_error(format!(
                "Error while saving the log file '{}': {err}",
                output.display()
            ));
            Err(err)
        }
    }
}

fn sheet_base_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn ensure_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some_and(|current| current == extension) {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
