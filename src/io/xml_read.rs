use std::fs;
use std::path::Path;

use roxmltree::{Document, ParsingOptions};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::flatten::{empty_table, flatten};
use crate::model::Table;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads the XML document at `path` and flattens it into a [`Table`].
///
/// Read failures are reported as [`ToolError::Io`]; everything the XML engine
/// rejects is reported as [`ToolError::Syntax`].
pub fn parse_file(path: &Path) -> Result<Table> {
    let bytes = fs::read(path)?;
    parse_bytes(&bytes)
}

/// Flattens an XML document held in memory.
pub fn parse_bytes(bytes: &[u8]) -> Result<Table> {
    let source = std::str::from_utf8(bytes).map_err(|err| ToolError::Syntax {
        message: format!("document is not valid UTF-8: {err}"),
    })?;
    parse_str(source)
}

/// Flattens an XML document held in a string.
///
/// A document without any element, including a zero-length one, yields an
/// empty table rather than an error.
pub fn parse_str(source: &str) -> Result<Table> {
    let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    match Document::parse_with_options(source, options) {
        Ok(document) => Ok(flatten(document.root_element())),
        Err(roxmltree::Error::NoRootNode) => {
            debug!("document has no root element, substituting an empty root");
            Ok(empty_table())
        }
        Err(err) => Err(ToolError::Syntax {
            message: err.to_string(),
        }),
    }
}
