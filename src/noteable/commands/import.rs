use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NoteableError, Result};
use crate::import::{self, ImportMode};
use crate::model::Document;
use std::fs;
use std::path::Path;

/// Read an import file and apply it to the document. The document is not
/// touched unless the payload passes validation.
pub fn run(document: &mut Document, path: &Path, mode: ImportMode) -> Result<CmdResult> {
    let raw = fs::read_to_string(path).map_err(NoteableError::Io)?;
    run_text(document, &raw, mode)
}

pub fn run_text(document: &mut Document, raw: &str, mode: ImportMode) -> Result<CmdResult> {
    let tabs = import::parse_import(raw)?;
    let count = tabs.len();
    import::apply(document, tabs, mode);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(match mode {
        ImportMode::Replace => format!("Import completed: replaced existing with {} tabs", count),
        ImportMode::Merge => format!("Import completed: merged {} tabs", count),
    }));
    Ok(result)
}
