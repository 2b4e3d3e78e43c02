use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NoteableError, Result};
use crate::model::Document;
use chrono::Utc;
use std::fs;
use std::path::Path;

/// Write the whole document, pretty-printed, to a timestamped backup file
/// in `dir`.
pub fn run(document: &Document, dir: &Path) -> Result<CmdResult> {
    let payload = serde_json::to_string_pretty(document).map_err(NoteableError::Serialization)?;

    let filename = format!(
        "notebook-backup-{}.json",
        Utc::now().format("%Y-%m-%d-%H-%M-%S")
    );
    let path = dir.join(filename);
    fs::write(&path, payload).map_err(NoteableError::Io)?;

    let mut result = CmdResult::default().with_paths(vec![path.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Exported to {}",
        path.display()
    )));
    Ok(result)
}
