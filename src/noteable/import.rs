//! # Import Normalization
//!
//! Imported tab/field data comes from a user-selected file and is fully
//! untrusted. This module is the only boundary through which external
//! structure reaches the document model, and it sanitizes everything:
//!
//! - The payload must be JSON with a `tabs` array; anything else is a
//!   `Format` error and the whole import aborts with no partial effects.
//! - Every tab and field gets a **fresh** id. Imported ids are never
//!   trusted, which rules out collisions with existing document entities.
//! - Missing names and labels take defaults, unknown field types coerce to
//!   `label`, values default to the empty string, and image geometry is
//!   carried over only when numeric (anything else is recomputed on first
//!   render).
//!
//! Normalization completes before any mutation, so both merge modes are
//! atomic with respect to validation failures.

use serde_json::Value;

use crate::error::{NoteableError, Result};
use crate::ident::new_id;
use crate::model::{Document, Field, FieldKind, Tab};

/// How normalized tabs are combined with the existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard all existing tabs and replace them with the import.
    Replace,
    /// Append imported tabs, leaving existing tabs and selection untouched.
    Merge,
}

/// Parse and normalize an import payload into ready-to-insert tabs.
pub fn parse_import(text: &str) -> Result<Vec<Tab>> {
    let payload: Value = serde_json::from_str(text)
        .map_err(|e| NoteableError::Format(format!("not valid JSON: {}", e)))?;
    let tabs = payload
        .get("tabs")
        .and_then(Value::as_array)
        .ok_or_else(|| NoteableError::Format("payload must contain a `tabs` array".to_string()))?;
    Ok(tabs.iter().map(normalize_tab).collect())
}

/// Apply normalized tabs to the document in the given mode.
pub fn apply(document: &mut Document, tabs: Vec<Tab>, mode: ImportMode) {
    match mode {
        ImportMode::Replace => {
            document.tabs = tabs;
            document.active_tab_id = document.tabs.first().map(|t| t.id.clone());
            document.ensure_default();
        }
        ImportMode::Merge => {
            let first_imported = tabs.first().map(|t| t.id.clone());
            document.tabs.extend(tabs);
            if document.active_tab_id.is_none() {
                document.active_tab_id =
                    first_imported.or_else(|| document.tabs.first().map(|t| t.id.clone()));
                document.ensure_default();
            }
        }
    }
}

fn normalize_tab(raw: &Value) -> Tab {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("Imported tab");
    let fields = raw
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().map(normalize_field).collect())
        .unwrap_or_default();
    Tab {
        id: new_id("tab"),
        name: name.to_string(),
        fields,
    }
}

fn normalize_field(raw: &Value) -> Field {
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .map(FieldKind::parse_loose)
        .unwrap_or(FieldKind::Label);
    let label = raw
        .get("label")
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty())
        .unwrap_or(kind.default_label());
    let value = raw.get("value").and_then(Value::as_str).unwrap_or("");

    let (width, height) = if kind == FieldKind::Image {
        (
            raw.get("width").and_then(Value::as_f64),
            raw.get("height").and_then(Value::as_f64),
        )
    } else {
        (None, None)
    };

    Field {
        id: new_id("f"),
        kind,
        label: label.to_string(),
        value: value.to_string(),
        width,
        height,
    }
}
