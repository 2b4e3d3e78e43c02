//! # Domain Model: Tabs, Fields, and the Document
//!
//! This module defines the core data structures: [`Document`], [`Tab`],
//! [`Field`], [`FieldKind`], and [`Settings`], plus every structural
//! operation on them.
//!
//! ## The Shape
//!
//! ```text
//! Document
//! ├── tabs: [Tab]            <-- ordered, never empty after a mutation
//! │   └── fields: [Field]    <-- ordered, typed, no duplicate ids
//! ├── activeTabId            <-- must reference an existing tab when set
//! └── settings               <-- defaulted key-by-key, unknown keys kept
//! ```
//!
//! ## Invariants
//!
//! - At least one tab exists after any mutation completes. When the list
//!   empties, a default `"Tab 1"` tab with a single `"Title"` label field is
//!   synthesized ([`Document::ensure_default`]).
//! - `active_tab_id`, when set, references an existing tab. Removal and
//!   reordering fix it up; it is `None` only transiently during recovery.
//! - Field ids are unique across the whole document, not just within a tab.
//!   They are assigned at creation and never reassigned; external data gets
//!   fresh ids at the import boundary (see `import`).
//! - `value` is always a string, including for images (a data URI).
//!
//! ## Failure Semantics
//!
//! Not-found conditions are silent no-ops, mirroring optimistic UI
//! operations. The one explicit failure is renaming a tab to a blank name,
//! which returns a `Validation` error and leaves the old name intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NoteableError, Result};
use crate::ident::new_id;

/// The closed set of field types. Every consumer matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text.
    Label,
    /// Multi-line text.
    Textarea,
    /// Binary image, stored as a data URI string.
    Image,
    /// Placeholder-expanding text, resolved on demand (see `template`).
    Template,
}

impl FieldKind {
    /// Display label used when a field is created or rendered without one.
    pub fn default_label(&self) -> &'static str {
        match self {
            FieldKind::Label => "Text",
            FieldKind::Textarea => "Note",
            FieldKind::Image => "Image",
            FieldKind::Template => "Template",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Label => "label",
            FieldKind::Textarea => "textarea",
            FieldKind::Image => "image",
            FieldKind::Template => "template",
        }
    }

    /// Parse a type tag from untrusted data. Unrecognized tags coerce to
    /// [`FieldKind::Label`] rather than failing.
    pub fn parse_loose(tag: &str) -> Self {
        match tag {
            "textarea" => FieldKind::Textarea,
            "image" => FieldKind::Image,
            "template" => FieldKind::Template,
            _ => FieldKind::Label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    /// Image geometry. Sticky: once populated it is never recomputed from
    /// the natural image size (see `geometry`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Field {
    pub fn new(kind: FieldKind, label: &str) -> Self {
        Self {
            id: new_id("f"),
            kind,
            label: label.to_string(),
            value: String::new(),
            width: None,
            height: None,
        }
    }

    /// Display label, falling back to the type-derived default. The fallback
    /// is applied at render time, never stored.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.kind.default_label()
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Tab {
    /// A new tab starts with one default "Title" label field.
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id("tab"),
            name: name.to_string(),
            fields: vec![Field::new(FieldKind::Label, "Title")],
        }
    }
}

/// Recognized options plus a passthrough map for keys this build does not
/// know about. Older persisted documents lacking newer keys pick up the
/// defaults; newer documents read by older builds keep their extra keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// When clearing a tab, remove image fields entirely instead of leaving
    /// them untouched.
    #[serde(default)]
    pub clear_tab_deletes_images: bool,
    /// Gates availability of the `template` field type in the UI.
    #[serde(default)]
    pub experimental: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            clear_tab_deletes_images: false,
            experimental: false,
            extra: Map::new(),
        }
    }
}

/// The top-level persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub active_tab_id: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

impl Document {
    /// Synthesize the default tab when the document has none. Returns true
    /// when a tab was created.
    pub fn ensure_default(&mut self) -> bool {
        if !self.tabs.is_empty() {
            return false;
        }
        let tab = Tab::new("Tab 1");
        self.active_tab_id = Some(tab.id.clone());
        self.tabs.push(tab);
        true
    }

    pub fn find_tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn find_tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_deref()?;
        self.find_tab(id)
    }

    /// Append a new tab and make it active. A blank name becomes "New tab".
    pub fn add_tab(&mut self, name: &str) -> &Tab {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() { "New tab" } else { trimmed };
        let tab = Tab::new(name);
        self.active_tab_id = Some(tab.id.clone());
        let idx = self.tabs.len();
        self.tabs.push(tab);
        &self.tabs[idx]
    }

    /// Remove a tab by id. Unknown ids are a no-op. Activation moves to the
    /// first remaining tab when the active one is removed; an emptied
    /// document gets the default tab back.
    pub fn remove_tab(&mut self, id: &str) {
        self.tabs.retain(|t| t.id != id);
        self.restore_tab_invariants();
    }

    /// Rename a tab. Fails when the trimmed name is empty; unknown ids are a
    /// silent no-op.
    pub fn rename_tab(&mut self, id: &str, name: &str) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(NoteableError::Validation(
                "tab name cannot be empty".to_string(),
            ));
        }
        if let Some(tab) = self.find_tab_mut(id) {
            tab.name = trimmed.to_string();
        }
        Ok(())
    }

    /// Replace the tab order with the given id sequence. Tabs absent from
    /// the sequence are dropped, unknown ids ignored. The order is derived
    /// from rendered UI elements, so both conditions are expected.
    pub fn reorder_tabs<I: AsRef<str>>(&mut self, order: &[I]) {
        let mut remaining = std::mem::take(&mut self.tabs);
        let mut reordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(pos) = remaining.iter().position(|t| t.id == id.as_ref()) {
                reordered.push(remaining.remove(pos));
            }
        }
        self.tabs = reordered;
        self.restore_tab_invariants();
    }

    /// Make a tab active. Unknown ids are a no-op.
    pub fn set_active_tab(&mut self, id: &str) {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active_tab_id = Some(id.to_string());
        }
    }

    /// Append a field with an empty value. A blank label takes the per-type
    /// default. Returns `None` when the tab does not exist.
    pub fn add_field(&mut self, tab_id: &str, kind: FieldKind, label: &str) -> Option<&Field> {
        let tab = self.find_tab_mut(tab_id)?;
        let trimmed = label.trim();
        let label = if trimmed.is_empty() {
            kind.default_label()
        } else {
            trimmed
        };
        tab.fields.push(Field::new(kind, label));
        tab.fields.last()
    }

    pub fn remove_field(&mut self, tab_id: &str, field_id: &str) {
        if let Some(tab) = self.find_tab_mut(tab_id) {
            tab.fields.retain(|f| f.id != field_id);
        }
    }

    /// Relabel a field. Blank labels are allowed; the display fallback
    /// covers them.
    pub fn rename_field(&mut self, tab_id: &str, field_id: &str, label: &str) {
        if let Some(field) = self.find_field_in_tab_mut(tab_id, field_id) {
            field.label = label.trim().to_string();
        }
    }

    pub fn set_field_value(&mut self, tab_id: &str, field_id: &str, value: impl Into<String>) {
        if let Some(field) = self.find_field_in_tab_mut(tab_id, field_id) {
            field.value = value.into();
        }
    }

    /// Same drop/ignore semantics as [`Document::reorder_tabs`].
    pub fn reorder_fields<I: AsRef<str>>(&mut self, tab_id: &str, order: &[I]) {
        if let Some(tab) = self.find_tab_mut(tab_id) {
            let mut remaining = std::mem::take(&mut tab.fields);
            let mut reordered = Vec::with_capacity(remaining.len());
            for id in order {
                if let Some(pos) = remaining.iter().position(|f| f.id == id.as_ref()) {
                    reordered.push(remaining.remove(pos));
                }
            }
            tab.fields = reordered;
        }
    }

    /// Blank every non-image field's value. When `delete_images` is set,
    /// additionally remove image fields from the tab.
    pub fn clear_tab(&mut self, tab_id: &str, delete_images: bool) {
        if let Some(tab) = self.find_tab_mut(tab_id) {
            for field in tab.fields.iter_mut() {
                if field.kind != FieldKind::Image {
                    field.value.clear();
                }
            }
            if delete_images {
                tab.fields.retain(|f| f.kind != FieldKind::Image);
            }
        }
    }

    /// Look up a field anywhere in the document by id.
    pub fn find_field(&self, id: &str) -> Option<&Field> {
        self.all_fields().find(|f| f.id == id)
    }

    pub fn find_field_in_tab_mut(&mut self, tab_id: &str, field_id: &str) -> Option<&mut Field> {
        self.find_tab_mut(tab_id)?
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
    }

    /// All fields flattened across tabs, tab order then field order.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.tabs.iter().flat_map(|t| t.fields.iter())
    }

    fn restore_tab_invariants(&mut self) {
        if self.tabs.is_empty() {
            self.active_tab_id = None;
            self.ensure_default();
            return;
        }
        let active_exists = match self.active_tab_id.as_deref() {
            Some(id) => self.tabs.iter().any(|t| t.id == id),
            None => false,
        };
        if !active_exists {
            self.active_tab_id = Some(self.tabs[0].id.clone());
        }
    }
}
