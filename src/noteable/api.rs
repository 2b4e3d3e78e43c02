//! # API Facade
//!
//! [`NoteableApi`] is the single entry point for all operations, regardless
//! of the UI driving it. It owns the one [`Document`] instance and the
//! [`DocumentStore`], and every mutating entry point routes through it, so
//! document mutations are serialized by `&mut self`, with no locking
//! discipline needed on top.
//!
//! ## Responsibilities
//!
//! - **Dispatch** to document operations and commands
//! - **Persist** after every mutation (fire-and-forget; the store logs and
//!   swallows failures)
//! - **Normalize inputs**: user-friendly selectors (tab names, field
//!   labels) resolve to stable ids before anything touches the model
//! - **Drive image geometry**: renderer events go through the per-field
//!   sizing state machine, and only its settled writes reach the document
//!
//! ## What the API Does NOT Do
//!
//! - No stdout, stderr, or terminal concerns
//! - No business logic beyond wiring; that lives in `model`, `import`,
//!   `template`, and `commands`
//!
//! ## Generic Over StorageBackend
//!
//! `NoteableApi<B: StorageBackend>` works against any backend: `FsBackend`
//! in production, `MemBackend` in tests.

use std::collections::HashMap;
use std::path::Path;

use crate::commands;
use crate::error::{NoteableError, Result};
use crate::geometry::ImageSizing;
use crate::import::ImportMode;
use crate::model::{Document, Field, FieldKind, Tab};
use crate::store::{DocumentStore, StorageBackend};
use crate::template;

pub struct NoteableApi<B: StorageBackend> {
    document: Document,
    store: DocumentStore<B>,
    image_sizing: HashMap<String, ImageSizing>,
}

// Last-resort flush on teardown; every mutation already saved eagerly.
impl<B: StorageBackend> Drop for NoteableApi<B> {
    fn drop(&mut self) {
        self.persist();
    }
}

impl<B: StorageBackend> NoteableApi<B> {
    /// Bootstrap from the store: load whatever is persisted, then
    /// re-establish the default-tab invariant, saving if a tab had to be
    /// synthesized.
    pub fn load(store: DocumentStore<B>) -> Self {
        let mut document = store.load();
        if document.ensure_default() {
            store.save(&document);
        }
        Self {
            document,
            store,
            image_sizing: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn persist(&self) {
        self.store.save(&self.document);
    }

    // --- Tabs ---

    pub fn add_tab(&mut self, name: &str) -> Tab {
        let tab = self.document.add_tab(name).clone();
        self.persist();
        tab
    }

    pub fn remove_tab(&mut self, id: &str) {
        self.document.remove_tab(id);
        self.persist();
    }

    pub fn rename_tab(&mut self, id: &str, name: &str) -> Result<()> {
        self.document.rename_tab(id, name)?;
        self.persist();
        Ok(())
    }

    pub fn reorder_tabs<I: AsRef<str>>(&mut self, order: &[I]) {
        self.document.reorder_tabs(order);
        self.persist();
    }

    pub fn select_tab(&mut self, id: &str) {
        self.document.set_active_tab(id);
        self.persist();
    }

    // --- Fields ---

    pub fn add_field(&mut self, tab_id: &str, kind: FieldKind, label: &str) -> Option<Field> {
        let field = self.document.add_field(tab_id, kind, label).cloned();
        if field.is_some() {
            self.persist();
        }
        field
    }

    pub fn remove_field(&mut self, tab_id: &str, field_id: &str) {
        self.document.remove_field(tab_id, field_id);
        self.image_sizing.remove(field_id);
        self.persist();
    }

    pub fn rename_field(&mut self, tab_id: &str, field_id: &str, label: &str) {
        self.document.rename_field(tab_id, field_id, label);
        self.persist();
    }

    pub fn set_field_value(&mut self, tab_id: &str, field_id: &str, value: impl Into<String>) {
        self.document.set_field_value(tab_id, field_id, value);
        self.persist();
    }

    pub fn reorder_fields<I: AsRef<str>>(&mut self, tab_id: &str, order: &[I]) {
        self.document.reorder_fields(tab_id, order);
        self.persist();
    }

    /// Clear a tab, honoring the `clearTabDeletesImages` setting.
    pub fn clear_tab(&mut self, tab_id: &str) {
        let delete_images = self.document.settings.clear_tab_deletes_images;
        self.document.clear_tab(tab_id, delete_images);
        self.persist();
    }

    // --- Templates ---

    /// Resolve the value of a field as a template against the whole
    /// document.
    pub fn resolve_template(&self, field_id: &str) -> Result<String> {
        let field = self
            .document
            .find_field(field_id)
            .ok_or_else(|| NoteableError::Api(format!("No field matches '{}'", field_id)))?;
        Ok(template::resolve(&field.value, &self.document.tabs))
    }

    /// Resolve arbitrary template text against the document.
    pub fn resolve_text(&self, text: &str) -> String {
        template::resolve(text, &self.document.tabs)
    }

    // --- Settings ---

    pub fn set_clear_tab_deletes_images(&mut self, value: bool) {
        self.document.settings.clear_tab_deletes_images = value;
        self.persist();
    }

    pub fn set_experimental(&mut self, value: bool) {
        self.document.settings.experimental = value;
        self.persist();
    }

    // --- Import / Export ---

    pub fn import_file(&mut self, path: &Path, mode: ImportMode) -> Result<commands::CmdResult> {
        let result = commands::import::run(&mut self.document, path, mode)?;
        self.persist();
        Ok(result)
    }

    pub fn import_text(&mut self, raw: &str, mode: ImportMode) -> Result<commands::CmdResult> {
        let result = commands::import::run_text(&mut self.document, raw, mode)?;
        self.persist();
        Ok(result)
    }

    pub fn export(&self, dir: &Path) -> Result<commands::CmdResult> {
        commands::export::run(&self.document, dir)
    }

    // --- Image geometry (renderer collaborator boundary) ---

    /// The renderer decoded an image field and knows its natural size.
    /// Persists dimensions only when the field had none (sticky geometry).
    pub fn image_loaded(&mut self, tab_id: &str, field_id: &str, natural_width: f64, natural_height: f64) {
        let dims = match self.document.find_field(field_id) {
            Some(field) if field.kind == FieldKind::Image => (field.width, field.height),
            _ => return,
        };
        let sizer = self
            .image_sizing
            .entry(field_id.to_string())
            .or_insert_with(|| ImageSizing::new(dims.0, dims.1));
        sizer.begin_hydration();
        if let Some((width, height)) = sizer.natural_size_known(natural_width, natural_height) {
            if let Some(field) = self.document.find_field_in_tab_mut(tab_id, field_id) {
                field.width = Some(width);
                field.height = Some(height);
                self.persist();
            }
        }
    }

    /// The renderer observed an external resize of an image field. Ignored
    /// until the field's geometry has settled.
    pub fn image_resized(&mut self, tab_id: &str, field_id: &str, width: f64, height: f64) {
        let sizer = match self.image_sizing.get_mut(field_id) {
            Some(sizer) => sizer,
            None => return,
        };
        if let Some((width, height)) = sizer.resized(width, height) {
            if let Some(field) = self.document.find_field_in_tab_mut(tab_id, field_id) {
                field.width = Some(width);
                field.height = Some(height);
                self.persist();
            }
        }
    }

    // --- Selectors ---

    /// Resolve a tab selector: exact id first, then exact name.
    pub fn resolve_tab(&self, selector: &str) -> Option<String> {
        if let Some(tab) = self.document.find_tab(selector) {
            return Some(tab.id.clone());
        }
        self.document
            .tabs
            .iter()
            .find(|t| t.name == selector)
            .map(|t| t.id.clone())
    }

    /// Resolve a field selector within a tab: exact id first, then exact
    /// label.
    pub fn resolve_field(&self, tab_id: &str, selector: &str) -> Option<String> {
        let tab = self.document.find_tab(tab_id)?;
        tab.fields
            .iter()
            .find(|f| f.id == selector)
            .or_else(|| tab.fields.iter().find(|f| f.label == selector))
            .map(|f| f.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemBackend;
    use crate::store::STORAGE_KEY;

    fn api() -> NoteableApi<MemBackend> {
        NoteableApi::load(DocumentStore::new(MemBackend::new()))
    }

    fn reload(api: &NoteableApi<MemBackend>) -> Document {
        // Read the persisted blob back independently of the live document.
        let raw = api.store.backend().read(STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_bootstrap_synthesizes_and_persists_default_tab() {
        let api = api();
        assert_eq!(api.document().tabs.len(), 1);
        assert_eq!(api.document().tabs[0].name, "Tab 1");
        assert_eq!(reload(&api), *api.document());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut api = api();
        let tab = api.add_tab("Work");
        assert_eq!(reload(&api).tabs.len(), 2);

        let field = api.add_field(&tab.id, FieldKind::Textarea, "Notes").unwrap();
        api.set_field_value(&tab.id, &field.id, "a\nb");
        assert_eq!(
            reload(&api).find_field(&field.id).unwrap().value,
            "a\nb"
        );

        api.rename_tab(&tab.id, "Projects").unwrap();
        assert_eq!(reload(&api).find_tab(&tab.id).unwrap().name, "Projects");

        api.remove_field(&tab.id, &field.id);
        assert!(reload(&api).find_field(&field.id).is_none());

        api.remove_tab(&tab.id);
        assert!(reload(&api).find_tab(&tab.id).is_none());
    }

    #[test]
    fn test_clear_tab_honors_setting() {
        let mut api = api();
        let tab = api.add_tab("Shots");
        api.add_field(&tab.id, FieldKind::Image, "Shot");

        api.clear_tab(&tab.id);
        assert!(api
            .document()
            .find_tab(&tab.id)
            .unwrap()
            .fields
            .iter()
            .any(|f| f.kind == FieldKind::Image));

        api.set_clear_tab_deletes_images(true);
        api.clear_tab(&tab.id);
        assert!(api
            .document()
            .find_tab(&tab.id)
            .unwrap()
            .fields
            .iter()
            .all(|f| f.kind != FieldKind::Image));
    }

    #[test]
    fn test_resolve_template_by_field_id() {
        let mut api = api();
        let tab = api.add_tab("Work");
        let title_id = api.document().find_tab(&tab.id).unwrap().fields[0].id.clone();
        api.set_field_value(&tab.id, &title_id, "Hello");

        let tmpl = api
            .add_field(&tab.id, FieldKind::Template, "Tmpl")
            .unwrap();
        api.set_field_value(&tab.id, &tmpl.id, "Title is $(Title)");

        assert_eq!(api.resolve_template(&tmpl.id).unwrap(), "Title is Hello");
        assert!(api.resolve_template("f_ghost").is_err());
    }

    #[test]
    fn test_image_geometry_flow() {
        let mut api = api();
        let tab = api.add_tab("Shots");
        let img = api.add_field(&tab.id, FieldKind::Image, "Shot").unwrap();

        // Resize before hydration is ignored.
        api.image_resized(&tab.id, &img.id, 10.0, 10.0);
        assert_eq!(api.document().find_field(&img.id).unwrap().width, None);

        // First load adopts the natural size and persists it.
        api.image_loaded(&tab.id, &img.id, 640.0, 480.0);
        let field = api.document().find_field(&img.id).unwrap();
        assert_eq!(field.width, Some(640.0));
        assert_eq!(field.height, Some(480.0));
        assert_eq!(reload(&api).find_field(&img.id).unwrap().width, Some(640.0));

        // Settled: an observed resize persists.
        api.image_resized(&tab.id, &img.id, 320.0, 240.0);
        assert_eq!(reload(&api).find_field(&img.id).unwrap().width, Some(320.0));

        // A later reload must not clobber the resized dimensions.
        api.image_loaded(&tab.id, &img.id, 640.0, 480.0);
        assert_eq!(api.document().find_field(&img.id).unwrap().width, Some(320.0));
    }

    #[test]
    fn test_geometry_events_ignore_non_image_fields() {
        let mut api = api();
        let tab = api.add_tab("Work");
        let field = api.add_field(&tab.id, FieldKind::Label, "Host").unwrap();
        api.image_loaded(&tab.id, &field.id, 640.0, 480.0);
        assert_eq!(api.document().find_field(&field.id).unwrap().width, None);
    }

    #[test]
    fn test_import_and_export_through_api() {
        let mut api = api();
        api.import_text(r#"{"tabs": [{"name": "In"}]}"#, ImportMode::Merge)
            .unwrap();
        assert_eq!(api.document().tabs.len(), 2);
        assert_eq!(reload(&api).tabs.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let result = api.export(dir.path()).unwrap();
        assert!(result.paths[0].exists());
    }

    #[test]
    fn test_selectors_resolve_ids_names_and_labels() {
        let mut api = api();
        let tab = api.add_tab("Work");
        let field = api.add_field(&tab.id, FieldKind::Label, "Host").unwrap();

        assert_eq!(api.resolve_tab(&tab.id).as_deref(), Some(tab.id.as_str()));
        assert_eq!(api.resolve_tab("Work").as_deref(), Some(tab.id.as_str()));
        assert_eq!(api.resolve_tab("Nope"), None);

        assert_eq!(
            api.resolve_field(&tab.id, &field.id).as_deref(),
            Some(field.id.as_str())
        );
        assert_eq!(
            api.resolve_field(&tab.id, "Host").as_deref(),
            Some(field.id.as_str())
        );
        assert_eq!(api.resolve_field(&tab.id, "Nope"), None);
    }

    #[test]
    fn test_resolve_text_and_active_tab() {
        let mut api = api();
        let tab = api.add_tab("Work");
        let title_id = api.document().find_tab(&tab.id).unwrap().fields[0].id.clone();
        api.set_field_value(&tab.id, &title_id, "Hello");

        assert_eq!(api.resolve_text("[$(Work.Title)]"), "[Hello]");
        assert_eq!(api.document().active_tab().unwrap().id, tab.id);
    }

    #[test]
    fn test_settings_persist() {
        let mut api = api();
        api.set_experimental(true);
        let loaded = reload(&api);
        assert!(loaded.settings.experimental);
        assert!(!loaded.settings.clear_tab_deletes_images);
    }
}
