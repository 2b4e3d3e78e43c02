//! # Storage Layer
//!
//! The persistence gateway for the document. The [`StorageBackend`] trait
//! abstracts raw blob I/O; [`DocumentStore`] owns the encoding, the storage
//! key, and the degradation rules.
//!
//! ## Philosophy
//!
//! Persistence must never get in the user's way:
//!
//! - **Load never fails.** A missing blob, a corrupt blob, or a backend
//!   error all degrade to an empty document (the caller re-establishes the
//!   default-tab invariant). The failure is logged, not raised.
//! - **Save never fails the caller.** The write happens synchronously after
//!   every mutation, but errors (quota, disabled storage) are logged and
//!   swallowed. A save failure must never crash or block a UI action.
//! - **Settings are merged, not replaced.** Recognized keys absent from an
//!   older blob pick up their defaults; unrecognized keys written by a newer
//!   build are carried through untouched.
//!
//! ## Storage Layout
//!
//! The whole document is one JSON blob under the fixed key
//! [`STORAGE_KEY`]. For [`fs::FsBackend`] that means:
//!
//! ```text
//! <data dir>/
//! └── notebook.v1.json    # the entire document
//! ```
//!
//! ## Implementations
//!
//! - [`fs::FsBackend`]: production, atomic tmp-then-rename writes.
//! - [`memory::MemBackend`]: for testing without filesystem I/O.

use crate::model::Document;

pub mod backend;
pub mod fs;
pub mod memory;

pub use backend::StorageBackend;

/// The fixed key the document blob lives under.
pub const STORAGE_KEY: &str = "notebook.v1";

/// Serializes and deserializes the document against a storage backend.
pub struct DocumentStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> DocumentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the document. Degrades to an empty document on any failure;
    /// the caller is responsible for `ensure_default` afterwards.
    pub fn load(&self) -> Document {
        let raw = match self.backend.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Document::default(),
            Err(e) => {
                log::error!("failed to read stored document: {}", e);
                return Document::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                log::error!("discarding unreadable document blob: {}", e);
                Document::default()
            }
        }
    }

    /// Persist the whole document, overwriting prior content. Failures are
    /// logged and swallowed.
    pub fn save(&self, document: &Document) {
        let payload = match serde_json::to_string(document) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("failed to encode document: {}", e);
                return;
            }
        };
        if let Err(e) = self.backend.write(STORAGE_KEY, &payload) {
            log::error!("failed to save document: {}", e);
        }
    }
}
