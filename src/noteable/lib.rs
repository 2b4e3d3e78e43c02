//! # Noteable Architecture
//!
//! Noteable is a **UI-agnostic note-keeping library**: tabs of typed fields
//! with template expansion, persisted as a single document blob. The CLI is
//! just one client; the core makes no I/O assumptions.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Facade (api.rs)                                        │
//! │  - Owns the one Document and the DocumentStore              │
//! │  - Serializes all mutations, persists after each            │
//! │  - Resolves friendly selectors (names/labels) to ids        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (model.rs, template.rs, import.rs, geometry.rs)       │
//! │  - Pure domain logic, no I/O                                │
//! │  - commands/*.rs for the file-shaped operations             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract StorageBackend trait                            │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Posture
//!
//! Nothing in this core may crash the process or corrupt the in-memory
//! document. Validation failures (import shape, blank tab rename) are
//! recovered at the boundary where they occur; persistence failures are
//! logged and swallowed; template resolution never errors at all, since
//! stale references degrade to empty strings.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, the entry point for all operations
//! - [`model`]: Core data types and structural operations
//! - [`template`]: Placeholder resolution for template fields
//! - [`import`]: Normalization of untrusted import payloads
//! - [`geometry`]: Image sizing state machine
//! - [`commands`]: Import/export business logic with structured results
//! - [`store`]: Storage abstraction and implementations
//! - [`ident`]: Identifier generation
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod error;
pub mod geometry;
pub mod ident;
pub mod import;
pub mod model;
pub mod store;
pub mod template;
