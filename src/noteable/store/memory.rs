use super::backend::StorageBackend;
use crate::error::{NoteableError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory backend for testing logic without filesystem I/O.
#[derive(Default)]
pub struct MemBackend {
    records: Mutex<HashMap<String, String>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.records
            .lock()
            .map_err(|_| NoteableError::Store("backend lock poisoned".to_string()))
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}
