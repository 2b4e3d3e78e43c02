use super::backend::StorageBackend;
use crate::error::{NoteableError, Result};
use crate::ident::new_id;
use std::fs;
use std::path::PathBuf;

/// Filesystem backend: one JSON file per key under a root directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(NoteableError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(NoteableError::Io)?;
        Ok(Some(content))
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        self.ensure_dir()?;

        let target = self.key_path(key);

        // Atomic write
        let tmp = self.root.join(format!(".{}.tmp", new_id(key)));
        fs::write(&tmp, payload).map_err(NoteableError::Io)?;
        fs::rename(&tmp, target).map_err(NoteableError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        assert_eq!(backend.read("notebook.v1").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        backend.write("notebook.v1", "{\"tabs\":[]}").unwrap();
        assert_eq!(
            backend.read("notebook.v1").unwrap().as_deref(),
            Some("{\"tabs\":[]}")
        );
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        backend.write("k", "first").unwrap();
        backend.write("k", "second").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_creates_missing_root_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let backend = FsBackend::new(nested);
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_leaves_no_tmp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        backend.write("k", "v").unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }
}
