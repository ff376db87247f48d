//! File-based key-value storage for GradePal.
//!
//! Each key is stored as a JSON file in the data directory
//! (`~/.gradepal/data/` by default). Atomic writes are achieved via temp
//! file + rename pattern.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{data_dir, StorageConfig};
use crate::error::{GradepalError, Result};
use crate::storage::KeyValueStore;
use crate::util::read_to_string_limited;

/// File-based key-value storage.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    /// Directory where value files are stored.
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store with the default directory.
    ///
    /// Uses `~/.gradepal/data/` or `$GRADEPAL_HOME/data/`.
    pub fn new() -> Result<Self> {
        let dir = data_dir().ok_or_else(|| {
            GradepalError::config("Could not determine data directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a new file store with a custom directory.
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| GradepalError::storage(&data_dir, e))?;
        }

        Ok(Self { data_dir })
    }

    /// The directory holding the value files.
    pub fn dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the path for a key's value file.
    fn value_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!(".{}.json.tmp", key))
    }
}

/// Keys become file names, so they must stay inside the data directory.
fn check_key(key: &str) -> Result<()> {
    if StorageConfig::is_valid_key(key) {
        Ok(())
    } else {
        Err(GradepalError::config(format!(
            "invalid storage key '{}': use letters, digits, '-', '_' or '.'",
            key
        )))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        read_to_string_limited(&path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let final_path = self.value_path(key)?;
        let temp_path = self.temp_path(key);

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| GradepalError::storage(&temp_path, e))?;
            file.write_all(value.as_bytes())
                .map_err(|e| GradepalError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| GradepalError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path)
            .map_err(|e| GradepalError::storage(&final_path, e))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(GradepalError::storage(&path, e)),
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(key);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::test_key_value_store_contract;
    use tempfile::TempDir;

    fn create_test_store() -> (FileKeyValueStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::with_dir(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_file_store_contract() {
        let (store, _dir) = create_test_store();
        test_key_value_store_contract(&store);
    }

    #[test]
    fn test_with_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("data");

        assert!(!data_path.exists());

        let store = FileKeyValueStore::with_dir(&data_path).unwrap();

        assert!(data_path.is_dir());
        assert_eq!(store.dir(), data_path.as_path());
    }

    #[test]
    fn test_value_path() {
        let (store, _dir) = create_test_store();
        let path = store.value_path("gradepal-courses").unwrap();
        assert!(path.ends_with("gradepal-courses.json"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (store, _dir) = create_test_store();

        for key in ["", "../escape", "a/b", ".hidden", "with space"] {
            assert!(store.get(key).is_err(), "key {:?} should be rejected", key);
            assert!(store.set(key, "x").is_err());
        }
    }

    #[test]
    fn test_set_writes_value_verbatim() {
        let (store, dir) = create_test_store();

        store.set("courses", r#"[{"id":"c1"}]"#).unwrap();

        let content = fs::read_to_string(dir.path().join("courses.json")).unwrap();
        assert_eq!(content, r#"[{"id":"c1"}]"#);
    }

    #[test]
    fn test_temp_file_cleaned_up() {
        let (store, _dir) = create_test_store();

        store.set("courses", "[]").unwrap();

        assert!(!store.temp_path("courses").exists());
    }

    #[test]
    fn test_remove_cleans_stale_temp_file() {
        let (store, _dir) = create_test_store();

        store.set("courses", "[]").unwrap();
        fs::write(store.temp_path("courses"), "partial").unwrap();

        store.remove("courses").unwrap();

        assert!(!store.temp_path("courses").exists());
        assert!(store.get("courses").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();

        FileKeyValueStore::with_dir(dir.path())
            .unwrap()
            .set("courses", "[1,2,3]")
            .unwrap();

        let reopened = FileKeyValueStore::with_dir(dir.path()).unwrap();
        assert_eq!(reopened.get("courses").unwrap().as_deref(), Some("[1,2,3]"));
    }
}
