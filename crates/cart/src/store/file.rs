//! Directory-backed store, one file per key.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CartStore, StoreError};

/// Store that keeps each key in its own JSON file under a directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File that holds `key`.
    ///
    /// ASCII letters, digits, `.` and `-` are kept as is. Every other byte of
    /// the key, `_` included, is written as `_XX` in uppercase hex, so distinct
    /// keys never share a file: `@RocketShoes:cart` lives in
    /// `_40RocketShoes_3Acart.json`.
    ///
    /// # Errors
    ///
    /// Returns error if the key is empty.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
                name.push(char::from(byte));
            } else {
                let _ = write!(name, "_{byte:02X}");
            }
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl CartStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))?;

        debug!(path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_escapes_key() {
        let store = FileStore::new("/tmp/cart");
        let path = store.path_for("@RocketShoes:cart").expect("path");
        assert_eq!(path, PathBuf::from("/tmp/cart/_40RocketShoes_3Acart.json"));

        let path = store.path_for("../cart").expect("path");
        assert_eq!(path, PathBuf::from("/tmp/cart/.._2Fcart.json"));

        assert!(matches!(
            store.path_for(""),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_similar_keys_get_distinct_files() {
        let store = FileStore::new("/tmp/cart");
        let paths: Vec<PathBuf> = ["a:b", "a_b", "a_3Ab", "a?b", "ação"]
            .iter()
            .map(|key| store.path_for(key).expect("path"))
            .collect();

        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(paths[1], PathBuf::from("/tmp/cart/a_5Fb.json"));
        assert_eq!(paths[2], PathBuf::from("/tmp/cart/a_5F3Ab.json"));
    }

    #[test]
    fn test_distinct_keys_do_not_overwrite_each_other() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        store.write("a:b", "[1]").expect("write a:b");
        store.write("a_b", "[2]").expect("write a_b");

        assert_eq!(store.read("a:b").expect("read").as_deref(), Some("[1]"));
        assert_eq!(store.read("a_b").expect("read").as_deref(), Some("[2]"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.read("cart").expect("read"), None);

        store.write("cart", "[]").expect("first write");
        store.write("cart", "[1]").expect("second write");
        assert_eq!(store.read("cart").expect("read").as_deref(), Some("[1]"));
        assert!(!dir.path().join("nested/cart.json.tmp").exists());
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("create blocker");

        let store = FileStore::new(&blocker);
        assert!(matches!(
            store.write("cart", "[]"),
            Err(StoreError::Io { .. })
        ));
    }
}
