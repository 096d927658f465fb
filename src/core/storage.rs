// ─── JSON Storage ───
// Whole-file JSON persistence shared by the account and preference stores.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Read and parse a JSON file. Missing, unreadable and malformed files all
/// come back as `None`; callers substitute their own default.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            debug!("Cannot read {:?}: {}", path, err);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("Ignoring unreadable JSON at {:?}: {}", path, err);
            None
        }
    }
}

/// Replace `path` with the pretty-printed JSON of `value`.
///
/// Writes a sibling temp file, syncs it and renames it over the target, so a
/// reader sees either the old or the new document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> LauncherResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| LauncherError::Other(format!("{path:?} has no parent directory")))?;
    std::fs::create_dir_all(parent).map_err(LauncherError::io(parent))?;

    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = std::fs::File::create(&tmp_path).map_err(LauncherError::io(&tmp_path))?;
        file.write_all(json.as_bytes())
            .map_err(LauncherError::io(&tmp_path))?;
        file.sync_all().map_err(LauncherError::io(&tmp_path))?;
    }

    std::fs::rename(&tmp_path, path).map_err(LauncherError::io(path))
}

/// Delete `path` if it exists.
pub fn remove_file_if_exists(path: &Path) -> LauncherResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LauncherError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_and_leaves_no_temp_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("data.json");

        write_json_atomic(&path, &serde_json::json!({"a": 1})).unwrap();

        let back: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(back["a"], 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn read_absorbs_missing_and_malformed_files() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("data.json");
        assert!(read_json::<serde_json::Value>(&path).is_none());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(read_json::<serde_json::Value>(&path).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("data.json");
        std::fs::write(&path, "{}").unwrap();

        remove_file_if_exists(&path).unwrap();
        remove_file_if_exists(&path).unwrap();
        assert!(!path.exists());
    }
}
