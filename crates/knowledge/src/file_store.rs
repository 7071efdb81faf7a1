//! File-based knowledge store — one JSON object on disk.
//!
//! Reads never fail: an unreadable or corrupt file comes back as an empty
//! map so a broken deployment degrades to "archive is empty" instead of
//! erroring every chat request. Writes serialize the whole map as pretty
//! JSON; concurrent writers race with last-write-wins, no locking.
//!
//! Two override layers sit on top of the primary file:
//! - an **ephemeral path**: when it exists and is non-empty it shadows the
//!   primary for reads and receives all writes, keeping the checked-in
//!   file pristine across runtime edits;
//! - a **raw JSON override** (the `KB_JSON` environment value): parsed as
//!   an object and merged key-by-key on top of file-sourced values.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use gaian_core::{KnowledgeError, KnowledgeMap, KnowledgeStore};

/// A knowledge store backed by a local JSON file.
pub struct FileStore {
    primary: PathBuf,
    ephemeral: Option<PathBuf>,
    json_override: Option<String>,
}

impl FileStore {
    /// Create a new file store.
    ///
    /// Nothing is touched on disk until the first read or write.
    pub fn new(
        primary: PathBuf,
        ephemeral: Option<PathBuf>,
        json_override: Option<String>,
    ) -> Self {
        Self {
            primary,
            ephemeral,
            json_override,
        }
    }

    /// The path reads resolve against right now.
    fn read_path(&self) -> &Path {
        if let Some(ephemeral) = &self.ephemeral
            && std::fs::metadata(ephemeral).map(|m| m.len() > 0).unwrap_or(false)
        {
            return ephemeral;
        }
        &self.primary
    }

    /// The path writes go to: the ephemeral file when configured.
    fn write_path(&self) -> &Path {
        self.ephemeral.as_deref().unwrap_or(&self.primary)
    }

    /// Parse a JSON object from `path`; anything else yields an empty map.
    fn load_map(path: &Path) -> KnowledgeMap {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return KnowledgeMap::new(), // Missing file — start empty
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %path.display(), "Knowledge file is not a JSON object, treating as empty");
                KnowledgeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Knowledge file unparseable, treating as empty");
                KnowledgeMap::new()
            }
        }
    }

    /// Merge the raw JSON override on top of `map`, key by key.
    fn apply_override(&self, map: &mut KnowledgeMap) {
        let Some(raw) = &self.json_override else {
            return;
        };
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(overrides)) => {
                for (key, value) in overrides {
                    map.insert(key, value);
                }
            }
            _ => warn!("KB_JSON override is not a JSON object, ignoring"),
        }
    }
}

#[async_trait]
impl KnowledgeStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read(&self) -> Result<KnowledgeMap, KnowledgeError> {
        let path = self.read_path();
        let mut map = Self::load_map(path);
        debug!(path = %path.display(), entries = map.len(), "Knowledge map loaded");
        self.apply_override(&mut map);
        Ok(map)
    }

    async fn write(&self, map: &KnowledgeMap) -> Result<(), KnowledgeError> {
        let path = self.write_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                KnowledgeError::Storage(format!("Failed to create knowledge directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(map)
            .map_err(|e| KnowledgeError::Storage(format!("Failed to serialize knowledge map: {e}")))?;

        std::fs::write(path, content).map_err(|e| {
            KnowledgeError::Storage(format!("Failed to write knowledge file: {e}"))
        })?;

        debug!(path = %path.display(), entries = map.len(), "Knowledge map written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn entry_map(pairs: &[(&str, serde_json::Value)]) -> KnowledgeMap {
        let mut map = KnowledgeMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        map
    }

    #[tokio::test]
    async fn write_then_read_roundtrips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("kb.json"), None, None);

        let map = entry_map(&[("hours", json!("9-5")), ("tiers", json!({"pro": 10}))]);
        store.write(&map).await.unwrap();

        assert_eq!(store.read().await.unwrap(), map);
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_map() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nope.json"), None, None);
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let store = FileStore::new(path, None, None);
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_object_file_reads_as_empty_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, r#"["a", "list"]"#).unwrap();

        let store = FileStore::new(path, None, None);
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn env_override_takes_precedence_over_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, r#"{"hours": "9-5", "motto": "grow"}"#).unwrap();

        let store = FileStore::new(
            path,
            None,
            Some(r#"{"hours": "24/7", "extra": true}"#.into()),
        );
        let map = store.read().await.unwrap();

        assert_eq!(map["hours"], json!("24/7")); // override wins
        assert_eq!(map["motto"], json!("grow")); // file value survives
        assert_eq!(map["extra"], json!(true)); // override-only key added
    }

    #[tokio::test]
    async fn malformed_override_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, r#"{"hours": "9-5"}"#).unwrap();

        let store = FileStore::new(path, None, Some("][".into()));
        assert_eq!(store.read().await.unwrap()["hours"], json!("9-5"));
    }

    #[tokio::test]
    async fn nonempty_ephemeral_file_shadows_primary() {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("kb.json");
        let ephemeral = dir.path().join("kb.runtime.json");
        std::fs::write(&primary, r#"{"source": "primary"}"#).unwrap();
        std::fs::write(&ephemeral, r#"{"source": "ephemeral"}"#).unwrap();

        let store = FileStore::new(primary, Some(ephemeral), None);
        assert_eq!(store.read().await.unwrap()["source"], json!("ephemeral"));
    }

    #[tokio::test]
    async fn empty_ephemeral_file_falls_back_to_primary() {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("kb.json");
        let ephemeral = dir.path().join("kb.runtime.json");
        std::fs::write(&primary, r#"{"source": "primary"}"#).unwrap();
        std::fs::write(&ephemeral, "").unwrap();

        let store = FileStore::new(primary, Some(ephemeral), None);
        assert_eq!(store.read().await.unwrap()["source"], json!("primary"));
    }

    #[tokio::test]
    async fn writes_land_in_ephemeral_path_when_configured() {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("kb.json");
        let ephemeral = dir.path().join("kb.runtime.json");
        std::fs::write(&primary, r#"{"source": "primary"}"#).unwrap();

        let store = FileStore::new(primary.clone(), Some(ephemeral.clone()), None);
        store
            .write(&entry_map(&[("source", json!("edited"))]))
            .await
            .unwrap();

        // Primary stays pristine; the edit lives in the ephemeral file.
        assert_eq!(
            std::fs::read_to_string(&primary).unwrap(),
            r#"{"source": "primary"}"#
        );
        assert!(std::fs::read_to_string(&ephemeral).unwrap().contains("edited"));
        assert_eq!(store.read().await.unwrap()["source"], json!("edited"));
    }

    #[tokio::test]
    async fn catalog_operations_are_unsupported() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("kb.json"), None, None);
        assert!(matches!(
            store.catalog().await.unwrap_err(),
            KnowledgeError::Unsupported { .. }
        ));
        assert!(store.add_text_file("f.txt", "text").await.is_err());
    }
}
