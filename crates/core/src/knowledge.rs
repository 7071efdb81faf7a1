//! Knowledge store trait — the uniform contract over storage backends.
//!
//! The archive's knowledge lives either in a local JSON file (a flat map
//! of entries) or in the provider's hosted vector store (a catalog of
//! ingested files). Callers depend only on this trait; the backend is
//! selected from configuration at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::KnowledgeError;

/// The knowledge mapping: unique string keys to string or structured
/// values. Insertion order is irrelevant; `serde_json::Map` keeps keys
/// sorted, which also makes context compaction deterministic.
pub type KnowledgeMap = serde_json::Map<String, serde_json::Value>;

/// Identifier of a file in the hosted catalog (assigned by the provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileId(pub String);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for one file in the hosted catalog.
///
/// Every field except the id is optional — the listing endpoint has
/// dropped and renamed fields across provider versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,

    /// Unix timestamp of ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    /// Ingestion status: "in_progress", "completed", "failed", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Aggregate view of the hosted catalog: file list plus counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInfo {
    pub store_id: String,
    pub file_count: u64,
    pub completed_count: u64,

    /// Newest `created_at` across all listed files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_created_at: Option<i64>,

    pub files: Vec<FileMetadata>,
}

/// Uniform read/write contract over knowledge backends.
///
/// The local-file backend implements only `read`/`write`; catalog
/// operations fall through to the `Unsupported` defaults. The hosted
/// backend overrides everything and treats `write` as a no-op kept for
/// interface compatibility.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Backend name for logs and the `doctor` command.
    fn name(&self) -> &'static str;

    /// Read the full knowledge mapping.
    ///
    /// The local backend never fails this call — unreadable or corrupt
    /// files come back as an empty map. The hosted backend propagates
    /// listing failures, since there is nothing sensible to fall back to.
    async fn read(&self) -> Result<KnowledgeMap, KnowledgeError>;

    /// Overwrite the knowledge mapping. Last write wins; no locking.
    async fn write(&self, map: &KnowledgeMap) -> Result<(), KnowledgeError>;

    /// List the hosted catalog with aggregate counts.
    async fn catalog(&self) -> Result<CatalogInfo, KnowledgeError> {
        Err(KnowledgeError::Unsupported {
            backend: self.name(),
            operation: "catalog",
        })
    }

    /// Upload a text blob as a new catalog file and attach it to the store.
    async fn add_text_file(
        &self,
        _filename: &str,
        _text: &str,
    ) -> Result<FileId, KnowledgeError> {
        Err(KnowledgeError::Unsupported {
            backend: self.name(),
            operation: "add_text_file",
        })
    }

    /// Detach a file from the store by identifier.
    async fn delete_file(&self, _file_id: &str) -> Result<(), KnowledgeError> {
        Err(KnowledgeError::Unsupported {
            backend: self.name(),
            operation: "delete_file",
        })
    }

    /// Download a bounded text preview of the catalog for the UI.
    ///
    /// Per-file failures are skipped — one unreadable file never fails
    /// the whole preview.
    async fn preview(&self, _max_bytes: usize) -> Result<String, KnowledgeError> {
        Err(KnowledgeError::Unsupported {
            backend: self.name(),
            operation: "preview",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapOnly;

    #[async_trait]
    impl KnowledgeStore for MapOnly {
        fn name(&self) -> &'static str {
            "map-only"
        }
        async fn read(&self) -> Result<KnowledgeMap, KnowledgeError> {
            Ok(KnowledgeMap::new())
        }
        async fn write(&self, _map: &KnowledgeMap) -> Result<(), KnowledgeError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn catalog_defaults_to_unsupported() {
        let store = MapOnly;
        let err = store.catalog().await.unwrap_err();
        assert!(matches!(err, KnowledgeError::Unsupported { .. }));
        assert!(err.to_string().contains("map-only"));
    }

    #[test]
    fn file_metadata_tolerates_missing_fields() {
        let meta: FileMetadata = serde_json::from_str(r#"{"id":"file-1"}"#).unwrap();
        assert_eq!(meta.id, "file-1");
        assert!(meta.filename.is_none());
        assert!(meta.status.is_none());
    }
}
