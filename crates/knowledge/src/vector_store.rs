//! Hosted vector-store knowledge backend.
//!
//! Entries are files attached to a provider-side vector store; retrieval
//! for answers happens through the synthesis crate's file_search tool.
//! This backend only manages the catalog: listing with cursor pagination,
//! uploading/attaching text files, detaching by id, and a small text
//! preview for the UI.
//!
//! No local persistence — `write` is a no-op kept for interface
//! compatibility, and `read` returns a summary map of the catalog so
//! both backends can serve the same endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use gaian_core::{CatalogInfo, FileId, FileMetadata, KnowledgeError, KnowledgeMap, KnowledgeStore};

/// Hard cap on how many catalog files one listing accumulates.
const MAX_CATALOG_FILES: usize = 1000;
/// Page size for the listing endpoint.
const PAGE_LIMIT: usize = 100;
/// How many files the preview samples.
const PREVIEW_FILES: usize = 10;

/// A knowledge store backed by the provider's hosted vector store.
pub struct VectorStore {
    store_id: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl VectorStore {
    /// Create a new hosted-catalog store.
    pub fn new(api_key: impl Into<String>, base_url: &str, store_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            store_id: store_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Map a non-success response to an error carrying the provider's
    /// own message when one can be parsed out of the body.
    async fn api_error(response: reqwest::Response) -> KnowledgeError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(body);
        warn!(status, message = %message, "Catalog request failed");
        KnowledgeError::ApiError {
            status_code: status,
            message,
        }
    }

    /// Page through the file listing until the provider runs out of
    /// pages or the accumulation cap is hit.
    async fn list_all_files(&self) -> Result<Vec<FileMetadata>, KnowledgeError> {
        let mut files: Vec<FileMetadata> = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/vector_stores/{}/files?limit={PAGE_LIMIT}",
                self.base_url, self.store_id
            );
            if let Some(cursor) = &after {
                url.push_str(&format!("&after={cursor}"));
            }

            let response = self
                .auth(self.client.get(&url))
                .send()
                .await
                .map_err(|e| KnowledgeError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }

            let page: FileListResponse = response
                .json()
                .await
                .map_err(|e| KnowledgeError::Network(format!("Failed to parse file list: {e}")))?;

            files.extend(page.data.into_iter().map(ApiFileEntry::into_metadata));

            if files.len() >= MAX_CATALOG_FILES {
                files.truncate(MAX_CATALOG_FILES);
                break;
            }

            match (page.has_more, page.last_id, files.last().map(|f| f.id.clone())) {
                (true, Some(last), _) => after = Some(last),
                (true, None, Some(last)) => after = Some(last),
                _ => break,
            }
        }

        Ok(files)
    }

    /// Retrieve store-level aggregate counts.
    async fn retrieve_counts(&self) -> Result<Option<FileCounts>, KnowledgeError> {
        let url = format!("{}/vector_stores/{}", self.base_url, self.store_id);
        let response = self
            .auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let store: StoreResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::Network(format!("Failed to parse store: {e}")))?;

        Ok(store.file_counts)
    }
}

#[async_trait]
impl KnowledgeStore for VectorStore {
    fn name(&self) -> &'static str {
        "vector"
    }

    /// Back-compat shim: summarize the catalog as a map so the knowledge
    /// endpoint can serve either backend through one trait object.
    async fn read(&self) -> Result<KnowledgeMap, KnowledgeError> {
        let info = self.catalog().await?;

        let mut map = KnowledgeMap::new();
        map.insert("_source".into(), "vector_store".into());
        map.insert("storeId".into(), info.store_id.clone().into());
        map.insert("fileCount".into(), info.file_count.into());
        map.insert("completedCount".into(), info.completed_count.into());
        if let Some(ts) = info.latest_created_at {
            map.insert("latestCreatedAt".into(), ts.into());
        }
        map.insert("files".into(), serde_json::to_value(&info.files).unwrap_or_default());
        Ok(map)
    }

    /// Knowledge lives provider-side; nothing to persist locally.
    async fn write(&self, _map: &KnowledgeMap) -> Result<(), KnowledgeError> {
        debug!(store = %self.store_id, "write() is a no-op on the vector backend");
        Ok(())
    }

    async fn catalog(&self) -> Result<CatalogInfo, KnowledgeError> {
        let files = self.list_all_files().await?;
        let counts = self.retrieve_counts().await?;

        let latest_created_at = files.iter().filter_map(|f| f.created_at).max();

        Ok(CatalogInfo {
            store_id: self.store_id.clone(),
            file_count: counts
                .as_ref()
                .map(|c| c.total)
                .unwrap_or(files.len() as u64),
            completed_count: counts.as_ref().map(|c| c.completed).unwrap_or(0),
            latest_created_at,
            files,
        })
    }

    async fn add_text_file(&self, filename: &str, text: &str) -> Result<FileId, KnowledgeError> {
        // 1) create a file under the 'assistants' purpose
        let part = reqwest::multipart::Part::text(text.to_string())
            .file_name(filename.to_string())
            .mime_str("text/plain")
            .map_err(|e| KnowledgeError::Storage(format!("Invalid upload part: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);

        let url = format!("{}/files", self.base_url);
        let response = self
            .auth(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let uploaded: UploadedFile = response
            .json()
            .await
            .map_err(|e| KnowledgeError::Network(format!("Failed to parse upload response: {e}")))?;

        // 2) attach it to the store
        let url = format!("{}/vector_stores/{}/files", self.base_url, self.store_id);
        let response = self
            .auth(self.client.post(&url))
            .json(&serde_json::json!({ "file_id": uploaded.id }))
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        debug!(file_id = %uploaded.id, filename, "Text file attached to vector store");
        Ok(FileId(uploaded.id))
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), KnowledgeError> {
        let url = format!(
            "{}/vector_stores/{}/files/{file_id}",
            self.base_url, self.store_id
        );
        let response = self
            .auth(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        debug!(file_id, "File detached from vector store");
        Ok(())
    }

    /// Concatenate small text previews from the first few catalog files.
    /// A file that fails to download is skipped, never fatal.
    async fn preview(&self, max_bytes: usize) -> Result<String, KnowledgeError> {
        let url = format!(
            "{}/vector_stores/{}/files?limit={PREVIEW_FILES}",
            self.base_url, self.store_id
        );
        let response = self
            .auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let page: FileListResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::Network(format!("Failed to parse file list: {e}")))?;

        let mut acc = String::new();
        for entry in page.data {
            let content_url = format!("{}/files/{}/content", self.base_url, entry.id);
            let content = match self.auth(self.client.get(&content_url)).send().await {
                Ok(r) if r.status().is_success() => match r.text().await {
                    Ok(t) => t,
                    Err(_) => continue,
                },
                // Non-text or restricted file — skip without failing the preview
                _ => continue,
            };

            let label = entry.filename.clone().unwrap_or_else(|| entry.id.clone());
            acc.push_str(&format!("\n\n=== {label} ===\n"));
            acc.push_str(&content);
            if acc.len() >= max_bytes {
                break;
            }
        }

        Ok(clip_preview(acc, max_bytes))
    }
}

/// Clip the accumulated preview to the byte budget without splitting a
/// UTF-8 character, marking the cut.
fn clip_preview(mut acc: String, max_bytes: usize) -> String {
    if acc.len() > max_bytes {
        let mut cut = max_bytes;
        while !acc.is_char_boundary(cut) {
            cut -= 1;
        }
        acc.truncate(cut);
        acc.push_str("\n... [truncated]");
    }
    acc.trim().to_string()
}

// --- Catalog API types (internal) ---

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    data: Vec<ApiFileEntry>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiFileEntry {
    id: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default, alias = "usage_bytes")]
    bytes: Option<u64>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    status: Option<String>,
}

impl ApiFileEntry {
    fn into_metadata(self) -> FileMetadata {
        FileMetadata {
            id: self.id,
            filename: self.filename,
            bytes: self.bytes,
            created_at: self.created_at,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoreResponse {
    #[serde(default)]
    file_counts: Option<FileCounts>,
}

#[derive(Debug, Deserialize)]
struct FileCounts {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    completed: u64,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_file_list_page() {
        let data = r#"{
            "data": [
                {"id": "file-1", "filename": "soils.txt", "usage_bytes": 412, "created_at": 1722000000, "status": "completed"},
                {"id": "file-2", "status": "in_progress"}
            ],
            "has_more": true,
            "last_id": "file-2"
        }"#;
        let page: FileListResponse = serde_json::from_str(data).unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.last_id.as_deref(), Some("file-2"));

        let meta = page.data.into_iter().next().unwrap().into_metadata();
        assert_eq!(meta.filename.as_deref(), Some("soils.txt"));
        assert_eq!(meta.bytes, Some(412));
        assert_eq!(meta.status.as_deref(), Some("completed"));
    }

    #[test]
    fn parse_file_list_without_pagination_fields() {
        let page: FileListResponse =
            serde_json::from_str(r#"{"data": [{"id": "file-1"}]}"#).unwrap();
        assert!(!page.has_more);
        assert!(page.last_id.is_none());
    }

    #[test]
    fn parse_store_counts() {
        let data = r#"{"id": "vs_1", "file_counts": {"total": 12, "completed": 10, "failed": 2}}"#;
        let store: StoreResponse = serde_json::from_str(data).unwrap();
        let counts = store.file_counts.unwrap();
        assert_eq!(counts.total, 12);
        assert_eq!(counts.completed, 10);
    }

    #[test]
    fn parse_store_without_counts() {
        let store: StoreResponse = serde_json::from_str(r#"{"id": "vs_1"}"#).unwrap();
        assert!(store.file_counts.is_none());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let store = VectorStore::new("sk-test", "https://api.openai.com/v1/", "vs_1");
        assert_eq!(store.base_url, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn write_is_a_noop() {
        let store = VectorStore::new("sk-test", "https://api.openai.com/v1", "vs_1");
        assert!(store.write(&KnowledgeMap::new()).await.is_ok());
    }

    #[test]
    fn preview_clip_under_budget_is_untouched() {
        let text = "\n\n=== notes.txt ===\nsoil mix ratios".to_string();
        assert_eq!(clip_preview(text.clone(), 1000), text.trim());
    }

    #[test]
    fn preview_clip_never_splits_a_multibyte_character() {
        // 13 ASCII header bytes, then two-byte characters: a budget of 14
        // lands mid-character and must back up to the boundary.
        let text = format!("\n\n=== ab ===\n{}", "ééé");
        let clipped = clip_preview(text, 14);
        assert!(clipped.ends_with("... [truncated]"));
        assert!(!clipped.contains('\u{FFFD}'));
        assert!(clipped.starts_with("=== ab ==="));
    }

    #[test]
    fn preview_clip_exact_budget_is_not_marked() {
        let text = "=== a ===\nbody".to_string();
        let len = text.len();
        assert_eq!(clip_preview(text.clone(), len), text);
    }
}
