//! Knowledge store implementations for Gaian Archive.
//!
//! Two interchangeable backends behind the `KnowledgeStore` trait:
//!
//! - [`FileStore`] — a local JSON file holding the knowledge map, with an
//!   optional ephemeral override file and a `KB_JSON` environment merge.
//! - [`VectorStore`] — the provider's hosted vector-store catalog; entries
//!   are ingested files, retrieval happens provider-side.
//!
//! The [`compactor`] flattens a knowledge map into the bounded text block
//! injected into prompts by the context strategy.

pub mod compactor;
pub mod file_store;
pub mod vector_store;

pub use compactor::{TRUNCATION_MARKER, compact};
pub use file_store::FileStore;
pub use vector_store::VectorStore;

use std::sync::Arc;

use gaian_config::AppConfig;
use gaian_core::{KnowledgeError, KnowledgeStore};

/// Build the configured knowledge store backend.
///
/// Selection happens once at startup; callers hold the trait object.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn KnowledgeStore>, KnowledgeError> {
    match config.knowledge.backend.as_str() {
        "vector" => {
            let api_key = config.openai.api_key.clone().ok_or_else(|| {
                KnowledgeError::NotConfigured("OPENAI_API_KEY is required for the vector backend".into())
            })?;
            let store_id = config.openai.vector_store_id.clone().ok_or_else(|| {
                KnowledgeError::NotConfigured("VECTOR_STORE_ID is required for the vector backend".into())
            })?;
            Ok(Arc::new(VectorStore::new(
                api_key,
                &config.openai.base_url,
                store_id,
            )))
        }
        _ => Ok(Arc::new(FileStore::new(
            config.knowledge.file_path.clone(),
            config.knowledge.ephemeral_path.clone(),
            config.knowledge.json_override.clone(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_is_the_default() {
        let config = AppConfig::default();
        let store = build_from_config(&config).unwrap();
        assert_eq!(store.name(), "file");
    }

    #[test]
    fn vector_backend_requires_store_id() {
        let mut config = AppConfig::default();
        config.knowledge.backend = "vector".into();
        config.openai.api_key = Some("sk-test".into());

        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, KnowledgeError::NotConfigured(_)));
        assert!(err.to_string().contains("VECTOR_STORE_ID"));
    }

    #[test]
    fn vector_backend_requires_api_key() {
        let mut config = AppConfig::default();
        config.knowledge.backend = "vector".into();
        config.openai.vector_store_id = Some("vs_123".into());

        let err = build_from_config(&config).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn vector_backend_builds_when_configured() {
        let mut config = AppConfig::default();
        config.knowledge.backend = "vector".into();
        config.openai.api_key = Some("sk-test".into());
        config.openai.vector_store_id = Some("vs_123".into());

        let store = build_from_config(&config).unwrap();
        assert_eq!(store.name(), "vector");
    }
}
