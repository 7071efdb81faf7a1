//! Error types for the Gaian Archive domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. The HTTP gateway maps
//! these onto status codes at the boundary; nothing here retries.

use thiserror::Error;

/// The top-level error type for all Gaian Archive operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Knowledge store errors ---
    #[error("Knowledge store error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Answer synthesis errors ---
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    // --- Billing errors ---
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Catalog request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Knowledge store not configured: {0}")]
    NotConfigured(String),

    #[error("Operation not supported by the {backend} backend: {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum BillingError {
    #[error("Payments API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Billing not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}
