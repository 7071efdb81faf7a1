//! # Gaian Archive Core
//!
//! Domain types, traits, and error definitions for the Gaian Archive
//! service. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The knowledge store is defined as a trait here; the file-backed and
//! hosted-vector-store implementations live in `gaian-knowledge`. This
//! enables:
//! - Swapping backends via configuration
//! - Easy testing with in-memory/temp-file implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod chat;
pub mod error;
pub mod knowledge;

// Re-export key types at crate root for ergonomics
pub use chat::{ChatTurn, Role, SynthesisResult};
pub use error::{BillingError, Error, KnowledgeError, Result, SynthesisError};
pub use knowledge::{CatalogInfo, FileId, FileMetadata, KnowledgeMap, KnowledgeStore};
