//! Answer synthesis for Gaian Archive.
//!
//! Sends a user question — plus either a compacted knowledge-base block
//! or a retrieval-tool directive — to the language-model provider and
//! turns whatever shape comes back into a plain-text answer that is
//! never empty.
//!
//! Pipeline: [`Synthesizer::synthesize`] → [`extract`] chain →
//! [`fallback::resolve`].

pub mod client;
pub mod extract;
pub mod fallback;
pub mod synthesizer;

pub use client::ProviderClient;
pub use extract::{extract_text, has_archive_evidence};
pub use fallback::{FALLBACK_ANSWER, resolve};
pub use synthesizer::{Strategy, Synthesizer};
