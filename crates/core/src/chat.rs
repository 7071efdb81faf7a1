//! Chat turn and synthesis result value objects.
//!
//! A chat request flows through the system as an ordered sequence of
//! `ChatTurn`s: instruction turn → knowledge-base context turn → user
//! question. Nothing is persisted server-side; the browser keeps its own
//! transcript for display only.

use serde::{Deserialize, Serialize};

/// The role of a turn in the prompt sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System/developer instruction (answering rules)
    Developer,
    /// Prior context — carries the compacted knowledge base block
    Assistant,
    /// The end user's question
    User,
}

/// A single turn in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    /// Create a developer (instruction) turn.
    pub fn developer(content: impl Into<String>) -> Self {
        Self {
            role: Role::Developer,
            content: content.into(),
        }
    }

    /// Create an assistant (context-carrying) turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a user (question) turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The outcome of one synthesis call against the provider.
///
/// `raw` keeps the provider's response verbatim because its schema varies
/// across provider versions; `text` is whatever the extraction chain pulled
/// out of it (possibly empty — the fallback policy handles that).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// The provider response, untouched.
    pub raw: serde_json::Value,

    /// Extracted plain-text answer ("" when nothing usable was found).
    pub text: String,

    /// Whether the response carried evidence that the knowledge base was
    /// actually consulted (citation annotations or a retrieval tool call).
    pub used_archive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_constructors_set_roles() {
        assert_eq!(ChatTurn::developer("rules").role, Role::Developer);
        assert_eq!(ChatTurn::assistant("kb").role, Role::Assistant);
        assert_eq!(ChatTurn::user("hi").role, Role::User);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::user("q")).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }
}
