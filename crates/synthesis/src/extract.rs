//! Shape-tolerant text extraction from provider responses.
//!
//! The Responses endpoint has shipped several response schemas; rather
//! than pinning one, extraction is an ordered chain of strategies tried
//! against the loose JSON document. The first strategy producing
//! non-empty text wins:
//!
//! 1. the flattened top-level `output_text` field;
//! 2. `output[]` message items, concatenating content-part text stored
//!    under `text`, `output_text`, or `input_text`;
//! 3. the legacy single-choice `choices[0].message.content` field.
//!
//! A separate scan looks for evidence that retrieval actually ran:
//! `file_citation` annotations or a `file_search_call` output item.

use serde_json::Value;

/// One extraction strategy: pulls text out of a response shape, or
/// passes (`None`) so the next strategy gets a look.
type Extractor = fn(&Value) -> Option<String>;

/// The chain, in priority order.
const EXTRACTORS: &[Extractor] = &[from_output_text, from_output_items, from_legacy_choice];

/// Extract the answer text from a raw provider response.
///
/// Returns `""` when no strategy matches — the fallback policy turns
/// that into the fixed refusal string.
pub fn extract_text(raw: &Value) -> String {
    for extract in EXTRACTORS {
        if let Some(text) = extract(raw) {
            return text;
        }
    }
    String::new()
}

/// Flattened full-text field.
fn from_output_text(raw: &Value) -> Option<String> {
    let text = raw["output_text"].as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Structured output list: message items carrying content parts, each
/// part holding text under one of three alternate field names.
fn from_output_items(raw: &Value) -> Option<String> {
    let output = raw["output"].as_array()?;

    let mut fragments: Vec<&str> = Vec::new();
    for item in output {
        if item["type"] != "message" {
            continue;
        }
        let Some(content) = item["content"].as_array() else {
            continue;
        };
        for part in content {
            let text = part["text"]
                .as_str()
                .or_else(|| part["output_text"].as_str())
                .or_else(|| part["input_text"].as_str());
            if let Some(t) = text {
                fragments.push(t);
            }
        }
    }

    let joined = fragments.concat();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Legacy single-choice field.
fn from_legacy_choice(raw: &Value) -> Option<String> {
    let text = raw["choices"][0]["message"]["content"].as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Scan the structured output for evidence that the knowledge base was
/// actually consulted.
pub fn has_archive_evidence(raw: &Value) -> bool {
    let Some(output) = raw["output"].as_array() else {
        return false;
    };

    for item in output {
        if item["type"] == "file_search_call" {
            return true;
        }
        let Some(content) = item["content"].as_array() else {
            continue;
        };
        for part in content {
            if let Some(annotations) = part["annotations"].as_array()
                && annotations.iter().any(|a| a["type"] == "file_citation")
            {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- extraction chain, one fixture per shape ---

    #[test]
    fn output_text_field_wins() {
        let raw = json!({"output_text": "  Dome 3 opens at nine.  "});
        assert_eq!(extract_text(&raw), "Dome 3 opens at nine.");
    }

    #[test]
    fn empty_output_text_falls_through_to_output_items() {
        let raw = json!({
            "output_text": "   ",
            "output": [
                {"type": "message", "content": [{"type": "output_text", "text": "From the items."}]}
            ]
        });
        assert_eq!(extract_text(&raw), "From the items.");
    }

    #[test]
    fn output_items_concatenate_fragments() {
        let raw = json!({
            "output": [
                {"type": "file_search_call", "status": "completed"},
                {"type": "message", "content": [
                    {"text": "Part one. "},
                    {"output_text": "Part two. "},
                    {"input_text": "Part three."}
                ]}
            ]
        });
        assert_eq!(extract_text(&raw), "Part one. Part two. Part three.");
    }

    #[test]
    fn non_message_items_are_skipped() {
        let raw = json!({
            "output": [
                {"type": "reasoning", "content": [{"text": "internal"}]},
                {"type": "message", "content": [{"text": "visible"}]}
            ]
        });
        assert_eq!(extract_text(&raw), "visible");
    }

    #[test]
    fn legacy_choice_shape_is_last_resort() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": "Legacy answer."}}]
        });
        assert_eq!(extract_text(&raw), "Legacy answer.");
    }

    #[test]
    fn unrecognized_shape_yields_empty_string() {
        assert_eq!(extract_text(&json!({"id": "resp_1"})), "");
        assert_eq!(extract_text(&json!(null)), "");
        assert_eq!(extract_text(&json!({"output": []})), "");
    }

    // --- citation evidence scan ---

    #[test]
    fn file_search_call_counts_as_evidence() {
        let raw = json!({
            "output": [
                {"type": "file_search_call", "status": "completed"},
                {"type": "message", "content": [{"text": "answer"}]}
            ]
        });
        assert!(has_archive_evidence(&raw));
    }

    #[test]
    fn file_citation_annotation_counts_as_evidence() {
        let raw = json!({
            "output": [
                {"type": "message", "content": [
                    {"text": "answer", "annotations": [{"type": "file_citation", "file_id": "file-1"}]}
                ]}
            ]
        });
        assert!(has_archive_evidence(&raw));
    }

    #[test]
    fn plain_answer_without_citations_is_not_evidence() {
        let raw = json!({
            "output": [
                {"type": "message", "content": [{"text": "9 to 5", "annotations": []}]}
            ]
        });
        assert!(!has_archive_evidence(&raw));
        assert!(!has_archive_evidence(&json!({"output_text": "9 to 5"})));
    }

    #[test]
    fn other_annotation_types_are_not_evidence() {
        let raw = json!({
            "output": [
                {"type": "message", "content": [
                    {"text": "answer", "annotations": [{"type": "url_citation", "url": "https://x"}]}
                ]}
            ]
        });
        assert!(!has_archive_evidence(&raw));
    }
}
