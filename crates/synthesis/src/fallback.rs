//! Fallback policy — the guarantee that no caller ever sees an empty
//! answer.
//!
//! Evaluated after every synthesis call, no exceptions: empty extracted
//! text becomes the fixed refusal string, and under the retrieval
//! strategy a response without citation evidence is treated the same
//! way (configurable — see `synthesis.require_citations`).

use gaian_core::SynthesisResult;

use crate::synthesizer::Strategy;

/// The fixed refusal string, verbatim.
pub const FALLBACK_ANSWER: &str = "Not in the archive yet.";

/// Resolve a synthesis result into the text shown to the end user.
///
/// Never returns an empty string.
pub fn resolve(result: &SynthesisResult, strategy: Strategy, require_citations: bool) -> String {
    let text = result.text.trim();

    if text.is_empty() {
        return FALLBACK_ANSWER.to_string();
    }

    if strategy == Strategy::RetrievalTool && require_citations && !result.used_archive {
        return FALLBACK_ANSWER.to_string();
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(text: &str, used_archive: bool) -> SynthesisResult {
        SynthesisResult {
            raw: json!({}),
            text: text.into(),
            used_archive,
        }
    }

    #[test]
    fn nonempty_text_passes_through_trimmed() {
        let r = result("  The domes open at nine.  ", true);
        assert_eq!(
            resolve(&r, Strategy::ContextInjection, true),
            "The domes open at nine."
        );
    }

    #[test]
    fn empty_text_becomes_fallback() {
        for strategy in [Strategy::ContextInjection, Strategy::RetrievalTool] {
            assert_eq!(resolve(&result("", true), strategy, true), FALLBACK_ANSWER);
            assert_eq!(resolve(&result("   ", true), strategy, false), FALLBACK_ANSWER);
        }
    }

    #[test]
    fn retrieval_without_evidence_becomes_fallback() {
        // Provider answered "9 to 5" but emitted no citation markers:
        // the strict evidence rule discards the answer.
        let r = result("9 to 5", false);
        assert_eq!(resolve(&r, Strategy::RetrievalTool, true), FALLBACK_ANSWER);
    }

    #[test]
    fn evidence_requirement_is_a_config_knob() {
        let r = result("9 to 5", false);
        assert_eq!(resolve(&r, Strategy::RetrievalTool, false), "9 to 5");
    }

    #[test]
    fn context_strategy_ignores_evidence_flag() {
        let r = result("9 to 5", false);
        assert_eq!(resolve(&r, Strategy::ContextInjection, true), "9 to 5");
    }

    #[test]
    fn never_returns_empty() {
        let cases = [
            result("", false),
            result("  ", true),
            result("answer", false),
            result("answer", true),
        ];
        for r in &cases {
            for strategy in [Strategy::ContextInjection, Strategy::RetrievalTool] {
                for require in [true, false] {
                    assert!(!resolve(r, strategy, require).is_empty());
                }
            }
        }
    }
}
