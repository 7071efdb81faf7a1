//! Context compactor — flattens the knowledge map into a bounded text
//! block suitable for prompt injection.
//!
//! Each entry renders as `key: value` (non-string values as canonical
//! JSON), entries join with newlines in map iteration order. Over-budget
//! output is cut to exactly the budget and marked. Deterministic: the
//! same map always yields the same block.

use gaian_core::KnowledgeMap;

/// Appended when the joined block exceeds the budget.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Flatten `map` into a context block of at most `max_chars` characters
/// of content (plus the marker when truncated).
pub fn compact(map: &KnowledgeMap, max_chars: usize) -> String {
    let joined = map
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(s) => format!("{key}: {s}"),
            None => format!("{key}: {value}"),
        })
        .collect::<Vec<_>>()
        .join("\n");

    if joined.chars().count() <= max_chars {
        return joined;
    }

    let mut block: String = joined.chars().take(max_chars).collect();
    block.push_str(TRUNCATION_MARKER);
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map_of(pairs: &[(&str, serde_json::Value)]) -> KnowledgeMap {
        let mut map = KnowledgeMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        map
    }

    #[test]
    fn small_map_passes_through_untruncated() {
        let map = map_of(&[
            ("hours", json!("9-5")),
            ("location", json!("Dome 3, Sector 12")),
        ]);
        let block = compact(&map, 6000);
        assert_eq!(block, "hours: 9-5\nlocation: Dome 3, Sector 12");
        assert!(!block.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn structured_values_render_as_canonical_json() {
        let map = map_of(&[("tiers", json!({"free": 0, "pro": 10}))]);
        let block = compact(&map, 6000);
        assert_eq!(block, r#"tiers: {"free":0,"pro":10}"#);
    }

    #[test]
    fn empty_map_yields_empty_block() {
        assert_eq!(compact(&KnowledgeMap::new(), 6000), "");
    }

    #[test]
    fn oversized_map_truncated_to_exact_budget_plus_marker() {
        let map = map_of(&[("big", json!("x".repeat(7000)))]);
        let block = compact(&map, 6000);
        assert_eq!(block.chars().count(), 6000 + TRUNCATION_MARKER.chars().count());
        assert!(block.ends_with(TRUNCATION_MARKER));
        // Content portion is exactly the first 6000 characters.
        assert_eq!(&block[..10], "big: xxxxx");
    }

    #[test]
    fn exactly_at_budget_is_not_truncated() {
        // "k: " + 5997 chars = 6000 exactly
        let map = map_of(&[("k", json!("v".repeat(5997)))]);
        let block = compact(&map, 6000);
        assert_eq!(block.chars().count(), 6000);
        assert!(!block.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn deterministic_for_same_map() {
        let map = map_of(&[
            ("alpha", json!("one")),
            ("beta", json!(2)),
            ("gamma", json!(["a", "b"])),
        ]);
        assert_eq!(compact(&map, 6000), compact(&map, 6000));
    }
}
