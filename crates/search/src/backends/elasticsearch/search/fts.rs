//! Free-text search clauses.

use serde_json::{Value, json};

/// Builds a relevance-ranked match across all fields, tolerant of typos.
pub fn build_text_query(text: &str) -> Value {
    json!({
        "multi_match": {
            "query": text,
            "type": "best_fields",
            "fuzziness": "AUTO",
            "fields": ["*"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_query() {
        let clause = build_text_query("headache fever");
        assert_eq!(clause["multi_match"]["query"], "headache fever");
        assert_eq!(clause["multi_match"]["type"], "best_fields");
        assert_eq!(clause["multi_match"]["fuzziness"], "AUTO");
        assert_eq!(clause["multi_match"]["fields"], json!(["*"]));
    }
}
