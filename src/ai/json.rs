use std::sync::LazyLock;

use regex::Regex;

static ARRAY_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));
static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static ANY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\{.*\}|\[.*\])").expect("valid regex"));

fn parses(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

fn first_valid<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.find(text).map(|m| m.as_str()).filter(|s| parses(s))
}

/// Pull the JSON payload out of a free-form model reply.
///
/// Takes the greedy span from the first `[` to the last `]`. A reply with
/// no such span falls back to the first greedy `{...}`. A bracketed span
/// that does not parse yields `None`.
pub fn extract_json(text: &str) -> Option<&str> {
    if ARRAY_SPAN.is_match(text) {
        first_valid(&ARRAY_SPAN, text)
    } else {
        first_valid(&ANY_SPAN, text)
    }
}

/// Like [`extract_json`] but for replies that are a single JSON object
/// which itself contains arrays.
pub fn extract_json_object(text: &str) -> Option<&str> {
    first_valid(&OBJECT_SPAN, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_bracketed_span() {
        assert_eq!(extract_json(r#"noise [ {"a":1} ] trailing"#), Some(r#"[ {"a":1} ]"#));
    }

    #[test]
    fn test_spans_newlines_and_code_fences() {
        let reply = "Here you go:\n```json\n[\n  {\"id\": 1},\n  {\"id\": 2}\n]\n```\n";
        let json = extract_json(reply).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_no_brackets() {
        assert_eq!(extract_json("I cannot help with that."), None);
    }

    #[test]
    fn test_invalid_array_falls_back_to_object() {
        assert_eq!(extract_json(r#"{"ok": true} then [oops"#), Some(r#"{"ok": true}"#));
        assert_eq!(extract_json("[not json]"), None);
    }

    #[test]
    fn test_unparsable_array_does_not_fall_back() {
        assert_eq!(extract_json(r#"{"x": 1} then [not json]"#), None);
    }

    #[test]
    fn test_object_extraction_keeps_inner_array() {
        let reply = r#"Sure. {"matches": ["DM2", "diabetes"], "explanation": "same"} done"#;
        let obj = extract_json_object(reply).unwrap();
        assert!(obj.starts_with('{') && obj.ends_with('}'));
        // The array-first extractor would only return the inner list.
        assert_eq!(extract_json(reply), Some(r#"["DM2", "diabetes"]"#));
    }
}
