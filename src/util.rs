use serde_json::Value;
use tracing::debug;

use crate::TARGET_LLM_REQUEST;

/// Removes a surrounding markdown code fence (with or without a language tag).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Extracts the JSON object from an LLM response that may be wrapped in a code fence
/// or surrounded by prose.
///
/// Returns `None` when no parseable object is present; callers treat that as a
/// failed response.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let candidate = strip_code_fence(text);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }

    // Fall back to the outermost {...} span
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Value>(&candidate[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => None,
        Err(e) => {
            debug!(
                target: TARGET_LLM_REQUEST,
                "Could not parse JSON object from response: {}. Raw content: {}",
                e,
                candidate.chars().take(500).collect::<String>()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json_object(r#"{"headline": "h"}"#).unwrap();
        assert_eq!(value["headline"], "h");
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"headline\": \"h\", \"summary\": \"s\"}\n```";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["summary"], "s");

        let text = "```\n{\"headline\": \"bare fence\"}\n```\n";
        assert_eq!(extract_json_object(text).unwrap()["headline"], "bare fence");
    }

    #[test]
    fn test_json_inside_prose() {
        let text = "Here is the merged finding:\n{\"headline\": \"h\", \"dateRange\": \"2019\"}\nThanks.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["dateRange"], "2019");
    }

    #[test]
    fn test_missing_or_malformed_json() {
        assert!(extract_json_object("").is_none());
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{\"headline\": ").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_malformed_chinese_reply_with_debug_logging() {
        // '{"headline": "' is 14 bytes, so 王 spans bytes 498..501
        let reply = format!(
            "{{\"headline\": \"{}王某被廉政公署调查\", \"summary\": }}",
            "x".repeat(484)
        );
        assert!(!reply.is_char_boundary(500));

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let parsed = tracing::subscriber::with_default(subscriber, || extract_json_object(&reply));
        assert!(parsed.is_none());
    }
}
