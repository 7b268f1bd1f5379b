//! Output harvesting
//!
//! LLM responses are not reliably well-formed: a stage that was asked for a
//! JSON object may return bare JSON, JSON wrapped in prose, JSON inside a
//! markdown fence, or nothing usable at all. The harvester tries a fixed
//! sequence of recovery strategies and reports which one succeeded.
//!
//! Strategies, in strict precedence order (first success wins):
//! 1. provider-structured value (schema mode output)
//! 2. whole response text parsed as JSON
//! 3. each fenced ``` block in document order, parsed as JSON
//!
//! A candidate object only counts as a success when every expected field is
//! present as a key; partial matches fall through to the next strategy.
//! `extract` never fails with an error and never panics.

use serde_json::Value;

use crate::domain::stage::Strategy;

/// How many characters of the raw response to keep in diagnostics.
const PREVIEW_LEN: usize = 200;

/// A single stage response as returned by the LLM provider.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Raw response text, always present.
    pub text: String,
    /// Already-decoded value, present when the provider was invoked in
    /// schema/JSON mode and its response decoded cleanly.
    pub structured: Option<Value>,
}

impl ModelOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), structured: None }
    }

    pub fn structured(value: Value) -> Self {
        Self { text: value.to_string(), structured: Some(value) }
    }
}

/// Result of harvesting one stage response.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub strategy: Strategy,
    /// Present iff `strategy != Strategy::None`.
    pub value: Option<Value>,
    /// Human-readable failure description, present iff extraction failed.
    pub diagnostic: Option<String>,
}

impl Extraction {
    pub fn succeeded(&self) -> bool {
        self.strategy != Strategy::None
    }

    fn success(strategy: Strategy, value: Value) -> Self {
        Self { strategy, value: Some(value), diagnostic: None }
    }

    fn failure(output: &ModelOutput, expected_fields: &[&str]) -> Self {
        let preview: String = output.text.chars().take(PREVIEW_LEN).collect();
        let ellipsis = if output.text.chars().count() > PREVIEW_LEN { "..." } else { "" };
        Self {
            strategy: Strategy::None,
            value: None,
            diagnostic: Some(format!(
                "no strategy produced an object with required fields [{}]; response preview: {}{}",
                expected_fields.join(", "),
                preview,
                ellipsis,
            )),
        }
    }
}

/// Recover a structured value containing all `expected_fields` from a raw
/// stage response.
pub fn extract(output: &ModelOutput, expected_fields: &[&str]) -> Extraction {
    // Strategy 1: the provider already handed us a decoded object.
    if let Some(value) = &output.structured {
        if has_fields(value, expected_fields) {
            return Extraction::success(Strategy::TypedSchema, value.clone());
        }
    }

    // Strategy 2: the whole text is a JSON object.
    if let Ok(value) = serde_json::from_str::<Value>(output.text.trim()) {
        if has_fields(&value, expected_fields) {
            return Extraction::success(Strategy::DirectJson, value);
        }
    }

    // Strategy 3: fenced code blocks, in document order.
    for block in fenced_blocks(&output.text) {
        if let Ok(value) = serde_json::from_str::<Value>(block.trim()) {
            if has_fields(&value, expected_fields) {
                return Extraction::success(Strategy::FencedJson, value);
            }
        }
    }

    Extraction::failure(output, expected_fields)
}

/// True iff `value` is a JSON object with every expected field present as a
/// key. An empty field list accepts any object.
fn has_fields(value: &Value, expected_fields: &[&str]) -> bool {
    match value.as_object() {
        Some(map) => expected_fields.iter().all(|f| map.contains_key(*f)),
        None => false,
    }
}

/// Collect the contents of all triple-backtick fenced blocks, in order of
/// appearance. Language tags (```json, ```html, ...) are ignored; the JSON
/// parse attempt decides whether a block is usable. An unterminated final
/// fence is discarded.
fn fenced_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            match current.take() {
                Some(block) => blocks.push(block),
                None => current = Some(String::new()),
            }
            continue;
        }
        if let Some(block) = current.as_mut() {
            if !block.is_empty() {
                block.push('\n');
            }
            block.push_str(line);
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UI_FIELDS: &[&str] = &["filename", "code"];

    #[test]
    fn test_direct_json_extraction() {
        let raw = r#"{"filename":"index.html","code":"<html></html>"}"#;
        let out = ModelOutput::text(raw);
        let extraction = extract(&out, UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::DirectJson);
        assert_eq!(
            extraction.value.unwrap(),
            json!({"filename": "index.html", "code": "<html></html>"})
        );
    }

    #[test]
    fn test_fenced_json_extraction() {
        let raw = "Here is the file:\n```json\n{\"filename\":\"app.js\",\"code\":\"console.log(1)\"}\n```";
        let extraction = extract(&ModelOutput::text(raw), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::FencedJson);
        assert_eq!(extraction.value.unwrap()["filename"], "app.js");
    }

    #[test]
    fn test_no_json_anywhere_fails_with_diagnostic() {
        let extraction = extract(&ModelOutput::text("I couldn't generate this."), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::None);
        assert!(extraction.value.is_none());
        let diag = extraction.diagnostic.unwrap();
        assert!(diag.contains("filename"));
        assert!(diag.contains("I couldn't generate this."));
    }

    #[test]
    fn test_typed_schema_takes_precedence() {
        let value = json!({"filename": "styles.css", "code": "body {}"});
        let out = ModelOutput::structured(value.clone());
        // The text also parses as JSON; schema mode must still win.
        let extraction = extract(&out, UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::TypedSchema);
        assert_eq!(extraction.value.unwrap(), value);
    }

    #[test]
    fn test_structured_value_missing_fields_falls_through() {
        let out = ModelOutput {
            text: r#"{"filename":"a.js","code":"x"}"#.to_string(),
            structured: Some(json!({"filename": "a.js"})),
        };
        let extraction = extract(&out, UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::DirectJson);
    }

    #[test]
    fn test_partial_fields_rejected_not_accepted() {
        // Valid JSON object, but "code" is missing: that is a failure, not a
        // partial success.
        let extraction = extract(&ModelOutput::text(r#"{"filename":"x"}"#), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::None);
    }

    #[test]
    fn test_fence_with_partial_fields_skipped() {
        let raw = "```json\n{\"filename\":\"y\"}\n```\n```json\n{\"filename\":\"y\",\"code\":\"z\"}\n```";
        let extraction = extract(&ModelOutput::text(raw), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::FencedJson);
        assert_eq!(extraction.value.unwrap()["code"], "z");
    }

    #[test]
    fn test_first_matching_fence_wins() {
        let raw = "```json\nnot json at all\n```\nthen\n```json\n{\"filename\":\"1\",\"code\":\"a\"}\n```\n```json\n{\"filename\":\"2\",\"code\":\"b\"}\n```";
        let extraction = extract(&ModelOutput::text(raw), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::FencedJson);
        assert_eq!(extraction.value.unwrap()["filename"], "1");
    }

    #[test]
    fn test_malformed_json_falls_through_silently() {
        let raw = "```json\n{\"filename\": \"a\", \"code\": \"b\",}\n```";
        // Trailing comma: serde_json rejects it, so extraction fails overall
        // without panicking.
        let extraction = extract(&ModelOutput::text(raw), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::None);
    }

    #[test]
    fn test_non_object_json_rejected() {
        let extraction = extract(&ModelOutput::text("[1, 2, 3]"), UI_FIELDS);
        assert_eq!(extraction.strategy, Strategy::None);
    }

    #[test]
    fn test_empty_field_list_accepts_any_object() {
        let extraction = extract(&ModelOutput::text("{}"), &[]);
        assert_eq!(extraction.strategy, Strategy::DirectJson);
    }

    #[test]
    fn test_fenced_blocks_scanner() {
        let text = "intro\n```html\n<p>hi</p>\n```\nmiddle\n```\nplain\nlines\n```\n```json\ndangling";
        let blocks = fenced_blocks(text);
        assert_eq!(blocks, vec!["<p>hi</p>".to_string(), "plain\nlines".to_string()]);
    }

    #[test]
    fn test_diagnostic_preview_is_truncated() {
        let raw = "x".repeat(1000);
        let extraction = extract(&ModelOutput::text(raw), UI_FIELDS);
        let diag = extraction.diagnostic.unwrap();
        assert!(diag.len() < 400);
        assert!(diag.contains("..."));
    }
}
