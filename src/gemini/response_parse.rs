use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::RecoveryFailed;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*(?i:json)?[ \t]*\r?\n?(.*?)```").unwrap());

/// Ways of digging a JSON object out of model output, from most to least
/// trusting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// The whole reply is the object.
    DirectParse,
    /// The object sits inside a triple-backtick fence, optionally tagged `json`.
    FencedBlock,
    /// The object is somewhere in surrounding prose.
    BraceScan,
}

impl RecoveryStrategy {
    pub const ORDER: [RecoveryStrategy; 3] = [
        RecoveryStrategy::DirectParse,
        RecoveryStrategy::FencedBlock,
        RecoveryStrategy::BraceScan,
    ];

    pub fn apply(&self, text: &str) -> Option<Map<String, Value>> {
        match self {
            RecoveryStrategy::DirectParse => parse_object(text),
            RecoveryStrategy::FencedBlock => fenced_block(text),
            RecoveryStrategy::BraceScan => brace_scan(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub object: Map<String, Value>,
    pub strategy: RecoveryStrategy,
}

/// Try every strategy in order; the first object found wins.
pub fn recover(text: &str) -> Result<Recovered, RecoveryFailed> {
    if text.trim().is_empty() {
        return Err(RecoveryFailed("empty response".to_string()));
    }

    RecoveryStrategy::ORDER
        .iter()
        .find_map(|strategy| {
            strategy.apply(text).map(|object| Recovered {
                object,
                strategy: *strategy,
            })
        })
        .inspect(|recovered| debug!("Recovered model output via {:?}", recovered.strategy))
        .ok_or_else(|| RecoveryFailed("no JSON object found".to_string()))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn fenced_block(text: &str) -> Option<Map<String, Value>> {
    FENCED_BLOCK
        .captures_iter(text)
        .find_map(|captures| parse_object(&captures[1]))
}

fn brace_scan(text: &str) -> Option<Map<String, Value>> {
    candidate_spans(text).into_iter().find_map(parse_object)
}

/// Balanced top-level `{...}` spans in order of appearance, followed by the
/// greedy span from the first `{` to the last `}`.
fn candidate_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(unclosed) = balanced_spans(text, from, &mut spans) {
        from = unclosed + 1;
    }

    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
        if first < last {
            let greedy = &text[first..=last];
            if !spans.contains(&greedy) {
                spans.push(greedy);
            }
        }
    }

    spans
}

/// Collect balanced spans starting at byte offset `from`. Returns the start of
/// a span that never closed, so the caller can rescan past that brace.
fn balanced_spans<'a>(text: &'a str, from: usize, spans: &mut Vec<&'a str>) -> Option<usize> {
    let mut depth = 0usize;
    let mut start = from;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[from..].char_indices() {
        let i = i + from;
        if depth > 0 && in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    (depth > 0).then_some(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLEAN: &str =
        r#"{"exams":[],"assignments":[{"name":"Assignment 1","due_date":"2025-10-20"}],"schedule":[]}"#;

    fn object(text: &str) -> Map<String, Value> {
        match serde_json::from_str(text).unwrap() {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn clean_json_is_returned_unchanged() {
        let recovered = recover(CLEAN).unwrap();
        assert_eq!(recovered.strategy, RecoveryStrategy::DirectParse);
        assert_eq!(recovered.object, object(CLEAN));
    }

    #[test]
    fn fenced_json_matches_unwrapped() {
        for wrapped in [
            format!("```json\n{}\n```", CLEAN),
            format!("  \n\n```json\n{}\n```\n\n  ", CLEAN),
            format!("Here you go:\n```\n{}\n```\nLet me know!", CLEAN),
            format!("```JSON {}```", CLEAN),
        ] {
            let recovered = recover(&wrapped).unwrap();
            assert_eq!(recovered.strategy, RecoveryStrategy::FencedBlock, "{}", wrapped);
            assert_eq!(recovered.object, object(CLEAN));
        }
    }

    #[test]
    fn skips_fences_that_do_not_parse() {
        let text = format!("```\nnot json\n```\nand\n```json\n{}\n```", CLEAN);
        assert_eq!(recover(&text).unwrap().object, object(CLEAN));
    }

    #[test]
    fn finds_object_in_prose() {
        let text = format!("Sure! The dates are {} -- hope that helps.", CLEAN);
        let recovered = recover(&text).unwrap();
        assert_eq!(recovered.strategy, RecoveryStrategy::BraceScan);
        assert_eq!(recovered.object, object(CLEAN));
    }

    #[test]
    fn brace_scan_ignores_braces_inside_strings() {
        let text = r#"Result: {"exams":[{"name":"Quiz } {","due_date":"2025-01-01"}]} done"#;
        let recovered = recover(text).unwrap();
        assert_eq!(recovered.object["exams"][0]["name"], json!("Quiz } {"));
    }

    #[test]
    fn brace_scan_takes_first_parseable_candidate() {
        let text = r#"Template {name} then {"exams":[]} and {"assignments":[]}"#;
        let recovered = recover(text).unwrap();
        assert_eq!(recovered.object, object(r#"{"exams":[]}"#));
    }

    #[test]
    fn unclosed_brace_in_prose_does_not_hide_later_object() {
        let text = r#"Use {curly braces with care. {"exams":[{"name":"Final","due_date":"2025-12-15"}]}"#;
        let recovered = recover(text).unwrap();
        assert_eq!(recovered.strategy, RecoveryStrategy::BraceScan);
        assert_eq!(recovered.object["exams"][0]["name"], json!("Final"));
    }

    #[test]
    fn greedy_span_is_a_candidate() {
        let spans = candidate_spans("a {x} b {y} c");
        assert_eq!(spans, vec!["{x}", "{y}", "{x} b {y}"]);
    }

    #[test]
    fn arrays_are_not_objects() {
        assert!(RecoveryStrategy::DirectParse.apply("[1, 2, 3]").is_none());
    }

    #[test]
    fn prose_fails() {
        assert!(recover("I could not find any dates in this outline.").is_err());
        assert!(recover("   ").is_err());
        assert!(recover("{ broken: json,, }").is_err());
    }
}
