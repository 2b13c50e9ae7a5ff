use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TRAILING_COMMAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Parse model output as JSON, with one best-effort repair pass when the raw
/// text does not parse: fenced blocks are lifted out, the outermost object or
/// array is sliced, trailing commas are stripped.
pub fn parse_with_repair(raw: &str) -> Option<Value> {
    let text = raw.trim().trim_start_matches('\u{feff}');

    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    repair(text)
}

fn repair(text: &str) -> Option<Value> {
    for candidate in candidates(text) {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            return Some(value);
        }
        let stripped = TRAILING_COMMAS.replace_all(&candidate, "$1");
        if let Ok(value) = serde_json::from_str::<Value>(&stripped) {
            return Some(value);
        }
    }

    None
}

fn candidates(text: &str) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(block) = fenced_block(text, "```json") {
        out.push(block);
    }
    if let Some(block) = fenced_block(text, "```") {
        out.push(block);
    }
    out.push(delimited(text, '{', '}'));
    out.push(delimited(text, '[', ']'));
    out.push(text.to_string());
    out.retain(|candidate| !candidate.is_empty());

    out
}

fn fenced_block(text: &str, fence: &str) -> Option<String> {
    let start = text.find(fence)? + fence.len();
    let end = text[start..].find("```")?;

    Some(text[start..start + end].trim().to_string())
}

fn delimited(text: &str, open: char, close: char) -> String {
    match (text.find(open), text.rfind(close)) {
        (Some(i), Some(j)) if i < j => text[i..=j].to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_passes_through() {
        let value = parse_with_repair(r#"{"events": []}"#).unwrap();
        assert!(value["events"].as_array().unwrap().is_empty());
    }

    #[test]
    fn lifts_fenced_block() {
        let raw = "Here is the result:\n```json\n{\"events\": [{\"title\": \"x\"}]}\n```\nDone.";
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["events"][0]["title"], "x");
    }

    #[test]
    fn lifts_plain_fence() {
        let raw = "```\n[1, 2, 3]\n```";
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn slices_surrounding_prose() {
        let raw = "The extracted data is {\"courses\": []} as requested.";
        let value = parse_with_repair(raw).unwrap();
        assert!(value["courses"].as_array().unwrap().is_empty());
    }

    #[test]
    fn strips_trailing_commas() {
        let raw = r#"{"events": [{"title": "a",},],}"#;
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["events"][0]["title"], "a");
    }

    #[test]
    fn strips_byte_order_mark() {
        let raw = "\u{feff}{\"ok\": true}";
        assert!(parse_with_repair(raw).is_some());
    }

    #[test]
    fn gives_up_on_prose() {
        assert!(parse_with_repair("I could not find any events in this text.").is_none());
    }
}
