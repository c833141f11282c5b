//! Output-parsing helpers shared by the handlers.
//!
//! Handlers try a structured (JSON) reading of the output first and fall
//! back to line-oriented text. Neither path may fail: bad entries are
//! skipped one at a time.

use serde_json::Value;

/// `Some(trimmed)` if the value is present and not blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Trimmed, non-blank lines that are not `#` comments.
pub fn content_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parse `raw` as JSON.
///
/// Tools sometimes print a warning before the document, so if the whole
/// text does not parse, the text from the first `{` or `[` is tried.
pub fn parse_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    let start = trimmed.find(['{', '['])?;
    if start == 0 {
        return None;
    }
    serde_json::from_str(&trimmed[start..]).ok()
}

/// String field of a JSON object, if present and not blank.
pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    non_blank(value.get(key).and_then(Value::as_str))
}

/// Elements of a JSON array, or nothing.
pub fn array_items(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

/// First two whitespace-separated columns of a line.
pub fn name_and_version(line: &str) -> Option<(&str, &str)> {
    let mut columns = line.split_whitespace();
    Some((columns.next()?, columns.next()?))
}

/// Whether a line is a piece of a JSON document rather than a text column.
pub fn is_json_fragment(line: &str) -> bool {
    line.starts_with(['{', '[', '"'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_and_rejects_empty() {
        assert_eq!(non_blank(Some("  x ")), Some("x"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn content_lines_skip_blanks_and_comments() {
        let lines: Vec<&str> = content_lines("# header\n\n  a 1\n\t# note\nb 2\n").collect();
        assert_eq!(lines, vec!["a 1", "b 2"]);
    }

    #[test]
    fn parse_json_skips_leading_noise() {
        let value = parse_json("WARNING: something odd\n[{\"name\": \"a\"}]").unwrap();
        assert_eq!(str_field(&value[0], "name"), Some("a"));
    }

    #[test]
    fn parse_json_rejects_text() {
        assert!(parse_json("").is_none());
        assert!(parse_json("node 18.0.0").is_none());
        assert!(parse_json("[broken").is_none());
    }

    #[test]
    fn str_field_ignores_non_strings() {
        let value: Value = serde_json::json!({"name": 3, "version": " "});
        assert_eq!(str_field(&value, "name"), None);
        assert_eq!(str_field(&value, "version"), None);
        assert_eq!(str_field(&value, "missing"), None);
    }

    #[test]
    fn array_items_of_non_array_is_empty() {
        assert_eq!(array_items(&serde_json::json!({"a": 1})).count(), 0);
        assert_eq!(array_items(&serde_json::json!([1, 2])).count(), 2);
    }

    #[test]
    fn name_and_version_needs_two_columns() {
        assert_eq!(name_and_version("git 2.40.0 extra"), Some(("git", "2.40.0")));
        assert_eq!(name_and_version("lonely"), None);
    }

    #[test]
    fn json_fragments_are_recognized() {
        assert!(is_json_fragment(r#"{"error": "no env found"}"#));
        assert!(is_json_fragment("[1, 2]"));
        assert!(is_json_fragment(r#""caveat": "x""#));
        assert!(!is_json_fragment("numpy 1.26.2 py311_0 conda-forge"));
    }
}
