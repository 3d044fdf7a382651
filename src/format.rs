// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Canonical text rendering of decoded JSON values.
//!
//! Object keys are always sorted before emission, so the output does not
//! depend on how the underlying map stores its entries. Two calls with the
//! same value and the same [`Layout`] produce identical text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::DumpError;
use crate::redact::{redact, RedactionSet};

const TRUNCATION_MARKER: &str = "...";

/// Whitespace and truncation settings for the formatter.
///
/// A `Layout` is built once, before traffic starts, and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Row separator. An empty string renders everything on one line.
    pub newline: String,
    /// Maximum characters kept from a string value; 0 disables truncation.
    pub max_string_length: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            indent: 4,
            newline: "\n".to_string(),
            max_string_length: 0,
        }
    }
}

impl Layout {
    /// Single-line layout, no indentation.
    pub fn single_line() -> Self {
        Self {
            newline: String::new(),
            ..Self::default()
        }
    }

    fn indentation(&self, depth: usize) -> String {
        if self.newline.is_empty() {
            return String::new();
        }
        " ".repeat(self.indent * depth)
    }
}

/// Parse `data` as JSON, strip `hidden` keys from the top-level object and
/// render the result starting at depth 1.
pub fn format_json_bytes(
    data: &[u8],
    hidden: &RedactionSet,
    compact: bool,
    layout: &Layout,
) -> Result<String, DumpError> {
    let value: Value = serde_json::from_slice(data)?;
    Ok(format_value(&redact(value, hidden), 1, compact, layout))
}

/// Same as [`format_json_bytes`] for any serializable value (header maps,
/// parsed forms).
pub fn format_serializable<T>(
    value: &T,
    hidden: &RedactionSet,
    compact: bool,
    layout: &Layout,
) -> Result<String, DumpError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|e| DumpError::Serialize(e.to_string()))?;
    Ok(format_value(&redact(value, hidden), 1, compact, layout))
}

/// Render a decoded value. `depth` only drives indentation; callers start at 1.
///
/// With `compact` set, arrays stay on a single line whatever the layout says.
pub fn format_value(value: &Value, depth: usize, compact: bool, layout: &Layout) -> String {
    match value {
        Value::String(s) => format_string(s, layout),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(map) => format_object(map, depth, compact, layout),
        Value::Array(items) => format_array(items, depth, compact, layout),
    }
}

fn format_string(s: &str, layout: &Layout) -> String {
    let limit = layout.max_string_length;
    if limit > 0 && s.chars().count() > limit {
        let mut truncated: String = s.chars().take(limit).collect();
        truncated.push_str(TRUNCATION_MARKER);
        return quote(&truncated);
    }
    quote(s)
}

// serde_json leaves <, > and & alone, which keeps markup readable.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}

fn format_number(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            // f64 Display is the shortest round-trip form and never uses an exponent.
            return f.to_string();
        }
    }
    n.to_string()
}

fn format_object(map: &Map<String, Value>, depth: usize, compact: bool, layout: &Layout) -> String {
    if map.is_empty() {
        return "{}".to_string();
    }

    let current_indent = layout.indentation(depth.saturating_sub(1));
    let next_indent = layout.indentation(depth);
    let value_indent = if layout.newline.is_empty() { "" } else { " " };

    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let rows: Vec<String> = entries
        .into_iter()
        .map(|(key, val)| {
            format!(
                "{}{}:{}{}",
                next_indent,
                quote(key),
                value_indent,
                format_value(val, depth + 1, compact, layout)
            )
        })
        .collect();

    wrap_rows('{', '}', &rows, &current_indent, layout)
}

fn format_array(items: &[Value], depth: usize, compact: bool, layout: &Layout) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }

    if compact {
        let elems: Vec<String> = items
            .iter()
            .map(|v| format_value(v, depth + 1, compact, layout))
            .collect();
        return format!("[ {} ]", elems.join(", "));
    }

    let current_indent = layout.indentation(depth.saturating_sub(1));
    let next_indent = layout.indentation(depth);
    let rows: Vec<String> = items
        .iter()
        .map(|v| format!("{}{}", next_indent, format_value(v, depth + 1, compact, layout)))
        .collect();

    wrap_rows('[', ']', &rows, &current_indent, layout)
}

fn wrap_rows(open: char, close: char, rows: &[String], closing_indent: &str, layout: &Layout) -> String {
    let nl = layout.newline.as_str();
    let separator = format!(",{}", nl);
    format!(
        "{}{}{}{}{}{}",
        open,
        nl,
        rows.join(&separator),
        nl,
        closing_indent,
        close
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn fmt(v: &Value) -> String {
        format_value(v, 1, false, &Layout::default())
    }

    #[rstest]
    #[case(json!(true), "true")]
    #[case(json!(false), "false")]
    #[case(json!(null), "null")]
    #[case(json!(10), "10")]
    #[case(json!(-3), "-3")]
    #[case(json!(1.5), "1.5")]
    #[case(json!(2.0), "2")]
    #[case(json!(1e21), "1000000000000000000000")]
    #[case(json!(0.0000001), "0.0000001")]
    #[case(json!({}), "{}")]
    #[case(json!([]), "[]")]
    fn scalars_and_empty_containers(#[case] v: Value, #[case] expected: &str) {
        assert_eq!(fmt(&v), expected);
    }

    #[test]
    fn strings_are_escaped_but_not_html_escaped() {
        let v = json!("<a href=\"x\">&</a>\n");
        assert_eq!(fmt(&v), r#""<a href=\"x\">&</a>\n""#);
    }

    #[test]
    fn object_keys_are_sorted_and_indented() {
        let mut map = Map::new();
        map.insert("start_time".into(), json!("2025-05-24"));
        map.insert("end_time".into(), json!("2025-05-24"));
        let out = fmt(&Value::Object(map));
        assert_eq!(
            out,
            "{\n    \"end_time\": \"2025-05-24\",\n    \"start_time\": \"2025-05-24\"\n}"
        );
    }

    #[test]
    fn object_keys_are_escaped_like_strings() {
        let v = json!({"say \"hi\"": 1, "tab\t": 2});
        let out = format_value(&v, 1, false, &Layout::single_line());
        assert_eq!(out, r#"{"say \"hi\"":1,"tab\t":2}"#);
    }

    #[test]
    fn nested_containers_indent_per_depth() {
        let v = json!({"c": [1, 2], "a": {"b": 1}});
        let expected = "{\n    \"a\": {\n        \"b\": 1\n    },\n    \"c\": [\n        1,\n        2\n    ]\n}";
        assert_eq!(fmt(&v), expected);
    }

    #[test]
    fn compact_arrays_stay_on_one_line() {
        let v = json!({"x": ["a", "b"], "accept": ["*/*"]});
        let out = format_value(&v, 1, true, &Layout::default());
        assert_eq!(out, "{\n    \"accept\": [ \"*/*\" ],\n    \"x\": [ \"a\", \"b\" ]\n}");
    }

    #[test]
    fn empty_newline_renders_single_line() {
        let v = json!({"c": [1, 2], "a": {"b": 1}});
        let out = format_value(&v, 1, false, &Layout::single_line());
        assert_eq!(out, r#"{"a":{"b":1},"c":[1,2]}"#);
    }

    #[test]
    fn custom_indent_width() {
        let layout = Layout {
            indent: 2,
            ..Layout::default()
        };
        let out = format_value(&json!({"a": [true]}), 1, false, &layout);
        assert_eq!(out, "{\n  \"a\": [\n    true\n  ]\n}");
    }

    #[rstest]
    #[case(5, "abcdefgh", "\"abcde...\"")]
    #[case(5, "abcde", "\"abcde\"")]
    #[case(0, "abcdefgh", "\"abcdefgh\"")]
    #[case(2, "héllo", "\"hé...\"")]
    fn truncation_counts_characters(
        #[case] max: usize,
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        let layout = Layout {
            max_string_length: max,
            ..Layout::default()
        };
        assert_eq!(format_value(&json!(input), 1, false, &layout), expected);
    }

    #[test]
    fn formatting_is_deterministic() {
        let v = json!({"z": 1, "m": {"q": [1, {"b": 2, "a": 1}]}, "a": null});
        assert_eq!(fmt(&v), fmt(&v.clone()));
    }

    #[test]
    fn canonical_form_survives_a_parse_cycle() -> anyhow::Result<()> {
        let v = json!({"name": "dump", "n": 3.25, "ok": true, "none": null, "list": [1, "two", {"k": []}]});
        let serialized = serde_json::to_vec(&v)?;
        let via_bytes = format_json_bytes(&serialized, &RedactionSet::new(), false, &Layout::default())?;
        assert_eq!(via_bytes, fmt(&v));
        Ok(())
    }

    #[test]
    fn format_json_bytes_redacts_top_level() -> anyhow::Result<()> {
        let hidden: RedactionSet = ["Password"].into_iter().collect();
        let out = format_json_bytes(
            br#"{"password":"x","user":"u"}"#,
            &hidden,
            false,
            &Layout::single_line(),
        )?;
        assert_eq!(out, r#"{"user":"u"}"#);
        Ok(())
    }

    #[test]
    fn format_json_bytes_reports_parse_errors() {
        let res = format_json_bytes(b"{\"a\":", &RedactionSet::new(), false, &Layout::default());
        assert!(matches!(res, Err(DumpError::Json(_))));
    }

    #[test]
    fn format_serializable_handles_maps_of_lists() -> anyhow::Result<()> {
        let mut form = std::collections::BTreeMap::new();
        form.insert("foo", vec!["bar", "bar2"]);
        form.insert("bar", vec!["baz"]);
        let out = format_serializable(&form, &RedactionSet::new(), true, &Layout::default())?;
        assert_eq!(out, "{\n    \"bar\": [ \"baz\" ],\n    \"foo\": [ \"bar\", \"bar2\" ]\n}");
        Ok(())
    }
}
