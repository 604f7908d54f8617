//! Ordered text repairs for malformed JSON.
//!
//! Some models answer in prose with a JSON object that almost parses:
//! unquoted keys, empty values, doubled commas, strings broken across lines,
//! flattened point arrays. Each known malformation is a [`RepairRule`], and a
//! [`JsonRepairer`] applies its rules in order. Later rules may assume earlier
//! ones have run.
//!
//! Every rule's output must not match the rule again, so running the whole
//! chain twice gives the same text as running it once.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::{OutputError, OutputResult};

/// Field names the drawing schema knows about.
pub const KNOWN_FIELDS: &[&str] = &[
    "type",
    "x",
    "y",
    "width",
    "height",
    "text",
    "strokeColor",
    "backgroundColor",
    "points",
    "explanation",
    "elements",
];

/// Element fields that commonly follow a bare number.
const ELEMENT_FIELDS: &str = "type|x|y|width|height|text|strokeColor|backgroundColor";

/// A number, possibly negative or fractional.
const NUM: &str = r"-?\d+(?:\.\d+)?";

/// One named regex substitution.
#[derive(Debug, Clone)]
pub struct RepairRule {
    name: String,
    pattern: Regex,
    replacement: String,
}

impl RepairRule {
    /// Compile a rule. `replacement` uses `regex` syntax (`${1}`).
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> OutputResult<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|source| OutputError::InvalidRule {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            pattern,
            replacement: replacement.into(),
        })
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the rule to every match in `text`.
    #[must_use]
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

/// An ordered list of repair rules.
#[derive(Debug, Clone, Default)]
pub struct JsonRepairer {
    rules: Vec<RepairRule>,
}

impl JsonRepairer {
    /// Create a repairer with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rule chain.
    #[must_use]
    pub fn standard() -> &'static JsonRepairer {
        static STANDARD: OnceLock<JsonRepairer> = OnceLock::new();
        STANDARD.get_or_init(|| JsonRepairer {
            rules: standard_rules()
                .into_iter()
                .map(|(name, pattern, replacement)| {
                    RepairRule::new(name, &pattern, replacement).expect("built-in rule compiles")
                })
                .collect(),
        })
    }

    /// Append a rule to the end of the chain.
    #[must_use]
    pub fn with_rule(mut self, rule: RepairRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[RepairRule] {
        &self.rules
    }

    /// Look up a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&RepairRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Run every rule in order and trim the result.
    #[must_use]
    pub fn repair(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            if let Cow::Owned(next) = rule.apply(&current) {
                tracing::trace!(rule = %rule.name, "Repair rule changed text");
                current = next;
            }
        }
        current.trim().to_string()
    }
}

fn standard_rules() -> Vec<(&'static str, String, &'static str)> {
    let known = KNOWN_FIELDS.join("|");
    vec![
        // Newlines survive until the line-break rules below.
        (
            "control_chars",
            r"[\x00-\x09\x0B-\x1F\x7F]".to_string(),
            " ",
        ),
        (
            "quote_key_after_comma",
            format!(r#",\s*({known})"(\s*:)"#),
            r#","${1}"${2}"#,
        ),
        (
            "quote_key_after_brace",
            format!(r#"\{{\s*({known})"(\s*:)"#),
            r#"{"${1}"${2}"#,
        ),
        (
            "comma_before_bare_key",
            format!(r#"(\d)\s+({ELEMENT_FIELDS})"(\s*:)"#),
            r#"${1}, "${2}"${3}"#,
        ),
        (
            "comma_before_quoted_key",
            format!(r#"(\d)\s+"({ELEMENT_FIELDS})"(\s*:)"#),
            r#"${1}, "${2}"${3}"#,
        ),
        ("empty_value_after_key", r#""\s*:\s*,"#.to_string(), r#"": 0,"#),
        ("empty_value_before_comma", r":\s*,".to_string(), ": 0,"),
        ("empty_value_before_brace", r":\s*\}".to_string(), ": null}"),
        ("empty_value_before_bracket", r":\s*\]".to_string(), ": null]"),
        ("doubled_commas", r",(\s*,)+".to_string(), ","),
        ("trailing_comma_brace", r",\s*\}".to_string(), "}"),
        ("trailing_comma_bracket", r",\s*\]".to_string(), "]"),
        ("broken_string", r#""\s*\n\s*""#.to_string(), r#"",""#),
        (
            "empty_key_as_type",
            r#"([{,]\s*)""\s*:"#.to_string(),
            r#"${1}"type":"#,
        ),
        ("line_breaks", r"\s*\n\s*".to_string(), " "),
        (
            "points_flattened_pair",
            format!(r"\[\[({NUM}),\s*({NUM})\]({NUM}),\s*({NUM})\]\]"),
            "[[${1}, ${2}], [${3}, ${4}]]",
        ),
        (
            "points_missing_open",
            r"(\d)\]\s*(-?\d)".to_string(),
            "${1}], [${2}",
        ),
        (
            "points_missing_comma",
            r"(\d)\]\s*\[(-?\d)".to_string(),
            "${1}], [${2}",
        ),
    ]
}

/// Repair `text` with the built-in rules.
#[must_use]
pub fn repair_json(text: &str) -> String {
    JsonRepairer::standard().repair(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn rule(name: &str) -> &'static RepairRule {
        JsonRepairer::standard()
            .rule(name)
            .unwrap_or_else(|| panic!("no rule named {name}"))
    }

    #[rstest]
    #[case("control_chars", "{\"a\":\t1\r}", "{\"a\": 1 }")]
    #[case("control_chars", "keep\nnewline", "keep\nnewline")]
    #[case("quote_key_after_comma", r#"{"x":1, width": 80}"#, r#"{"x":1,"width": 80}"#)]
    #[case("quote_key_after_brace", r#"{ type": "text"}"#, r#"{"type": "text"}"#)]
    #[case("comma_before_bare_key", r#""x": 100 width": 80"#, r#""x": 100, "width": 80"#)]
    #[case("comma_before_quoted_key", r#""x": 100 "y": 80"#, r#""x": 100, "y": 80"#)]
    #[case("empty_value_after_key", r#"{"y": , "x": 1}"#, r#"{"y": 0, "x": 1}"#)]
    #[case("empty_value_before_comma", r#"{y: ,"x":1}"#, r#"{y: 0,"x":1}"#)]
    #[case("empty_value_before_brace", r#"{"text": }"#, r#"{"text": null}"#)]
    #[case("empty_value_before_bracket", r#"["a": ]"#, r#"["a": null]"#)]
    #[case("doubled_commas", "[1,, ,2]", "[1,2]")]
    #[case("trailing_comma_brace", r#"{"a":1, }"#, r#"{"a":1}"#)]
    #[case("trailing_comma_bracket", "[1,2,\n]", "[1,2]")]
    #[case("broken_string", "\"rect\"\n  \"x\"", r#""rect","x""#)]
    #[case("empty_key_as_type", r#"{"": "ellipse", "x": 1}"#, r#"{"type": "ellipse", "x": 1}"#)]
    #[case("empty_key_as_type", r#"{"text": "", "x": 1}"#, r#"{"text": "", "x": 1}"#)]
    #[case("line_breaks", "{\n  \"a\": 1\n}", "{ \"a\": 1 }")]
    #[case("points_flattened_pair", "[[0, 0]100, 50]]", "[[0, 0], [100, 50]]")]
    #[case("points_missing_open", "[[0,0]100,0]50,5]]", "[[0,0], [100,0], [50,5]]")]
    #[case("points_missing_comma", "[[0,0][100,-5]]", "[[0,0], [100,-5]]")]
    fn test_rule(#[case] name: &str, #[case] input: &str, #[case] expected: &str) {
        let once = rule(name).apply(input).into_owned();
        assert_eq!(once, expected);
        assert_eq!(rule(name).apply(&once), once, "rule {name} is not idempotent");
    }

    #[test]
    fn test_valid_json_untouched_by_structural_rules() {
        let valid = r#"{"elements":[{"type":"arrow","x":1,"y":2,"points":[[0,0],[10,-5]]}],"explanation":"a, b"}"#;
        assert_eq!(repair_json(valid), valid);
    }

    #[rstest]
    #[case(
        "{\"elements\": [{ type\": \"rectangle\", \"x\": 100 y\": 100, \"width\": , \"height\": 80,}],, \"explanation\": \"box\"}",
        json!({"elements": [{"type": "rectangle", "x": 100, "y": 100, "width": 0, "height": 80}], "explanation": "box"})
    )]
    #[case(
        "{\"elements\":[{\"\": \"line\",\"x\":0,\"y\":0,\"points\":[[0, 0]200, 0]]}]}",
        json!({"elements": [{"type": "line", "x": 0, "y": 0, "points": [[0, 0], [200, 0]]}]})
    )]
    #[case(
        "{\"elements\":[{\"type\":\"text\",\"x\":1,\"y\":2,\"text\":\"hi\"\n\"strokeColor\":\"#e03131\"}]}",
        json!({"elements": [{"type": "text", "x": 1, "y": 2, "text": "hi", "strokeColor": "#e03131"}]})
    )]
    fn test_repair_makes_parseable(#[case] input: &str, #[case] expected: Value) {
        assert!(serde_json::from_str::<Value>(input).is_err());
        let repaired = repair_json(input);
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("{\"a\": ,, \"b\": }")]
    #[case("{ x\": 1,\n\"\": \"text\",\n width\": 5 height\": 6,]}")]
    #[case("[[1,2]3,4]] [[5,6][7,8]]\t\"s\"\n\"t\"")]
    fn test_repair_idempotent(#[case] input: &str) {
        let once = repair_json(input);
        assert_eq!(repair_json(&once), once);
    }

    #[test]
    fn test_custom_rule_appended() {
        let repairer = JsonRepairer::new()
            .with_rule(RepairRule::new("single_quotes", "'", "\"").unwrap());
        assert_eq!(repairer.rules().len(), 1);
        assert_eq!(repairer.repair(" {'a': 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_bad_rule_pattern() {
        let err = RepairRule::new("broken", "(", "").unwrap_err();
        assert!(err.to_string().starts_with("Invalid repair rule 'broken'"));
    }

    #[test]
    fn test_rule_names_unique() {
        let rules = JsonRepairer::standard().rules();
        let mut names: Vec<_> = rules.iter().map(RepairRule::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), rules.len());
    }
}
