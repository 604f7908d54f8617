//! Locating a JSON candidate inside prose.

use regex::Regex;
use std::sync::OnceLock;

fn json_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fence pattern"))
}

/// Where a candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Interior of a fenced block labelled `json`.
    Fence,
    /// First `{` through last `}`.
    BraceSpan,
}

/// Find the JSON-looking part of a model answer.
///
/// A fenced block labelled `json` wins; otherwise the span from the first
/// `{` to the last `}` is used. Returns `None` when neither exists.
///
/// # Example
///
/// ```rust
/// use sketchflow_output::extract::{extract_json_candidate, CandidateSource};
///
/// let text = "Sure:\n```json\n{\"elements\":[]}\n```";
/// assert_eq!(
///     extract_json_candidate(text),
///     Some(("{\"elements\":[]}", CandidateSource::Fence))
/// );
/// ```
#[must_use]
pub fn extract_json_candidate(text: &str) -> Option<(&str, CandidateSource)> {
    if let Some(inner) = json_fence()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
    {
        return Some((inner, CandidateSource::Fence));
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (last > first).then(|| (&text[first..=last], CandidateSource::BraceSpan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Here is ```json\n{\"a\":1}\n```", Some("{\"a\":1}"))]
    #[case("prefix {\"a\":{\"b\":2}} suffix", Some("{\"a\":{\"b\":2}}"))]
    #[case("```json\n{\"fenced\":true}\n``` and {\"later\":1}", Some("{\"fenced\":true}"))]
    #[case("no json here", None)]
    #[case("} backwards {", None)]
    #[case("only { open", None)]
    fn test_extract(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_json_candidate(text).map(|(s, _)| s), expected);
    }

    #[test]
    fn test_empty_fence_falls_back_to_braces() {
        let text = "```json\n```\n{\"x\":1}";
        assert_eq!(
            extract_json_candidate(text),
            Some(("{\"x\":1}", CandidateSource::BraceSpan))
        );
    }

    #[test]
    fn test_fence_interior_is_verbatim() {
        let text = "```json\n{\"elements\": [\n  {\"type\": \"text\"}\n]}\n```";
        let (candidate, source) = extract_json_candidate(text).unwrap();
        assert_eq!(source, CandidateSource::Fence);
        assert_eq!(candidate, "{\"elements\": [\n  {\"type\": \"text\"}\n]}");
    }
}
