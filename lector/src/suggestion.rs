//! Canonical suggestions parsed from the service's XML response.
//!
//! The service answers with a root element holding zero or more `<error>`
//! records:
//!
//! ```text
//! <matches>
//!   <error offset="0" errorlength="3" ruleId="MORFOLOGIK_RULE_EN_US"
//!          msg="Possible spelling mistake found" replacements="The#Teh"
//!          category="Possible Typo" subId="1" url="https://..."/>
//! </matches>
//! ```
//!
//! Records keep the order the service returned them in, which is not
//! necessarily sorted by offset.

use crate::error::{MalformedFieldSnafu, ProofreadError, Result};
use lector_service::ServiceError;
use roxmltree::Node;
use std::ops::Range;
use tracing::{debug, trace};

/// Rule that is always dropped: it flags whitespace between sentences and never
/// carries a useful correction.
pub const SENTENCE_WHITESPACE_RULE: &str = "SENTENCE_WHITESPACE";

/// Separator between alternatives in the `replacements` attribute.
pub const REPLACEMENT_DELIMITER: char = '#';

/// Column at which messages are wrapped for display.
pub const DEFAULT_WRAP_WIDTH: usize = 50;

/// Broad class of a suggestion, used to pick its highlight style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    Spelling,
    Grammar,
}

impl SuggestionKind {
    /// Classify a rule id. Speller and dictionary-based rules are spelling
    /// errors; everything else is grammar.
    pub fn from_rule_id(rule_id: &str) -> Self {
        if rule_id.contains("SPELLER_RULE")
            || rule_id.starts_with("MORFOLOGIK_RULE")
            || rule_id == "HUNSPELL_RULE"
            || rule_id == "HUNSPELL_NO_SUGGEST_RULE"
        {
            SuggestionKind::Spelling
        } else {
            SuggestionKind::Grammar
        }
    }
}

/// One proofreading suggestion in plain-text coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Start of the span, in UTF-16 code units of the extracted text.
    pub offset: usize,
    pub length: usize,
    /// Message as sent by the service.
    pub message: String,
    /// Message with line breaks inserted for display.
    pub display_message: String,
    pub rule_id: String,
    pub sub_id: Option<String>,
    pub category: String,
    /// Alternatives in service order; may be empty.
    pub replacement_options: Vec<String>,
    pub more_info_url: Option<String>,
    pub kind: SuggestionKind,
}

impl Suggestion {
    /// A suggestion with an empty message and no replacements.
    pub fn new(offset: usize, length: usize, rule_id: impl Into<String>) -> Self {
        let rule_id = rule_id.into();
        Self {
            offset,
            length,
            message: String::new(),
            display_message: String::new(),
            kind: SuggestionKind::from_rule_id(&rule_id),
            rule_id,
            sub_id: None,
            category: String::new(),
            replacement_options: Vec::new(),
            more_info_url: None,
        }
    }

    /// Exclusive end of the span.
    pub fn span_end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    pub fn span(&self) -> Range<usize> {
        self.offset..self.span_end()
    }
}

/// Suggestions from a response, with the records that could not be parsed.
#[derive(Debug, Default)]
pub struct ParsedResponse {
    pub suggestions: Vec<Suggestion>,
    pub rejected: Vec<ProofreadError>,
}

/// Turns service responses into [`Suggestion`]s.
#[derive(Debug, Clone)]
pub struct SuggestionParser {
    wrap_width: usize,
    ignored_rules: Vec<String>,
}

impl Default for SuggestionParser {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            ignored_rules: Vec::new(),
        }
    }
}

impl SuggestionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column used for [`Suggestion::display_message`]. Zero disables wrapping.
    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width;
        self
    }

    /// Rules dropped in addition to [`SENTENCE_WHITESPACE_RULE`].
    pub fn with_ignored_rules(mut self, rules: impl IntoIterator<Item = String>) -> Self {
        self.ignored_rules = rules.into_iter().collect();
        self
    }

    /// Parse every record, failing on the first malformed one.
    pub fn parse(&self, response: &str) -> Result<Vec<Suggestion>> {
        let parsed = self.parse_lenient(response)?;
        match parsed.rejected.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(parsed.suggestions),
        }
    }

    /// Parse every record, setting malformed ones aside instead of failing.
    ///
    /// Only a body that is not XML at all fails the whole response.
    pub fn parse_lenient(&self, response: &str) -> Result<ParsedResponse> {
        let document = roxmltree::Document::parse(response).map_err(|error| {
            ProofreadError::ServiceUnavailable {
                source: ServiceError::MalformedBody {
                    message: error.to_string(),
                },
            }
        })?;

        let mut parsed = ParsedResponse::default();
        let records = document
            .descendants()
            .filter(|node| node.is_element() && node.has_tag_name("error"));

        for (index, record) in records.enumerate() {
            let rule_id = record.attribute("ruleId").unwrap_or_default();
            if self.is_ignored(rule_id) {
                trace!(index, rule_id, "dropping ignored rule");
                continue;
            }
            match self.parse_record(index, record) {
                Ok(suggestion) => parsed.suggestions.push(suggestion),
                Err(error) => parsed.rejected.push(error),
            }
        }

        debug!(
            suggestions = parsed.suggestions.len(),
            rejected = parsed.rejected.len(),
            "parsed proofreading response"
        );
        Ok(parsed)
    }

    fn is_ignored(&self, rule_id: &str) -> bool {
        rule_id == SENTENCE_WHITESPACE_RULE || self.ignored_rules.iter().any(|r| r == rule_id)
    }

    fn parse_record(&self, index: usize, record: Node<'_, '_>) -> Result<Suggestion> {
        let offset = parse_count(index, "offset", record.attribute("offset"))?;
        let length = parse_count(index, "errorlength", record.attribute("errorlength"))?;
        let message = record.attribute("msg").unwrap_or_default().to_string();
        let rule_id = record.attribute("ruleId").unwrap_or_default().to_string();

        Ok(Suggestion {
            offset,
            length,
            display_message: wrap_message(&message, self.wrap_width).join("\n"),
            message,
            kind: SuggestionKind::from_rule_id(&rule_id),
            rule_id,
            sub_id: record.attribute("subId").map(str::to_string),
            category: record.attribute("category").unwrap_or_default().to_string(),
            replacement_options: split_replacements(record.attribute("replacements")),
            more_info_url: record
                .attribute("url")
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        })
    }
}

fn parse_count(index: usize, field: &'static str, value: Option<&str>) -> Result<usize> {
    let raw = value.unwrap_or_default();
    raw.trim().parse::<usize>().ok().ok_or_else(|| {
        MalformedFieldSnafu {
            index,
            field,
            value: raw,
        }
        .build()
    })
}

/// Split a `#`-delimited replacement list, dropping empty alternatives.
pub fn split_replacements(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(REPLACEMENT_DELIMITER)
            .filter(|option| !option.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Break `message` into display lines of at most `width` characters.
///
/// A line ends after the last whitespace at or before column `width`. When a
/// run of `width` characters has no whitespace to break at, the line is cut
/// after `width` characters. Whitespace around a break is dropped.
pub fn wrap_message(message: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = message.chars().collect();
    if width == 0 || chars.len() <= width {
        return vec![message.to_string()];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        if chars.len() - start <= width {
            lines.push(chars[start..].iter().collect::<String>());
            break;
        }

        let break_at = (1..=width)
            .rev()
            .find(|&k| chars[start + k].is_whitespace())
            .map(|k| start + k + 1)
            .unwrap_or(start + width);

        let line: String = chars[start..break_at].iter().collect();
        lines.push(line.trim_end().to_string());
        start = break_at;
        while chars.get(start).is_some_and(|c| c.is_whitespace()) {
            start += 1;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use lector_service::test::{response_xml, MockError};

    #[test]
    fn classifies_rule_ids() {
        use SuggestionKind::*;
        assert_eq!(SuggestionKind::from_rule_id("MORFOLOGIK_RULE_EN_US"), Spelling);
        assert_eq!(SuggestionKind::from_rule_id("GERMAN_SPELLER_RULE"), Spelling);
        assert_eq!(SuggestionKind::from_rule_id("HUNSPELL_RULE"), Spelling);
        assert_eq!(SuggestionKind::from_rule_id("HUNSPELL_NO_SUGGEST_RULE"), Spelling);
        assert_eq!(SuggestionKind::from_rule_id("HUNSPELL_RULE_2"), Grammar);
        assert_eq!(SuggestionKind::from_rule_id("EN_MORFOLOGIK_RULE"), Grammar);
        assert_eq!(SuggestionKind::from_rule_id("UPPERCASE_SENTENCE_START"), Grammar);
        assert_eq!(SuggestionKind::from_rule_id(""), Grammar);
    }

    #[test]
    fn parses_all_fields() {
        let xml = response_xml(&[MockError::new(0, 3, "MORFOLOGIK_RULE_EN_US")
            .message("Possible spelling mistake found")
            .category("Possible Typo")
            .replacements("The#Teh")
            .sub_id("1")
            .url("https://example.org/rule")]);

        let suggestions = SuggestionParser::new().parse(&xml).unwrap();
        assert_eq!(
            suggestions,
            vec![Suggestion {
                offset: 0,
                length: 3,
                message: "Possible spelling mistake found".to_string(),
                display_message: "Possible spelling mistake found".to_string(),
                rule_id: "MORFOLOGIK_RULE_EN_US".to_string(),
                sub_id: Some("1".to_string()),
                category: "Possible Typo".to_string(),
                replacement_options: vec!["The".to_string(), "Teh".to_string()],
                more_info_url: Some("https://example.org/rule".to_string()),
                kind: SuggestionKind::Spelling,
            }]
        );
    }

    #[test]
    fn keeps_service_order() {
        let xml = response_xml(&[
            MockError::new(20, 2, "A"),
            MockError::new(3, 1, "B"),
            MockError::new(9, 4, "C"),
        ]);
        let offsets: Vec<usize> = SuggestionParser::new()
            .parse(&xml)
            .unwrap()
            .iter()
            .map(|s| s.offset)
            .collect();
        assert_eq!(offsets, vec![20, 3, 9]);
    }

    #[test]
    fn sentence_whitespace_is_always_dropped() {
        let xml = response_xml(&[
            MockError::new(0, 1, SENTENCE_WHITESPACE_RULE).replacements(" "),
            MockError::new(5, 2, "COMMA_PARENTHESIS_WHITESPACE"),
            MockError::new(5, 2, SENTENCE_WHITESPACE_RULE).raw_offset("nope"),
        ]);

        let parsed = SuggestionParser::new().parse_lenient(&xml).unwrap();
        assert!(parsed.rejected.is_empty());
        assert_eq!(parsed.suggestions.len(), 1);
        assert_eq!(parsed.suggestions[0].rule_id, "COMMA_PARENTHESIS_WHITESPACE");
    }

    #[test]
    fn configured_rules_are_dropped() {
        let xml = response_xml(&[
            MockError::new(0, 1, "EN_QUOTES"),
            MockError::new(2, 1, "WHITESPACE_RULE"),
        ]);
        let suggestions = SuggestionParser::new()
            .with_ignored_rules(["EN_QUOTES".to_string()])
            .parse(&xml)
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].rule_id, "WHITESPACE_RULE");
    }

    #[test]
    fn missing_replacements_default_to_empty() {
        let xml = response_xml(&[
            MockError::new(0, 1, "A"),
            MockError::new(1, 1, "B").replacements(""),
            MockError::new(2, 1, "C").replacements("x##y#"),
        ]);
        let suggestions = SuggestionParser::new().parse(&xml).unwrap();
        assert!(suggestions[0].replacement_options.is_empty());
        assert!(suggestions[1].replacement_options.is_empty());
        assert_eq!(suggestions[2].replacement_options, vec!["x", "y"]);
    }

    #[test]
    fn non_numeric_offset_is_malformed() {
        let xml = response_xml(&[
            MockError::new(0, 1, "A"),
            MockError::new(0, 1, "B").raw_offset("twelve"),
        ]);

        let err = SuggestionParser::new().parse(&xml).unwrap_err();
        assert!(matches!(
            err,
            ProofreadError::MalformedField { index: 1, field: "offset", ref value } if value == "twelve"
        ));
    }

    #[test]
    fn negative_length_is_malformed() {
        let xml = response_xml(&[MockError::new(0, 1, "A").raw_length("-1")]);
        let err = SuggestionParser::new().parse(&xml).unwrap_err();
        assert!(matches!(
            err,
            ProofreadError::MalformedField {
                field: "errorlength",
                ..
            }
        ));
    }

    #[test]
    fn lenient_parse_skips_malformed_records() {
        let xml = response_xml(&[
            MockError::new(0, 1, "A"),
            MockError::new(0, 1, "B").raw_length(""),
            MockError::new(4, 2, "C"),
        ]);

        let parsed = SuggestionParser::new().parse_lenient(&xml).unwrap();
        let rules: Vec<&str> = parsed.suggestions.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["A", "C"]);
        assert_eq!(parsed.rejected.len(), 1);
    }

    #[test]
    fn error_records_are_found_at_any_depth() {
        let xml = r#"<matches><language name="English"/><errors><error offset="1" errorlength="2" ruleId="X" msg="m"/></errors></matches>"#;
        let suggestions = SuggestionParser::new().parse(xml).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].span(), 1..3);
    }

    #[test]
    fn empty_response_has_no_suggestions() {
        let suggestions = SuggestionParser::new().parse("<matches/>").unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn non_xml_is_service_unavailable() {
        let err = SuggestionParser::new()
            .parse("<html><body>502 Bad Gateway")
            .unwrap_err();
        assert!(matches!(
            err,
            ProofreadError::ServiceUnavailable {
                source: ServiceError::MalformedBody { .. }
            }
        ));
    }

    #[test]
    fn short_messages_are_not_wrapped() {
        assert_eq!(wrap_message("Possible typo", 50), vec!["Possible typo"]);
        assert_eq!(wrap_message("", 50), vec![""]);
    }

    #[test]
    fn wraps_at_last_whitespace_before_width() {
        let message = "This sentence does not start with an uppercase letter and goes on";
        let lines = wrap_message(message, 50);
        assert_eq!(
            lines,
            vec![
                "This sentence does not start with an uppercase",
                "letter and goes on",
            ]
        );
        assert!(lines.iter().all(|line| line.chars().count() <= 50));
    }

    #[test]
    fn cuts_long_words() {
        let word = "x".repeat(120);
        let lines = wrap_message(&word, 50);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 50);
        assert_eq!(lines[1].len(), 50);
        assert_eq!(lines[2].len(), 20);
    }

    #[test]
    fn whitespace_exactly_at_width_breaks_there() {
        let message = format!("{} tail", "a".repeat(50));
        assert_eq!(wrap_message(&message, 50), vec!["a".repeat(50), "tail".to_string()]);
    }

    #[test]
    fn whitespace_run_at_break_is_dropped() {
        let message = format!("{}{}tail", "a".repeat(45), " ".repeat(10));
        assert_eq!(
            wrap_message(&message, 50),
            vec!["a".repeat(45), "tail".to_string()]
        );
    }

    #[test]
    fn display_message_uses_newlines() {
        let message = "Use a comma before 'and' if it connects two independent clauses (unless they are closely connected and short).";
        let xml = response_xml(&[MockError::new(0, 1, "COMMA_COMPOUND_SENTENCE").message(message)]);
        let suggestion = SuggestionParser::new().parse(&xml).unwrap().remove(0);

        assert_eq!(suggestion.message, message);
        assert!(suggestion.display_message.contains('\n'));
        assert_eq!(
            suggestion.display_message.replace('\n', " "),
            message.to_string()
        );
    }
}
