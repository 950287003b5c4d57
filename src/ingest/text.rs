//! Structured text parser.
//!
//! Grammar, one idea per line:
//!
//! ```text
//! Title [| Field:Value]*
//! ```
//!
//! | Prefix | Field      | Accepted values                         |
//! |--------|------------|-----------------------------------------|
//! | `I`    | impact     | 0.25, 0.5, 1, 2, 3 or Tiny..Massive     |
//! | `C`    | confidence | number in [0, 1]                        |
//! | `E`    | effort     | number > 0                              |
//! | `R`    | reach      | number > 0                              |
//! | `T`    | tags       | comma-separated labels                  |
//!
//! Prefixes are case-insensitive and may appear in any order. A token that
//! fails its check is dropped on its own; the title and the other tokens are
//! kept. Tokens with an unknown prefix are dropped too, never appended to the title.

use super::{FieldWarning, parse_number};
use crate::models::{IdeaFields, Impact, is_positive};
use serde::Serialize;

/// Records parsed from a text payload plus the tokens that were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextParse {
    pub records: Vec<IdeaFields>,
    /// 1-based line number of each record, parallel to `records`
    #[serde(skip)]
    pub lines: Vec<usize>,
    pub warnings: Vec<FieldWarning>,
}

/// Parse every non-blank line into a partial record.
pub fn parse_text(raw: &str) -> Vec<IdeaFields> {
    parse_text_detailed(raw).records
}

/// Like [`parse_text`], also reporting dropped tokens with their 1-based line number.
pub fn parse_text_detailed(raw: &str) -> TextParse {
    let mut result = TextParse::default();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (record, warnings) = parse_line_with_warnings(line, index + 1);
        result.records.push(record);
        result.lines.push(index + 1);
        result.warnings.extend(warnings);
    }
    result
}

/// Parse a single line. Every scoring field that survives is tagged `user`.
pub fn parse_line(line: &str) -> IdeaFields {
    parse_line_with_warnings(line, 1).0
}

fn parse_line_with_warnings(line: &str, line_no: usize) -> (IdeaFields, Vec<FieldWarning>) {
    let mut segments = line.split('|');
    let title = segments.next().unwrap_or_default().trim();
    let mut fields = IdeaFields::new(title);
    let mut warnings = Vec::new();

    for token in segments {
        if let Err(warning) = apply_token(&mut fields, token, line_no) {
            warnings.push(warning);
        }
    }

    fields.mark_present_as_user();
    (fields, warnings)
}

fn apply_token(
    fields: &mut IdeaFields,
    token: &str,
    line_no: usize,
) -> Result<(), FieldWarning> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(());
    }

    let Some((prefix, value)) = token.split_once(':') else {
        return Err(FieldWarning::new(line_no, token, "", "missing field prefix"));
    };
    let prefix = prefix.trim();
    let value = value.trim();
    let reject = |reason: &str| FieldWarning::new(line_no, prefix, value, reason);

    match prefix.to_ascii_uppercase().as_str() {
        "I" => {
            let impact = Impact::parse(value)
                .ok_or_else(|| reject("impact must be one of 0.25, 0.5, 1, 2, 3"))?;
            fields.impact = Some(impact);
        }
        "C" => {
            let confidence = parse_number(value)
                .filter(|c| (0.0..=1.0).contains(c))
                .ok_or_else(|| reject("confidence must be between 0 and 1"))?;
            fields.confidence = Some(confidence);
        }
        "E" => {
            let effort = parse_number(value)
                .filter(|e| is_positive(*e))
                .ok_or_else(|| reject("effort must be greater than 0"))?;
            fields.effort = Some(effort);
        }
        "R" => {
            let reach = parse_number(value)
                .filter(|r| is_positive(*r))
                .ok_or_else(|| reject("reach must be greater than 0"))?;
            fields.reach = Some(reach);
        }
        "T" => fields.add_tags(value.split(',')),
        _ => return Err(reject("unknown field prefix")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldSource, ScoringField};

    #[test]
    fn test_full_line() {
        let f = parse_line("Add dark mode | I:1 | C:0.9 | E:0.5 | T:ui");
        assert_eq!(f.title, "Add dark mode");
        assert_eq!(f.impact, Some(Impact::Medium));
        assert_eq!(f.confidence, Some(0.9));
        assert_eq!(f.effort, Some(0.5));
        assert_eq!(f.reach, None);
        assert_eq!(f.tags, vec!["ui"]);
    }

    #[test]
    fn test_title_only_line() {
        let f = parse_line("  Just a thought  ");
        assert_eq!(f, IdeaFields::new("Just a thought"));
    }

    #[test]
    fn test_field_order_is_free_and_case_insensitive() {
        let f = parse_line("X | r:1000 | t:api,perf | e:3 | i:large | c:1");
        assert_eq!(f.reach, Some(1000.0));
        assert_eq!(f.impact, Some(Impact::Large));
        assert_eq!(f.effort, Some(3.0));
        assert_eq!(f.confidence, Some(1.0));
        assert_eq!(f.tags, vec!["api", "perf"]);
    }

    #[test]
    fn test_invalid_impact_is_dropped_not_clamped() {
        let f = parse_line("Y | I:7 | E:2");
        assert_eq!(f.impact, None);
        assert_eq!(f.effort, Some(2.0));
    }

    #[test]
    fn test_out_of_range_values_are_dropped() {
        let f = parse_line("Z | C:1.5 | E:0 | R:-4 | I:2");
        assert_eq!(f.confidence, None);
        assert_eq!(f.effort, None);
        assert_eq!(f.reach, None);
        assert_eq!(f.impact, Some(Impact::Large));
    }

    #[test]
    fn test_unknown_and_malformed_tokens_not_appended_to_title() {
        let f = parse_line("Title | Q:5 | nonsense | E:1");
        assert_eq!(f.title, "Title");
        assert_eq!(f.effort, Some(1.0));
    }

    #[test]
    fn test_parsed_fields_tagged_user() {
        let f = parse_line("P | I:2 | C:0.5 | E:x");
        assert_eq!(f.provenance.get(ScoringField::Impact), Some(FieldSource::User));
        assert_eq!(
            f.provenance.get(ScoringField::Confidence),
            Some(FieldSource::User)
        );
        assert_eq!(f.provenance.get(ScoringField::Effort), None);
        assert_eq!(f.provenance.get(ScoringField::Reach), None);
    }

    #[test]
    fn test_duplicate_tags_removed() {
        let f = parse_line("Tags | T:ui, ui ,,api");
        assert_eq!(f.tags, vec!["ui", "api"]);
    }

    #[test]
    fn test_parse_text_skips_blank_lines() {
        let raw = "First | E:1\n\n   \nSecond\r\nThird | I:3\n";
        let records = parse_text(raw);
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_warnings_carry_line_numbers() {
        let parsed = parse_text_detailed("Ok | E:1\n\nBad | I:9 | E:-1\n");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.lines, vec![1, 3]);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed.warnings.iter().all(|w| w.row == 3));
        assert_eq!(parsed.warnings[0].field, "I");
        assert_eq!(parsed.warnings[0].value, "9");
    }

    #[test]
    fn test_value_containing_colon() {
        // Only the first colon splits prefix from value
        let f = parse_line("Colon | T:a:b");
        assert_eq!(f.tags, vec!["a:b"]);
    }
}
