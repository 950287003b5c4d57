//! Export of ideas to the structured text and table formats.
//!
//! Text export is the inverse of [`crate::ingest::parse_text`]: parsing the
//! output gives back the same title, scoring fields and tags. The line grammar
//! has no escaping, so a `|` in a title is written as `/`, a `,` or `|`
//! inside a tag becomes a space, and line breaks in either become a space.
//!
//! Table export joins tags with `;`, so a `;` inside a tag becomes a space.

use crate::models::IdeaFields;
use crate::scoring::RankedIdea;

/// Columns written by [`export_table`].
pub const TABLE_HEADER: [&str; 8] = [
    "title",
    "notes",
    "reach",
    "impact",
    "confidence",
    "effort",
    "tags",
    "score",
];

/// Render records as structured text, one line each.
pub fn export_text<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a IdeaFields>,
{
    let mut out = String::new();
    for fields in records {
        out.push_str(&format_line(fields));
        out.push('\n');
    }
    out
}

/// Render one record as a structured text line. Absent fields are omitted.
pub fn format_line(fields: &IdeaFields) -> String {
    let mut line = single_line(&fields.title).replace('|', "/");
    if let Some(impact) = fields.impact {
        line.push_str(&format!(" | I:{}", impact.value()));
    }
    if let Some(confidence) = fields.confidence {
        line.push_str(&format!(" | C:{}", confidence));
    }
    if let Some(effort) = fields.effort {
        line.push_str(&format!(" | E:{}", effort));
    }
    if let Some(reach) = fields.reach {
        line.push_str(&format!(" | R:{}", reach));
    }
    if !fields.tags.is_empty() {
        let tags: Vec<String> = fields
            .tags
            .iter()
            .map(|tag| single_line(tag).replace([',', '|'], " "))
            .collect();
        line.push_str(&format!(" | T:{}", tags.join(",")));
    }
    line
}

/// Render a ranking as CSV with a header row.
///
/// `score` is rounded to `precision` decimals and left empty for unscorable
/// ideas. `tags` is always quoted and joined with `;`.
pub fn export_table(ranked: &[RankedIdea<'_>], precision: usize) -> String {
    let mut out = TABLE_HEADER.join(",");
    out.push('\n');

    for entry in ranked {
        let fields = &entry.idea.fields;
        let cells = [
            csv_cell(&fields.title),
            csv_cell(fields.notes.as_deref().unwrap_or_default()),
            number_cell(fields.reach),
            number_cell(fields.impact.map(|i| i.value())),
            number_cell(fields.confidence),
            number_cell(fields.effort),
            quoted(&table_tags(&fields.tags)),
            entry
                .score
                .map(|score| format!("{:.*}", precision, score))
                .unwrap_or_default(),
        ];
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn single_line(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

fn table_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.replace(';', " "))
        .collect::<Vec<_>>()
        .join(";")
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a cell only when it contains a delimiter, quote or line break.
fn csv_cell(value: &str) -> String {
    if value.contains([',', ';', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
