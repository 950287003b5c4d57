//! Header-driven table (CSV) import.
//!
//! Recognized headers, case-insensitive: `title`, `notes`, `reach`, `impact`,
//! `confidence`, `effort`, `tags`. Other columns (such as an exported `score`)
//! are ignored. The `tags` cell is semicolon-separated. Cells follow the usual
//! CSV quoting rules: a quoted cell may contain commas, semicolons and line
//! breaks, and `""` inside quotes is a literal quote.
//!
//! Each data row is checked with [`validate`]. Rows that fail are rejected with
//! their reasons while the rest of the batch is still accepted.

use super::{FieldWarning, parse_number};
use crate::models::validation::validate;
use crate::models::{Idea, IdeaFields, Impact, ScoringModel};
use crate::{Error, Result};
use serde::Serialize;

/// A data row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// Where the record came from: the 0-based data row for tables (the header
    /// is not counted) and JSON arrays, the 1-based line number for text
    pub row: usize,
    pub reasons: Vec<String>,
}

/// Outcome of a table import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableImport {
    pub accepted: Vec<Idea>,
    pub rejected: Vec<RowRejection>,
    /// Cells that could not be parsed and were left empty
    pub warnings: Vec<FieldWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Title,
    Notes,
    Reach,
    Impact,
    Confidence,
    Effort,
    Tags,
}

impl Column {
    fn parse(header: &str) -> Option<Self> {
        match header.trim().to_lowercase().as_str() {
            "title" => Some(Column::Title),
            "notes" => Some(Column::Notes),
            "reach" => Some(Column::Reach),
            "impact" => Some(Column::Impact),
            "confidence" => Some(Column::Confidence),
            "effort" => Some(Column::Effort),
            "tags" => Some(Column::Tags),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::Notes => "notes",
            Column::Reach => "reach",
            Column::Impact => "impact",
            Column::Confidence => "confidence",
            Column::Effort => "effort",
            Column::Tags => "tags",
        }
    }
}

/// Import a table, validating each row under `model`.
///
/// Fails only when the input has no usable header: it has no non-blank record
/// or none of the headers is recognized. Also fails on an
/// unterminated quoted cell, since the rows can't be recovered.
pub fn parse_table(raw: &str, model: ScoringModel) -> Result<TableImport> {
    let (rows, warnings) = parse_table_fields(raw)?;

    let mut import = TableImport {
        warnings,
        ..Default::default()
    };
    for (row, fields) in rows.into_iter().enumerate() {
        let reasons = validate(&fields, model);
        if reasons.is_empty() {
            import.accepted.push(Idea::new(fields));
        } else {
            tracing::debug!(row, ?reasons, "rejecting row");
            import.rejected.push(RowRejection { row, reasons });
        }
    }

    tracing::debug!(
        accepted = import.accepted.len(),
        rejected = import.rejected.len(),
        "table import finished"
    );
    Ok(import)
}

/// Parse a table into partial records, one per data row, without validating them.
pub fn parse_table_fields(raw: &str) -> Result<(Vec<IdeaFields>, Vec<FieldWarning>)> {
    let mut records = read_records(raw)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| Error::MalformedTable("table is empty: missing header row".to_string()))?;
    let columns: Vec<Option<Column>> = header.iter().map(|h| Column::parse(h)).collect();
    if columns.iter().all(Option::is_none) {
        return Err(Error::MalformedTable(format!(
            "no recognized columns in header '{}' (expected title, notes, reach, impact, confidence, effort, tags)",
            header.join(",")
        )));
    }

    let mut warnings = Vec::new();
    let rows: Vec<IdeaFields> = records
        .enumerate()
        .map(|(row, cells)| parse_row(row, &columns, &cells, &mut warnings))
        .collect();
    Ok((rows, warnings))
}

fn parse_row(
    row: usize,
    columns: &[Option<Column>],
    cells: &[String],
    warnings: &mut Vec<FieldWarning>,
) -> IdeaFields {
    let mut fields = IdeaFields::default();
    let mut seen: Vec<Column> = Vec::new();

    for (column, cell) in columns.iter().zip(cells) {
        // First occurrence of a repeated header wins
        let Some(column) = *column else { continue };
        if seen.contains(&column) {
            continue;
        }
        seen.push(column);

        let value = cell.trim();
        if value.is_empty() {
            continue;
        }

        let number = |warnings: &mut Vec<FieldWarning>| {
            let parsed = parse_number(value);
            if parsed.is_none() {
                warnings.push(FieldWarning::new(row, column.name(), value, "not a number"));
            }
            parsed
        };

        match column {
            Column::Title => fields.title = value.to_string(),
            Column::Notes => fields.notes = Some(value.to_string()),
            Column::Tags => fields.add_tags(value.split(';')),
            Column::Reach => fields.reach = number(warnings),
            Column::Confidence => fields.confidence = number(warnings),
            Column::Effort => fields.effort = number(warnings),
            Column::Impact => {
                fields.impact = Impact::parse(value);
                if fields.impact.is_none() {
                    warnings.push(FieldWarning::new(
                        row,
                        column.name(),
                        value,
                        "impact must be one of 0.25, 0.5, 1, 2, 3",
                    ));
                }
            }
        }
    }

    fields
}

/// Split CSV text into records of unquoted cells.
///
/// Blank records (every cell empty after trimming, as in a bare `,,,` line) are
/// skipped. `\r\n` and `\n` both end a record outside quotes.
pub(crate) fn read_records(raw: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut cell_started_quoted = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push(c);
                }
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if cell.is_empty() && !cell_started_quoted => {
                in_quotes = true;
                cell_started_quoted = true;
                quote_line = line;
            }
            ',' => {
                record.push(std::mem::take(&mut cell));
                cell_started_quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut cell));
                cell_started_quoted = false;
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(Error::MalformedTable(format!(
            "unterminated quoted field starting on line {}",
            quote_line
        )));
    }

    if !cell.is_empty() || cell_started_quoted || !record.is_empty() {
        record.push(cell);
        push_record(&mut records, record);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.iter().any(|cell| !cell.trim().is_empty()) {
        records.push(record);
    }
}
