//! Bulk ingestion of ideas.
//!
//! Three input shapes are supported:
//! - Structured text, one idea per line (`Title | I:2 | C:0.8 | E:1 | R:500 | T:ui,api`)
//! - Header-driven tables (CSV)
//! - JSON snapshots of ideas or partial records
//!
//! Field-level problems never fail a whole call. Text parsing drops a bad
//! token and keeps the rest of the line; table parsing drops a bad cell and
//! rejects a row only when it fails validation. Only input that can't be
//! broken into rows at all is a hard error.

pub mod table;
pub mod text;

pub use table::{RowRejection, TableImport, parse_table, parse_table_fields};
pub use text::{TextParse, parse_line, parse_text, parse_text_detailed};

use crate::models::{Idea, IdeaFields};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A field value that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    /// Line number (text, 1-based) or data row index (table, 0-based)
    pub row: usize,
    /// Field name or raw token prefix
    pub field: String,
    /// The rejected raw value
    pub value: String,
    pub reason: String,
}

impl FieldWarning {
    pub(crate) fn new(
        row: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let warning = Self {
            row,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        };
        tracing::debug!(
            row = warning.row,
            field = %warning.field,
            value = %warning.value,
            reason = %warning.reason,
            "dropping field"
        );
        warning
    }
}

/// Input payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Text,
    Csv,
    Json,
}

impl InputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(InputFormat::Text),
            "csv" => Some(InputFormat::Csv),
            "json" => Some(InputFormat::Json),
            _ => None,
        }
    }

    /// Guess from a file extension, falling back to text.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
            .unwrap_or(InputFormat::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Text => "text",
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
        }
    }
}

#[derive(Deserialize)]
struct JsonRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(flatten)]
    fields: IdeaFields,
}

/// Parse a JSON array of ideas.
///
/// Entries with an `id` are snapshots and must carry a valid RFC 3339
/// `created_at`; both are kept as given. Entries without an `id` are partial
/// records and get a fresh id and creation time.
pub fn parse_json(raw: &str) -> Result<Vec<Idea>> {
    let records: Vec<JsonRecord> = serde_json::from_str(raw)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record.id {
            Some(id) => {
                let created_at = record
                    .created_at
                    .as_deref()
                    .and_then(|ts| ts.parse::<DateTime<Utc>>().ok())
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "record {} (id {}): created_at must be an RFC 3339 timestamp, got {}",
                            index,
                            id,
                            record.created_at.as_deref().unwrap_or("nothing")
                        ))
                    })?;
                Ok(Idea {
                    id,
                    created_at,
                    fields: record.fields,
                })
            }
            None => Ok(Idea::new(record.fields)),
        })
        .collect()
}

/// Parse a finite number, rejecting `inf` and `NaN`.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
