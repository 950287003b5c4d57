//! Command implementations for the icerank CLI.
//!
//! Each command takes already-resolved settings plus the raw input payload and
//! returns a result struct implementing [`Output`]. Reading files and stdin,
//! config precedence and printing happen in `main`.

use crate::config::{self, IcerankConfig, ResolvedConfig};
use crate::export;
use crate::ingest::{
    self, FieldWarning, InputFormat, RowRejection, parse_table, parse_table_fields,
    parse_text_detailed,
};
use crate::models::validation::validate;
use crate::models::{Idea, IdeaFields, ScoringModel, Weights};
use crate::scoring::{self, Quadrant, Status, ThresholdMode, Thresholds};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Read a payload from a file, or from stdin when `file` is "-".
pub fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    std::fs::read_to_string(file).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(format!("input file {}", file)),
        _ => Error::Other(format!("Failed to read {}: {}", file, e)),
    })
}

/// Pick the input format: explicit `--format`, else the file extension, else text.
pub fn resolve_format(file: &str, explicit: Option<&str>) -> Result<InputFormat> {
    match explicit {
        Some(name) => InputFormat::parse(name)
            .ok_or_else(|| Error::InvalidInput(format!("unknown input format '{}'", name))),
        None if file == "-" => Ok(InputFormat::Text),
        None => Ok(InputFormat::from_path(Path::new(file))),
    }
}

/// Partial records read from a payload, before validation.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<IdeaFields>,
    /// 1-based source line of each record (text input only)
    pub lines: Vec<usize>,
    pub warnings: Vec<FieldWarning>,
}

/// Parse a payload into partial records without validating them.
pub fn load_records(raw: &str, format: InputFormat) -> Result<LoadedRecords> {
    match format {
        InputFormat::Text => {
            let parsed = parse_text_detailed(raw);
            Ok(LoadedRecords {
                records: parsed.records,
                lines: parsed.lines,
                warnings: parsed.warnings,
            })
        }
        InputFormat::Csv => {
            let (records, warnings) = parse_table_fields(raw)?;
            Ok(LoadedRecords {
                records,
                warnings,
                ..Default::default()
            })
        }
        InputFormat::Json => Ok(LoadedRecords {
            records: ingest::parse_json(raw)?
                .into_iter()
                .map(|idea| idea.fields)
                .collect(),
            ..Default::default()
        }),
    }
}

/// Ideas that passed validation, plus what was dropped on the way.
#[derive(Debug, Default)]
pub struct LoadedIdeas {
    pub ideas: Vec<Idea>,
    pub rejected: Vec<RowRejection>,
    pub warnings: Vec<FieldWarning>,
}

/// Parse and validate a payload under `model`. Invalid records are rejected,
/// keyed by line number for text and by index for tables and JSON.
pub fn load_ideas(raw: &str, format: InputFormat, model: ScoringModel) -> Result<LoadedIdeas> {
    if format == InputFormat::Csv {
        let import = parse_table(raw, model)?;
        return Ok(LoadedIdeas {
            ideas: import.accepted,
            rejected: import.rejected,
            warnings: import.warnings,
        });
    }

    let (candidates, warnings): (Vec<(usize, Idea)>, _) = match format {
        InputFormat::Json => (
            ingest::parse_json(raw)?.into_iter().enumerate().collect(),
            Vec::new(),
        ),
        _ => {
            let parsed = parse_text_detailed(raw);
            let ideas = parsed
                .lines
                .into_iter()
                .zip(parsed.records.into_iter().map(Idea::new))
                .collect();
            (ideas, parsed.warnings)
        }
    };

    let mut loaded = LoadedIdeas {
        warnings,
        ..Default::default()
    };
    for (row, idea) in candidates {
        let reasons = validate(&idea.fields, model);
        if reasons.is_empty() {
            loaded.ideas.push(idea);
        } else {
            tracing::debug!(row, ?reasons, "rejecting record");
            loaded.rejected.push(RowRejection { row, reasons });
        }
    }
    Ok(loaded)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn summarize_fields(fields: &IdeaFields) -> String {
    let mut out = format!(
        "I:{} C:{} E:{}",
        fmt_opt(fields.impact.map(|i| i.value())),
        fmt_opt(fields.confidence),
        fmt_opt(fields.effort)
    );
    if let Some(reach) = fields.reach {
        out.push_str(&format!(" R:{}", reach));
    }
    if !fields.tags.is_empty() {
        out.push_str(&format!(" [{}]", fields.tags.join(", ")));
    }
    out
}

fn push_warnings(lines: &mut Vec<String>, warnings: &[FieldWarning], unit: &str) {
    if warnings.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{} warning(s):", warnings.len()));
    for w in warnings {
        lines.push(format!(
            "  {} {}: {} '{}' dropped ({})",
            unit, w.row, w.field, w.value, w.reason
        ));
    }
}

fn push_rejections(lines: &mut Vec<String>, rejected: &[RowRejection], unit: &str) {
    if rejected.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{} rejected:", rejected.len()));
    for r in rejected {
        lines.push(format!("  {} {}: {}", unit, r.row, r.reasons.join("; ")));
    }
}

#[derive(Serialize)]
pub struct ParseResult {
    pub count: usize,
    pub records: Vec<IdeaFields>,
    pub warnings: Vec<FieldWarning>,
}

impl Output for ParseResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} record(s):", self.count)];
        for (i, record) in self.records.iter().enumerate() {
            let title = if record.title.is_empty() {
                "(untitled)"
            } else {
                &record.title
            };
            lines.push(format!("  {}. {}  {}", i + 1, title, summarize_fields(record)));
        }
        push_warnings(&mut lines, &self.warnings, "line");
        lines.join("\n")
    }
}

/// Parse structured text into partial records.
pub fn parse(raw: &str) -> ParseResult {
    tracing::info!(command = "parse", "running");
    let parsed = parse_text_detailed(raw);
    ParseResult {
        count: parsed.records.len(),
        records: parsed.records,
        warnings: parsed.warnings,
    }
}

#[derive(Serialize)]
pub struct ImportResult {
    pub model: ScoringModel,
    pub accepted: Vec<Idea>,
    pub rejected: Vec<RowRejection>,
    pub warnings: Vec<FieldWarning>,
}

impl Output for ImportResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Imported {} idea(s), rejected {} row(s) ({})",
            self.accepted.len(),
            self.rejected.len(),
            self.model
        )];
        for idea in &self.accepted {
            lines.push(format!(
                "  {} {}  {}",
                idea.id,
                idea.fields.title,
                summarize_fields(&idea.fields)
            ));
        }
        push_rejections(&mut lines, &self.rejected, "row");
        push_warnings(&mut lines, &self.warnings, "row");
        lines.join("\n")
    }
}

/// Import a CSV table, validating rows under `model`.
pub fn import(raw: &str, model: ScoringModel) -> Result<ImportResult> {
    tracing::info!(command = "import", %model, "running");
    let import = parse_table(raw, model)?;
    Ok(ImportResult {
        model,
        accepted: import.accepted,
        rejected: import.rejected,
        warnings: import.warnings,
    })
}

#[derive(Serialize)]
pub struct RecordCheck {
    pub record: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub title: String,
    pub status: Status,
    pub violations: Vec<String>,
}

#[derive(Serialize)]
pub struct ValidateResult {
    pub model: ScoringModel,
    pub valid: usize,
    pub invalid: usize,
    pub records: Vec<RecordCheck>,
    pub warnings: Vec<FieldWarning>,
}

impl Output for ValidateResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} valid, {} with violations ({})",
            self.valid, self.invalid, self.model
        )];
        for check in &self.records {
            if check.violations.is_empty() {
                lines.push(format!(
                    "  {}. {} [{}]",
                    check.record, check.title, check.status
                ));
            } else {
                lines.push(format!("  {}. {} [invalid]", check.record, check.title));
                for violation in &check.violations {
                    lines.push(format!("       - {}", violation));
                }
            }
        }
        push_warnings(&mut lines, &self.warnings, "line/row");
        lines.join("\n")
    }
}

/// Report every violation of every record. Records index from 0; text records
/// also carry their source line.
pub fn validate_records(raw: &str, format: InputFormat, model: ScoringModel) -> Result<ValidateResult> {
    tracing::info!(command = "validate", %model, format = format.as_str(), "running");
    let loaded = load_records(raw, format)?;

    let records: Vec<RecordCheck> = loaded
        .records
        .iter()
        .enumerate()
        .map(|(record, fields)| {
            let violations = validate(fields, model);
            let status = if violations.is_empty() {
                scoring::status(fields, model)
            } else {
                Status::Invalid
            };
            RecordCheck {
                record,
                line: loaded.lines.get(record).copied(),
                title: fields.title.clone(),
                status,
                violations,
            }
        })
        .collect();

    let invalid = records.iter().filter(|r| !r.violations.is_empty()).count();
    Ok(ValidateResult {
        model,
        valid: records.len() - invalid,
        invalid,
        records,
        warnings: loaded.warnings,
    })
}

#[derive(Serialize)]
pub struct RankRow {
    pub position: usize,
    pub score: Option<f64>,
    pub status: Status,
    #[serde(flatten)]
    pub idea: Idea,
}

#[derive(Serialize)]
pub struct RankResult {
    pub model: ScoringModel,
    pub weights: Weights,
    pub ranked: Vec<RankRow>,
    pub rejected: Vec<RowRejection>,
    pub warnings: Vec<FieldWarning>,
}

impl Output for RankResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} idea(s) ranked by {}:", self.ranked.len(), self.model)];
        for row in &self.ranked {
            let score = row
                .score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "  {:>3}. {:>8}  {}  [{}]  {}",
                row.position,
                score,
                row.idea.fields.title,
                row.status,
                summarize_fields(&row.idea.fields)
            ));
        }
        push_rejections(&mut lines, &self.rejected, "line/row");
        push_warnings(&mut lines, &self.warnings, "line/row");
        lines.join("\n")
    }
}

/// Rank loaded ideas under the resolved model and weights.
pub fn rank(loaded: LoadedIdeas, settings: &ResolvedConfig) -> RankResult {
    let model = settings.model();
    tracing::info!(command = "rank", %model, ideas = loaded.ideas.len(), "running");

    let ranked = scoring::rank(&loaded.ideas, model, settings.weights())
        .into_iter()
        .map(|entry| RankRow {
            position: entry.position,
            score: entry.score,
            status: entry.status,
            idea: entry.idea.clone(),
        })
        .collect();

    RankResult {
        model,
        weights: *settings.weights(),
        ranked,
        rejected: loaded.rejected,
        warnings: loaded.warnings,
    }
}

#[derive(Serialize)]
pub struct QuadrantMember {
    pub id: String,
    pub title: String,
}

#[derive(Serialize)]
pub struct ClassifyResult {
    pub model: ScoringModel,
    /// "median" or "fixed"
    pub threshold_mode: &'static str,
    pub thresholds: Option<Thresholds>,
    pub quadrants: BTreeMap<Quadrant, Vec<QuadrantMember>>,
    /// Ideas left out: not valid, or too few valid ideas for median thresholds
    pub unclassified: Vec<QuadrantMember>,
    pub rejected: Vec<RowRejection>,
}

impl Output for ClassifyResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        match self.thresholds {
            Some(t) => lines.push(format!(
                "Thresholds ({}): effort <= {} is low, impact >= {} is high",
                self.threshold_mode, t.effort, t.impact
            )),
            None => lines.push(format!(
                "Not enough valid ideas to derive thresholds (need at least {})",
                scoring::quadrant::MIN_IDEAS_FOR_MEDIAN
            )),
        }
        for (quadrant, members) in &self.quadrants {
            lines.push(String::new());
            lines.push(format!("{} ({}):", quadrant.label(), members.len()));
            for member in members {
                lines.push(format!("  {} {}", member.id, member.title));
            }
        }
        if !self.unclassified.is_empty() {
            lines.push(String::new());
            lines.push(format!("Unclassified ({}):", self.unclassified.len()));
            for member in &self.unclassified {
                lines.push(format!("  {} {}", member.id, member.title));
            }
        }
        push_rejections(&mut lines, &self.rejected, "line/row");
        lines.join("\n")
    }
}

/// Classify loaded ideas into quadrants.
pub fn classify(loaded: LoadedIdeas, settings: &ResolvedConfig) -> ClassifyResult {
    let model = settings.model();
    let mode = settings.threshold_mode();
    tracing::info!(command = "classify", %model, ?mode, "running");

    let classification = scoring::classify(&loaded.ideas, model, mode);

    let mut quadrants: BTreeMap<Quadrant, Vec<QuadrantMember>> = BTreeMap::new();
    let mut unclassified = Vec::new();
    for idea in &loaded.ideas {
        let member = QuadrantMember {
            id: idea.id.clone(),
            title: idea.fields.title.clone(),
        };
        match classification.quadrants.get(&idea.id) {
            Some(quadrant) => quadrants.entry(*quadrant).or_default().push(member),
            None => unclassified.push(member),
        }
    }

    ClassifyResult {
        model,
        threshold_mode: match mode {
            ThresholdMode::Median => "median",
            ThresholdMode::Fixed(_) => "fixed",
        },
        thresholds: classification.thresholds,
        quadrants,
        unclassified,
        rejected: loaded.rejected,
    }
}

/// Rendered export document. Printed as-is, independent of `--human`.
#[derive(Debug)]
pub struct ExportResult {
    pub content: String,
    pub rejected: Vec<RowRejection>,
}

/// Render loaded ideas as structured text (input order) or a ranked CSV table.
pub fn export(loaded: LoadedIdeas, to: &str, settings: &ResolvedConfig) -> Result<ExportResult> {
    tracing::info!(command = "export", to, "running");
    let content = match to {
        "text" => export::export_text(loaded.ideas.iter().map(|idea| &idea.fields)),
        "csv" => {
            let ranked = scoring::rank(&loaded.ideas, settings.model(), settings.weights());
            export::export_table(&ranked, settings.precision())
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown export format '{}' (expected csv or text)",
                other
            )));
        }
    };
    if !loaded.rejected.is_empty() {
        tracing::warn!(rejected = loaded.rejected.len(), "records left out of export");
    }
    Ok(ExportResult {
        content,
        rejected: loaded.rejected,
    })
}

#[derive(Serialize)]
pub struct ConfigShowResult {
    pub path: Option<PathBuf>,
    pub config: ResolvedConfig,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let c = &self.config;
        let w = c.weights();
        let mut lines = vec![
            match self.path {
                Some(ref path) => format!("Config file: {}", path.display()),
                None => "Config file: (no config directory)".to_string(),
            },
            String::new(),
            format!("model = {} ({})", c.model(), c.model.source),
            format!(
                "weights = reach={} impact={} confidence={} effort={} ({})",
                w.reach, w.impact, w.confidence, w.effort, c.weights.source
            ),
            format!("precision = {} ({})", c.precision(), c.precision.source),
            format!(
                "output-format = {} ({})",
                c.output_format(),
                c.output_format.source
            ),
        ];
        match c.thresholds {
            Some(ref t) => lines.push(format!(
                "thresholds = effort={} impact={} ({})",
                t.value.effort, t.value.impact, t.source
            )),
            None => lines.push("thresholds = median (default)".to_string()),
        }
        lines.join("\n")
    }
}

/// Show the resolved configuration.
pub fn config_show(dir: Option<&Path>, settings: ResolvedConfig) -> ConfigShowResult {
    ConfigShowResult {
        path: dir.map(config::config_path),
        config: settings,
    }
}

#[derive(Serialize)]
pub struct ConfigPathResult {
    pub path: PathBuf,
    pub exists: bool,
}

impl Output for ConfigPathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.path.display().to_string()
    }
}

fn require_dir(dir: Option<&Path>) -> Result<&Path> {
    dir.ok_or_else(|| {
        Error::Config(format!(
            "could not determine config directory; pass --config-dir or set {}",
            config::CONFIG_DIR_ENV
        ))
    })
}

/// Locate config.kdl.
pub fn config_path(dir: Option<&Path>) -> Result<ConfigPathResult> {
    let path = config::config_path(require_dir(dir)?);
    Ok(ConfigPathResult {
        exists: path.exists(),
        path,
    })
}

#[derive(Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
    pub path: PathBuf,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path.display())
    }
}

/// Update one key in config.kdl, keeping the rest of the file's settings.
pub fn config_set(
    dir: Option<&Path>,
    mut current: IcerankConfig,
    key: &str,
    value: &str,
) -> Result<ConfigSetResult> {
    let dir = require_dir(dir)?;
    current.set(key, value).map_err(Error::Config)?;
    let path = config::write_config(dir, &current)?;
    tracing::info!(key, value, path = %path.display(), "config updated");
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, resolve_config};
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Add dark mode | I:1 | C:0.9 | E:0.5 | T:ui
Rewrite billing | I:3 | C:0.5 | E:8
Unscored idea
";

    fn defaults() -> ResolvedConfig {
        resolve_config(&IcerankConfig::new(), &ConfigOverrides::new())
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(resolve_format("-", None).unwrap(), InputFormat::Text);
        assert_eq!(resolve_format("ideas.csv", None).unwrap(), InputFormat::Csv);
        assert_eq!(
            resolve_format("ideas.csv", Some("json")).unwrap(),
            InputFormat::Json
        );
        assert!(resolve_format("-", Some("yaml")).is_err());
    }

    #[test]
    fn test_read_input_missing_file_is_not_found() {
        assert!(matches!(
            read_input("/definitely/not/here.txt"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_load_ideas_rejects_invalid_text_records() {
        let loaded = load_ideas("Good | E:1\n\n| I:2\n", InputFormat::Text, ScoringModel::Ice).unwrap();
        assert_eq!(loaded.ideas.len(), 1);
        assert_eq!(loaded.rejected.len(), 1);
        // Text rejections point at the source line, blank lines included
        assert_eq!(loaded.rejected[0].row, 3);
    }

    #[test]
    fn test_load_ideas_json_rejections_use_array_index() {
        let raw = r#"[{"title": "Ok", "effort": 1}, {"title": "", "effort": 1}]"#;
        let loaded = load_ideas(raw, InputFormat::Json, ScoringModel::Ice).unwrap();
        assert_eq!(loaded.rejected[0].row, 1);
    }

    #[test]
    fn test_validate_reports_text_line() {
        let result = validate_records("\nFirst | E:1\n\nSecond | E:2\n", InputFormat::Text, ScoringModel::Ice).unwrap();
        assert_eq!(result.records[0].line, Some(2));
        assert_eq!(result.records[1].line, Some(4));
        let csv = validate_records("title\nA\n", InputFormat::Csv, ScoringModel::Ice).unwrap();
        assert_eq!(csv.records[0].line, None);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let loaded = load_ideas(SAMPLE, InputFormat::Text, ScoringModel::Ice).unwrap();
        let result = rank(loaded, &defaults());
        let titles: Vec<&str> = result
            .ranked
            .iter()
            .map(|r| r.idea.fields.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Add dark mode", "Rewrite billing", "Unscored idea"]);
        assert!((result.ranked[0].score.unwrap() - 1.8).abs() < 1e-9);
        assert_eq!(result.ranked[2].status, Status::Incomplete);
    }

    #[test]
    fn test_classify_median_splits_ideas() {
        let loaded = load_ideas(SAMPLE, InputFormat::Text, ScoringModel::Ice).unwrap();
        let result = classify(loaded, &defaults());
        assert_eq!(result.threshold_mode, "median");
        assert_eq!(result.unclassified.len(), 1);
        let total: usize = result.quadrants.values().map(Vec::len).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_validate_reports_all_violations() {
        let raw = "title,effort,confidence\n,0,1.5\nFine,1,0.5\n";
        let result = validate_records(raw, InputFormat::Csv, ScoringModel::Ice).unwrap();
        assert_eq!(result.invalid, 1);
        assert_eq!(result.valid, 1);
        assert_eq!(result.records[0].violations.len(), 3);
        assert_eq!(result.records[1].status, Status::Incomplete);
    }

    #[test]
    fn test_export_text_and_csv() {
        let loaded = load_ideas(SAMPLE, InputFormat::Text, ScoringModel::Ice).unwrap();
        let text = export(loaded, "text", &defaults()).unwrap();
        assert!(text.content.starts_with("Add dark mode | I:1 | C:0.9 | E:0.5 | T:ui\n"));

        let loaded = load_ideas(SAMPLE, InputFormat::Text, ScoringModel::Ice).unwrap();
        let csv = export(loaded, "csv", &defaults()).unwrap();
        assert!(csv.content.lines().nth(1).unwrap().ends_with(",1.80"));

        let loaded = LoadedIdeas::default();
        assert!(export(loaded, "xml", &defaults()).is_err());
    }

    #[test]
    fn test_config_set_writes_file() {
        let dir = TempDir::new().unwrap();
        let result = config_set(Some(dir.path()), IcerankConfig::new(), "model", "rice").unwrap();
        assert!(result.path.exists());
        let loaded = config::load_config(dir.path()).unwrap();
        assert_eq!(loaded.model, Some(ScoringModel::Rice));

        assert!(config_set(Some(dir.path()), loaded, "precision", "99").is_err());
    }

    #[test]
    fn test_config_without_dir_is_error() {
        assert!(matches!(config_path(None), Err(Error::Config(_))));
    }
}
