//! Data models for icerank entities.
//!
//! This module defines the core data structures:
//! - `Idea` - A proposed work item with its scoring inputs
//! - `IdeaFields` - The user-editable part of an idea (also the shape of a partial record)
//! - `Impact` - The five-level impact ladder
//! - `Provenance` - Per-field record of who supplied each scoring value
//! - `Weights` - Exponent weights applied by the scoring engine

pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix for generated idea IDs (e.g., "ice-1a2b3c4d").
pub const IDEA_ID_PREFIX: &str = "ice";

/// Impact ladder level.
///
/// The ladder is the only accepted set of impact values. Anything else is
/// rejected rather than clamped to a neighbouring level. Serialized as the
/// numeric value (`0.25`, `0.5`, `1`, `2`, `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Impact {
    Tiny,
    Small,
    Medium,
    Large,
    Massive,
}

impl Impact {
    /// All levels, lowest first.
    pub const LADDER: [Impact; 5] = [
        Impact::Tiny,
        Impact::Small,
        Impact::Medium,
        Impact::Large,
        Impact::Massive,
    ];

    /// Numeric multiplier for this level.
    pub fn value(self) -> f64 {
        match self {
            Impact::Tiny => 0.25,
            Impact::Small => 0.5,
            Impact::Medium => 1.0,
            Impact::Large => 2.0,
            Impact::Massive => 3.0,
        }
    }

    /// Look up the level with exactly this numeric value.
    pub fn from_value(value: f64) -> Option<Self> {
        Self::LADDER.into_iter().find(|level| level.value() == value)
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Impact::Tiny => "Tiny",
            Impact::Small => "Small",
            Impact::Medium => "Medium",
            Impact::Large => "Large",
            Impact::Massive => "Massive",
        }
    }

    /// Parse from a ladder number ("2", "0.25") or a label ("large"), case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(value) = s.parse::<f64>() {
            return Self::from_value(value);
        }
        Self::LADDER
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s))
    }
}

impl From<Impact> for f64 {
    fn from(impact: Impact) -> f64 {
        impact.value()
    }
}

impl TryFrom<f64> for Impact {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Impact::from_value(value).ok_or_else(|| {
            format!(
                "impact must be one of 0.25, 0.5, 1, 2, 3 (got {})",
                value
            )
        })
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Scoring model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringModel {
    /// (Impact × Confidence) / Effort
    #[default]
    Ice,
    /// (Reach × Impact × Confidence) / Effort
    Rice,
}

impl ScoringModel {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ice" => Some(ScoringModel::Ice),
            "rice" => Some(ScoringModel::Rice),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringModel::Ice => "ice",
            ScoringModel::Rice => "rice",
        }
    }

    /// Whether this model reads the `reach` field.
    pub fn uses_reach(&self) -> bool {
        matches!(self, ScoringModel::Rice)
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the four numeric scoring inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringField {
    Reach,
    Impact,
    Confidence,
    Effort,
}

impl ScoringField {
    pub const ALL: [ScoringField; 4] = [
        ScoringField::Reach,
        ScoringField::Impact,
        ScoringField::Confidence,
        ScoringField::Effort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringField::Reach => "reach",
            ScoringField::Impact => "impact",
            ScoringField::Confidence => "confidence",
            ScoringField::Effort => "effort",
        }
    }
}

impl fmt::Display for ScoringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who supplied the current value of a scoring field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldSource {
    /// Typed directly by the user
    User,
    /// Set by an automated suggester and untouched since
    Ai,
    /// Set by a suggester, then changed by the user
    AiEdited,
}

impl FieldSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSource::User => "user",
            FieldSource::Ai => "ai",
            FieldSource::AiEdited => "ai-edited",
        }
    }
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-field provenance tags.
///
/// A field with no value has no entry. Transitions:
/// - user edit on an untagged or `user` field: `user`
/// - suggestion applied: `ai`
/// - user edit that changes an `ai` or `ai-edited` value: `ai-edited`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance(BTreeMap<ScoringField, FieldSource>);

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: ScoringField) -> Option<FieldSource> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoringField, FieldSource)> + '_ {
        self.0.iter().map(|(field, source)| (*field, *source))
    }

    /// Record a user edit. `changed` is false when the user re-entered the
    /// value already present, which leaves the tag as it was.
    pub fn record_user_edit(&mut self, field: ScoringField, changed: bool) {
        let next = match self.get(field) {
            None => FieldSource::User,
            Some(current) if !changed => current,
            Some(FieldSource::User) => FieldSource::User,
            Some(FieldSource::Ai) | Some(FieldSource::AiEdited) => FieldSource::AiEdited,
        };
        self.0.insert(field, next);
    }

    /// Record a value supplied by an automated suggester.
    pub fn record_suggestion(&mut self, field: ScoringField) {
        self.0.insert(field, FieldSource::Ai);
    }

    /// Tag a field as user-supplied only if it has no tag yet.
    pub fn default_to_user(&mut self, field: ScoringField) {
        self.0.entry(field).or_insert(FieldSource::User);
    }

    /// Forget the tag for a field whose value was cleared.
    pub fn clear(&mut self, field: ScoringField) {
        self.0.remove(&field);
    }
}

/// The editable contents of an idea.
///
/// Parsers produce these directly; a record may be partial (any scoring field
/// absent, title possibly blank) until it is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaFields {
    /// Display title
    #[serde(default)]
    pub title: String,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Short labels, insertion ordered, no duplicates
    #[serde(default)]
    pub tags: Vec<String>,

    /// Population affected (RICE only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach: Option<f64>,

    /// Impact ladder level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,

    /// Confidence in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Cost in person-time units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,

    /// Who supplied each scoring value
    #[serde(default, skip_serializing_if = "Provenance::is_empty")]
    pub provenance: Provenance,
}

impl IdeaFields {
    /// Create a title-only record.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Numeric value of a scoring field, if present.
    pub fn value(&self, field: ScoringField) -> Option<f64> {
        match field {
            ScoringField::Reach => self.reach,
            ScoringField::Impact => self.impact.map(Impact::value),
            ScoringField::Confidence => self.confidence,
            ScoringField::Effort => self.effort,
        }
    }

    /// Append tags, skipping blanks and labels already present.
    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
                self.tags.push(tag.to_string());
            }
        }
    }

    /// Tag every present scoring field that has no provenance yet as user-supplied.
    pub fn mark_present_as_user(&mut self) {
        for field in ScoringField::ALL {
            if self.value(field).is_some() {
                self.provenance.default_to_user(field);
            }
        }
    }
}

/// A work item being prioritized.
///
/// The score is never stored here: it is derived on demand by
/// [`crate::scoring::score`] from the fields, model and weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier (e.g., "ice-1a2b3c4d")
    pub id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub fields: IdeaFields,
}

impl Idea {
    /// Create an idea from a record, assigning a fresh id and creation time.
    ///
    /// Present scoring fields without a provenance tag are tagged `user`.
    pub fn new(mut fields: IdeaFields) -> Self {
        fields.mark_present_as_user();
        let normalized = std::mem::take(&mut fields.tags);
        fields.add_tags(normalized);
        Self {
            id: generate_id(IDEA_ID_PREFIX, &fields.title),
            created_at: Utc::now(),
            fields,
        }
    }
}

/// A finite number strictly greater than zero.
pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a hash-based ID with the given prefix.
///
/// Mixes the seed, the current time and a process-local counter so ideas
/// created in the same instant with the same title still differ.
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
    hasher.update(ID_COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..8])
}

/// Exponent weights for the four scoring factors.
///
/// A weight of 1 leaves a factor unweighted. Because weights are exponents,
/// raising a [0, 1] factor such as confidence to a power above 1 shrinks it,
/// while the same weight on a factor above 1 grows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub reach: f64,
    pub impact: f64,
    pub confidence: f64,
    pub effort: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            reach: 1.0,
            impact: 1.0,
            confidence: 1.0,
            effort: 1.0,
        }
    }
}

impl Weights {
    /// Weight for a single factor.
    pub fn get(&self, field: ScoringField) -> f64 {
        match field {
            ScoringField::Reach => self.reach,
            ScoringField::Impact => self.impact,
            ScoringField::Confidence => self.confidence,
            ScoringField::Effort => self.effort,
        }
    }

    /// Validate that every weight is a positive, finite number.
    pub fn validate(&self) -> Result<(), String> {
        for field in ScoringField::ALL {
            let weight = self.get(field);
            if !is_positive(weight) {
                return Err(format!(
                    "weight for {} must be a positive number, got {}",
                    field, weight
                ));
            }
        }
        Ok(())
    }

    /// Parse a comma-separated list in `reach,impact,confidence,effort` order.
    pub fn parse_list(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!(
                "expected 4 weights (reach,impact,confidence,effort), got {}",
                parts.len()
            ));
        }
        let mut values = [0.0; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| format!("invalid weight: '{}'", part))?;
        }
        let weights = Self {
            reach: values[0],
            impact: values[1],
            confidence: values[2],
            effort: values[3],
        };
        weights.validate()?;
        Ok(weights)
    }
}
