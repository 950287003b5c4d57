//! KDL schema definition for config.kdl.
//!
//! This module provides:
//! - A Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation and single-key updates used by `ice config set`

use crate::models::{ScoringModel, Weights};
use crate::scoring::Thresholds;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Largest accepted export precision (decimal places).
pub const MAX_PRECISION: u8 = 10;

/// Keys accepted by [`IcerankConfig::set`].
pub const CONFIG_KEYS: [&str; 5] = ["model", "precision", "output-format", "weights", "thresholds"];

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// model "rice"
/// precision 2
/// output-format "human"
/// weights reach=1.0 impact=1.5 confidence=1.0 effort=1.0
/// thresholds effort=2.0 impact=1.0
/// ```
///
/// Missing weight properties default to 1.0. Without a `thresholds` node
/// quadrants use the median of the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IcerankConfig {
    /// Scoring model
    pub model: Option<ScoringModel>,

    /// Decimal places for exported scores
    pub precision: Option<u8>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Exponent weights
    pub weights: Option<Weights>,

    /// Fixed quadrant thresholds
    pub thresholds: Option<Thresholds>,
}

impl IcerankConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(precision) = self.precision {
            if precision > MAX_PRECISION {
                return Err(format!(
                    "precision must be 0-{}, got {}",
                    MAX_PRECISION, precision
                ));
            }
        }
        if let Some(ref weights) = self.weights {
            weights.validate()?;
        }
        if let Some(ref thresholds) = self.thresholds {
            if !thresholds.effort.is_finite() || !thresholds.impact.is_finite() {
                return Err("thresholds must be finite numbers".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. A `model` or `output-format` string that isn't
    /// recognized is an error, since silently falling back would change scores.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self, String> {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, "model") {
            config.model =
                Some(ScoringModel::parse(s).ok_or_else(|| format!("unknown model '{}'", s))?);
        }

        if let Some(node) = doc.get("precision") {
            if let Some(entry) = node.entries().first() {
                let value = entry
                    .value()
                    .as_integer()
                    .filter(|i| (0..=MAX_PRECISION as i128).contains(i))
                    .ok_or_else(|| format!("precision must be 0-{}", MAX_PRECISION))?;
                config.precision = Some(value as u8);
            }
        }

        if let Some(s) = first_string(doc, "output-format") {
            config.output_format = Some(
                OutputFormat::parse(s).ok_or_else(|| format!("unknown output-format '{}'", s))?,
            );
        }

        if let Some(node) = doc.get("weights") {
            let mut weights = Weights::default();
            if let Some(v) = number_prop(node, "reach") {
                weights.reach = v;
            }
            if let Some(v) = number_prop(node, "impact") {
                weights.impact = v;
            }
            if let Some(v) = number_prop(node, "confidence") {
                weights.confidence = v;
            }
            if let Some(v) = number_prop(node, "effort") {
                weights.effort = v;
            }
            config.weights = Some(weights);
        }

        if let Some(node) = doc.get("thresholds") {
            match (number_prop(node, "effort"), number_prop(node, "impact")) {
                (Some(effort), Some(impact)) => {
                    config.thresholds = Some(Thresholds { effort, impact })
                }
                _ => return Err("thresholds needs both effort= and impact=".to_string()),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(model) = self.model {
            let mut node = KdlNode::new("model");
            node.push(KdlEntry::new(KdlValue::String(model.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(precision) = self.precision {
            let mut node = KdlNode::new("precision");
            node.push(KdlEntry::new(KdlValue::Integer(precision as i128)));
            doc.nodes_mut().push(node);
        }

        if let Some(format) = self.output_format {
            let mut node = KdlNode::new("output-format");
            node.push(KdlEntry::new(KdlValue::String(format.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(weights) = self.weights {
            let mut node = KdlNode::new("weights");
            node.push(KdlEntry::new_prop("reach", KdlValue::Float(weights.reach)));
            node.push(KdlEntry::new_prop("impact", KdlValue::Float(weights.impact)));
            node.push(KdlEntry::new_prop(
                "confidence",
                KdlValue::Float(weights.confidence),
            ));
            node.push(KdlEntry::new_prop("effort", KdlValue::Float(weights.effort)));
            doc.nodes_mut().push(node);
        }

        if let Some(thresholds) = self.thresholds {
            let mut node = KdlNode::new("thresholds");
            node.push(KdlEntry::new_prop(
                "effort",
                KdlValue::Float(thresholds.effort),
            ));
            node.push(KdlEntry::new_prop(
                "impact",
                KdlValue::Float(thresholds.impact),
            ));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Update a single key from its command-line string form.
    ///
    /// - `model`: `ice` or `rice`
    /// - `precision`: integer 0-10
    /// - `output-format`: `json` or `human`
    /// - `weights`: `reach,impact,confidence,effort`
    /// - `thresholds`: `effort,impact`, or `median` to clear
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut next = self.clone();
        match key {
            "model" => {
                next.model = Some(
                    ScoringModel::parse(value)
                        .ok_or_else(|| format!("model must be 'ice' or 'rice', got '{}'", value))?,
                );
            }
            "precision" => {
                let precision = value
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| format!("precision must be 0-{}, got '{}'", MAX_PRECISION, value))?;
                next.precision = Some(precision);
            }
            "output-format" => {
                next.output_format = Some(OutputFormat::parse(value).ok_or_else(|| {
                    format!("output-format must be 'json' or 'human', got '{}'", value)
                })?);
            }
            "weights" => next.weights = Some(Weights::parse_list(value)?),
            "thresholds" => {
                if value.trim().eq_ignore_ascii_case("median") {
                    next.thresholds = None;
                } else {
                    next.thresholds = Some(parse_thresholds(value)?);
                }
            }
            _ => {
                return Err(format!(
                    "unknown config key '{}' (expected one of: {})",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// Parse `effort,impact` into fixed thresholds.
pub fn parse_thresholds(s: &str) -> Result<Thresholds, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [effort, impact] = parts.as_slice() else {
        return Err(format!("thresholds must be 'effort,impact', got '{}'", s));
    };
    let parse = |v: &str| {
        v.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("invalid threshold: '{}'", v))
    };
    Ok(Thresholds {
        effort: parse(*effort)?,
        impact: parse(*impact)?,
    })
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

fn number_prop(node: &KdlNode, key: &str) -> Option<f64> {
    node.entries()
        .iter()
        .find(|entry| entry.name().map(|n| n.value()) == Some(key))
        .and_then(|entry| as_number(entry.value()))
}

fn as_number(value: &KdlValue) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}
