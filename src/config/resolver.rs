//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. config.kdl
//! 3. Built-in defaults

use crate::config::schema::{IcerankConfig, OutputFormat};
use crate::models::{ScoringModel, Weights};
use crate::scoring::{ThresholdMode, Thresholds};
use serde::Serialize;

/// Default number of decimals for exported scores.
pub const DEFAULT_PRECISION: u8 = 2;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from config.kdl
    File,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::File => write!(f, "file"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub model: Resolved<ScoringModel>,
    pub weights: Resolved<Weights>,
    pub precision: Resolved<u8>,
    pub output_format: Resolved<OutputFormat>,
    /// Fixed thresholds; `None` means median thresholds
    pub thresholds: Option<Resolved<Thresholds>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            model: Resolved::new(ScoringModel::Ice, ValueSource::Default),
            weights: Resolved::new(Weights::default(), ValueSource::Default),
            precision: Resolved::new(DEFAULT_PRECISION, ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            thresholds: None,
        }
    }
}

impl ResolvedConfig {
    pub fn model(&self) -> ScoringModel {
        self.model.value
    }

    pub fn weights(&self) -> &Weights {
        &self.weights.value
    }

    pub fn precision(&self) -> usize {
        self.precision.value as usize
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    /// Threshold mode for quadrant classification.
    pub fn threshold_mode(&self) -> ThresholdMode {
        match self.thresholds {
            Some(ref resolved) => ThresholdMode::Fixed(resolved.value),
            None => ThresholdMode::Median,
        }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<ScoringModel>,
    pub weights: Option<Weights>,
    pub precision: Option<u8>,
    pub output_format: Option<OutputFormat>,
    pub thresholds: Option<Thresholds>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: ScoringModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
}

fn pick<T: Clone>(cli: &Option<T>, file: &Option<T>, default: T) -> Resolved<T> {
    if let Some(value) = cli {
        Resolved::new(value.clone(), ValueSource::CliFlag)
    } else if let Some(value) = file {
        Resolved::new(value.clone(), ValueSource::File)
    } else {
        Resolved::new(default, ValueSource::Default)
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(file: &IcerankConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let thresholds = if let Some(thresholds) = overrides.thresholds {
        Some(Resolved::new(thresholds, ValueSource::CliFlag))
    } else {
        file.thresholds
            .map(|thresholds| Resolved::new(thresholds, ValueSource::File))
    };

    ResolvedConfig {
        model: pick(&overrides.model, &file.model, defaults.model.value),
        weights: pick(&overrides.weights, &file.weights, defaults.weights.value),
        precision: pick(&overrides.precision, &file.precision, defaults.precision.value),
        output_format: pick(
            &overrides.output_format,
            &file.output_format,
            defaults.output_format.value,
        ),
        thresholds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let resolved = resolve_config(&IcerankConfig::new(), &ConfigOverrides::new());
        assert_eq!(resolved.model(), ScoringModel::Ice);
        assert_eq!(resolved.model.source, ValueSource::Default);
        assert_eq!(resolved.precision(), 2);
        assert_eq!(*resolved.weights(), Weights::default());
        assert_eq!(resolved.threshold_mode(), ThresholdMode::Median);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = IcerankConfig {
            model: Some(ScoringModel::Rice),
            precision: Some(4),
            ..Default::default()
        };
        let resolved = resolve_config(&file, &ConfigOverrides::new());
        assert_eq!(resolved.model(), ScoringModel::Rice);
        assert_eq!(resolved.model.source, ValueSource::File);
        assert_eq!(resolved.precision(), 4);
        assert_eq!(resolved.output_format.source, ValueSource::Default);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = IcerankConfig {
            model: Some(ScoringModel::Rice),
            thresholds: Some(Thresholds {
                effort: 5.0,
                impact: 1.0,
            }),
            ..Default::default()
        };
        let cli_thresholds = Thresholds {
            effort: 1.0,
            impact: 2.0,
        };
        let overrides = ConfigOverrides::new()
            .with_model(ScoringModel::Ice)
            .with_thresholds(cli_thresholds);
        let resolved = resolve_config(&file, &overrides);
        assert_eq!(resolved.model(), ScoringModel::Ice);
        assert_eq!(resolved.model.source, ValueSource::CliFlag);
        assert_eq!(
            resolved.threshold_mode(),
            ThresholdMode::Fixed(cli_thresholds)
        );
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::CliFlag.to_string(), "cli");
        assert_eq!(ValueSource::File.to_string(), "file");
        assert_eq!(ValueSource::Default.to_string(), "default");
    }

    #[test]
    fn test_resolved_config_serializes_sources() {
        let resolved = resolve_config(&IcerankConfig::new(), &ConfigOverrides::new());
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["model"]["value"], "ice");
        assert_eq!(json["model"]["source"], "default");
        assert!(json["thresholds"].is_null());
    }
}
