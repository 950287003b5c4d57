//! ICE/RICE scoring.
//!
//! Scores are derived values: they are recomputed from an idea's fields, the
//! scoring model and the weights every time they are needed, and never stored.
//!
//! # Formula
//!
//! With weights applied as exponents:
//!
//! - ICE: `impact^wi × confidence^wc / effort^we`
//! - RICE: `reach^wr × impact^wi × confidence^wc / effort^we`
//!
//! # Example
//!
//! ```
//! use icerank::models::{Impact, IdeaFields, ScoringModel, Weights};
//! use icerank::scoring::{score, status, Status};
//!
//! let mut fields = IdeaFields::new("Add dark mode");
//! fields.impact = Some(Impact::Medium);
//! fields.confidence = Some(0.9);
//! fields.effort = Some(0.5);
//!
//! assert_eq!(status(&fields, ScoringModel::Ice), Status::Valid);
//! let s = score(&fields, ScoringModel::Ice, &Weights::default()).unwrap();
//! assert!((s - 1.8).abs() < 1e-9);
//!
//! // RICE needs reach
//! assert_eq!(status(&fields, ScoringModel::Rice), Status::Incomplete);
//! ```

pub mod quadrant;
pub mod rank;

pub use quadrant::{Classification, Quadrant, ThresholdMode, Thresholds, classify};
pub use rank::{RankedIdea, rank};

use crate::models::{IdeaFields, ScoringModel, Weights, is_positive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an idea can be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// All inputs present and in range
    Valid,
    /// Missing an input the model needs (ranked last, not an error)
    Incomplete,
    /// An input is out of range, e.g. effort <= 0; unrankable until fixed
    Invalid,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Valid => "valid",
            Status::Incomplete => "incomplete",
            Status::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score and status computed together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub score: Option<f64>,
    pub status: Status,
}

/// Determine the scorability of a record under a model.
///
/// Checks run in this order:
/// 1. effort present and not > 0: `Invalid`
/// 2. confidence present and outside [0, 1]: `Invalid`
/// 3. effort, impact or confidence absent: `Incomplete`
/// 4. RICE with reach absent or not > 0: `Incomplete`
pub fn status(fields: &IdeaFields, model: ScoringModel) -> Status {
    if fields.effort.is_some_and(|effort| !is_positive(effort)) {
        return Status::Invalid;
    }
    if fields
        .confidence
        .is_some_and(|confidence| !(0.0..=1.0).contains(&confidence))
    {
        return Status::Invalid;
    }
    if fields.effort.is_none() || fields.impact.is_none() || fields.confidence.is_none() {
        return Status::Incomplete;
    }
    if model.uses_reach() && !fields.reach.is_some_and(is_positive) {
        return Status::Incomplete;
    }
    Status::Valid
}

/// Compute the score, or `None` when the record is not `Valid`.
pub fn score(fields: &IdeaFields, model: ScoringModel, weights: &Weights) -> Option<f64> {
    if status(fields, model) != Status::Valid {
        return None;
    }

    let impact = fields.impact?.value();
    let confidence = fields.confidence?;
    let effort = fields.effort?;

    let mut numerator = 1.0;
    if model.uses_reach() {
        numerator = fields.reach?.powf(weights.reach);
    }
    numerator = numerator * impact.powf(weights.impact) * confidence.powf(weights.confidence);

    Some(numerator / effort.powf(weights.effort))
}

/// Compute status and score in one pass.
pub fn assess(fields: &IdeaFields, model: ScoringModel, weights: &Weights) -> Assessment {
    Assessment {
        score: score(fields, model, weights),
        status: status(fields, model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;
    use proptest::prelude::*;

    fn fields(reach: Option<f64>, impact: Impact, confidence: f64, effort: f64) -> IdeaFields {
        IdeaFields {
            title: "t".to_string(),
            reach,
            impact: Some(impact),
            confidence: Some(confidence),
            effort: Some(effort),
            ..Default::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_ice_example() {
        let f = fields(None, Impact::Medium, 0.9, 0.5);
        let s = score(&f, ScoringModel::Ice, &Weights::default()).unwrap();
        assert!(close(s, 1.8));
    }

    #[test]
    fn test_rice_score() {
        let f = fields(Some(500.0), Impact::Large, 0.8, 4.0);
        let s = score(&f, ScoringModel::Rice, &Weights::default()).unwrap();
        assert!(close(s, 200.0));
    }

    #[test]
    fn test_zero_effort_is_invalid_for_both_models() {
        let f = fields(Some(10.0), Impact::Large, 0.8, 0.0);
        for model in [ScoringModel::Ice, ScoringModel::Rice] {
            assert_eq!(status(&f, model), Status::Invalid);
            assert_eq!(score(&f, model, &Weights::default()), None);
        }
    }

    #[test]
    fn test_negative_effort_is_invalid() {
        let f = fields(None, Impact::Large, 0.8, -1.0);
        assert_eq!(status(&f, ScoringModel::Ice), Status::Invalid);
    }

    #[test]
    fn test_rice_without_reach_is_incomplete() {
        let f = fields(None, Impact::Large, 0.8, 1.0);
        assert_eq!(status(&f, ScoringModel::Rice), Status::Incomplete);
        assert_eq!(score(&f, ScoringModel::Rice, &Weights::default()), None);
        // Same record is fine under ICE
        assert_eq!(status(&f, ScoringModel::Ice), Status::Valid);
    }

    #[test]
    fn test_rice_with_zero_reach_is_incomplete() {
        let f = fields(Some(0.0), Impact::Large, 0.8, 1.0);
        assert_eq!(status(&f, ScoringModel::Rice), Status::Incomplete);
    }

    #[test]
    fn test_invalid_effort_wins_over_missing_reach() {
        let f = fields(None, Impact::Large, 0.8, 0.0);
        assert_eq!(status(&f, ScoringModel::Rice), Status::Invalid);
    }

    #[test]
    fn test_missing_confidence_is_incomplete() {
        let mut f = fields(None, Impact::Large, 0.8, 1.0);
        f.confidence = None;
        assert_eq!(status(&f, ScoringModel::Ice), Status::Incomplete);
    }

    #[test]
    fn test_confidence_out_of_range_is_invalid() {
        let f = fields(None, Impact::Large, 1.2, 1.0);
        assert_eq!(status(&f, ScoringModel::Ice), Status::Invalid);
    }

    #[test]
    fn test_zero_confidence_scores_zero_not_none() {
        let f = fields(None, Impact::Large, 0.0, 1.0);
        assert_eq!(score(&f, ScoringModel::Ice, &Weights::default()), Some(0.0));
    }

    #[test]
    fn test_weights_are_exponents() {
        let f = fields(None, Impact::Large, 0.5, 1.0);
        let w = Weights {
            impact: 2.0,
            confidence: 2.0,
            ..Default::default()
        };
        // 2^2 * 0.5^2 / 1 = 1.0; a weight of 2 shrinks confidence and grows impact
        let s = score(&f, ScoringModel::Ice, &w).unwrap();
        assert!(close(s, 1.0));
    }

    #[test]
    fn test_effort_weight_amplifies_cost() {
        let f = fields(None, Impact::Medium, 1.0, 2.0);
        let w = Weights {
            effort: 2.0,
            ..Default::default()
        };
        assert!(close(score(&f, ScoringModel::Ice, &w).unwrap(), 0.25));
    }

    #[test]
    fn test_assess_matches_parts() {
        let f = fields(None, Impact::Small, 0.5, 1.0);
        let a = assess(&f, ScoringModel::Ice, &Weights::default());
        assert_eq!(a.status, Status::Valid);
        assert!(close(a.score.unwrap(), 0.25));
    }

    fn impact_strategy() -> impl Strategy<Value = Impact> {
        prop::sample::select(Impact::LADDER.to_vec())
    }

    proptest! {
        #[test]
        fn prop_unweighted_ice_matches_formula(
            impact in impact_strategy(),
            confidence in 0.0f64..=1.0,
            effort in 0.01f64..1000.0,
        ) {
            let f = fields(None, impact, confidence, effort);
            let s = score(&f, ScoringModel::Ice, &Weights::default()).unwrap();
            prop_assert!(close(s, impact.value() * confidence / effort));
        }

        #[test]
        fn prop_unweighted_rice_matches_formula(
            reach in 0.01f64..1e6,
            impact in impact_strategy(),
            confidence in 0.0f64..=1.0,
            effort in 0.01f64..1000.0,
        ) {
            let f = fields(Some(reach), impact, confidence, effort);
            let s = score(&f, ScoringModel::Rice, &Weights::default()).unwrap();
            prop_assert!(close(s, reach * impact.value() * confidence / effort));
        }

        #[test]
        fn prop_non_positive_effort_never_scores(
            effort in -1000.0f64..=0.0,
            reach in proptest::option::of(-10.0f64..10.0),
        ) {
            let f = fields(reach, Impact::Massive, 1.0, effort);
            for model in [ScoringModel::Ice, ScoringModel::Rice] {
                prop_assert_eq!(status(&f, model), Status::Invalid);
                prop_assert_eq!(score(&f, model, &Weights::default()), None);
            }
        }
    }
}
