//! Effort/impact quadrant classification.
//!
//! Only `Valid` ideas are placed. Thresholds either come from the valid subset
//! itself (lower median of effort and of impact, computed independently) or
//! are supplied by the caller.
//!
//! # Boundary policy
//!
//! A value exactly on a threshold counts toward the better side: effort equal
//! to the threshold is low effort, impact equal to the threshold is high impact.
//!
//! | effort vs threshold | impact vs threshold | quadrant   |
//! |---------------------|---------------------|------------|
//! | `<=`                | `>=`                | Quick Win  |
//! | `>`                 | `>=`                | Big Bet    |
//! | `<=`                | `<`                 | Maybe      |
//! | `>`                 | `<`                 | Time Sink  |

use super::{Status, status};
use crate::models::{Idea, ScoringModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of valid ideas needed to derive median thresholds.
pub const MIN_IDEAS_FOR_MEDIAN: usize = 2;

/// Priority bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    /// Low effort, high impact
    QuickWin,
    /// High effort, high impact
    BigBet,
    /// Low effort, low impact
    Maybe,
    /// High effort, low impact
    TimeSink,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::QuickWin,
        Quadrant::BigBet,
        Quadrant::Maybe,
        Quadrant::TimeSink,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::QuickWin => "Quick Wins",
            Quadrant::BigBet => "Big Bets",
            Quadrant::Maybe => "Maybes",
            Quadrant::TimeSink => "Time Sinks",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Effort and impact cut-off values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub effort: f64,
    pub impact: f64,
}

impl Thresholds {
    /// Place a single (effort, impact) point.
    pub fn quadrant(&self, effort: f64, impact: f64) -> Quadrant {
        let low_effort = effort <= self.effort;
        let high_impact = impact >= self.impact;
        match (low_effort, high_impact) {
            (true, true) => Quadrant::QuickWin,
            (false, true) => Quadrant::BigBet,
            (true, false) => Quadrant::Maybe,
            (false, false) => Quadrant::TimeSink,
        }
    }
}

/// How thresholds are chosen for a classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ThresholdMode {
    /// Lower median of the valid ideas' effort and impact
    #[default]
    Median,
    /// Caller-supplied values
    Fixed(Thresholds),
}

/// Result of a classification pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    /// Thresholds used, `None` when too few ideas were valid to derive them
    pub thresholds: Option<Thresholds>,
    /// Quadrant per idea id, valid ideas only
    pub quadrants: BTreeMap<String, Quadrant>,
}

impl Classification {
    /// Ids placed in a quadrant, in id order.
    pub fn members(&self, quadrant: Quadrant) -> Vec<&str> {
        self.quadrants
            .iter()
            .filter(|(_, q)| **q == quadrant)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.quadrants.is_empty()
    }
}

/// Lower median: the middle element of the sorted values, taking the
/// lower-middle one for even lengths.
pub fn lower_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[(sorted.len() - 1) / 2])
}

/// Classify the valid ideas of a collection into quadrants.
///
/// In `Median` mode fewer than [`MIN_IDEAS_FOR_MEDIAN`] valid ideas yield an
/// empty classification with no thresholds. In `Fixed` mode every valid idea
/// is placed.
pub fn classify(ideas: &[Idea], model: ScoringModel, mode: ThresholdMode) -> Classification {
    let points: Vec<(&str, f64, f64)> = ideas
        .iter()
        .filter(|idea| status(&idea.fields, model) == Status::Valid)
        .filter_map(|idea| {
            let effort = idea.fields.effort?;
            let impact = idea.fields.impact?.value();
            Some((idea.id.as_str(), effort, impact))
        })
        .collect();

    let thresholds = match mode {
        ThresholdMode::Fixed(thresholds) => thresholds,
        ThresholdMode::Median => {
            if points.len() < MIN_IDEAS_FOR_MEDIAN {
                tracing::debug!(
                    valid = points.len(),
                    "too few valid ideas for median thresholds"
                );
                return Classification::default();
            }
            let efforts: Vec<f64> = points.iter().map(|(_, effort, _)| *effort).collect();
            let impacts: Vec<f64> = points.iter().map(|(_, _, impact)| *impact).collect();
            match (lower_median(&efforts), lower_median(&impacts)) {
                (Some(effort), Some(impact)) => Thresholds { effort, impact },
                _ => return Classification::default(),
            }
        }
    };

    let quadrants = points
        .iter()
        .map(|(id, effort, impact)| (id.to_string(), thresholds.quadrant(*effort, *impact)))
        .collect();

    Classification {
        thresholds: Some(thresholds),
        quadrants,
    }
}
