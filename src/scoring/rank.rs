//! Deterministic ordering of ideas by score.
//!
//! Sort key, in order:
//! 1. Score, highest first. Unscorable ideas come after every scored one.
//! 2. Impact, highest first (applies to unscorable ideas too).
//! 3. Effort, lowest first.
//! 4. Input order. The sort is stable, so fully tied ideas keep their
//!    relative position.

use super::{Status, assess};
use crate::models::{Idea, ScoringModel, Weights};
use serde::Serialize;
use std::cmp::Ordering;

/// An idea with its position in a ranking.
#[derive(Debug, Clone, Serialize)]
pub struct RankedIdea<'a> {
    /// 1-based position
    pub position: usize,
    pub score: Option<f64>,
    pub status: Status,
    #[serde(flatten)]
    pub idea: &'a Idea,
}

/// Rank a collection of ideas. The input is left untouched.
pub fn rank<'a>(ideas: &'a [Idea], model: ScoringModel, weights: &Weights) -> Vec<RankedIdea<'a>> {
    let mut ranked: Vec<RankedIdea<'a>> = ideas
        .iter()
        .map(|idea| {
            let assessment = assess(&idea.fields, model, weights);
            RankedIdea {
                position: 0,
                score: assessment.score,
                status: assessment.status,
                idea,
            }
        })
        .collect();

    // slice::sort_by is stable
    ranked.sort_by(compare);

    for (index, entry) in ranked.iter_mut().enumerate() {
        entry.position = index + 1;
    }
    ranked
}

/// Ordering used by [`rank`]: `Less` means `a` ranks ahead of `b`.
pub fn compare(a: &RankedIdea<'_>, b: &RankedIdea<'_>) -> Ordering {
    descending_score(a.score, b.score)
        .then_with(|| b.idea.fields.impact.cmp(&a.idea.fields.impact))
        .then_with(|| ascending_effort(a.idea.fields.effort, b.idea.fields.effort))
}

fn descending_score(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn ascending_effort(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
