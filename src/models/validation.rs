//! Record-level validation for ideas.
//!
//! Every check runs independently so a record that breaks several rules
//! reports every violation, not just the first one.

use super::{IdeaFields, ScoringModel, is_positive};

/// Check a (possibly partial) record and return its violations.
///
/// An empty result means the record is acceptable. Absent scoring fields are
/// not violations here; they only affect scorability (see [`crate::scoring::status`]).
pub fn validate(fields: &IdeaFields, model: ScoringModel) -> Vec<String> {
    let mut violations = Vec::new();

    if fields.title.trim().is_empty() {
        violations.push("title is required".to_string());
    }

    if let Some(effort) = fields.effort {
        if !is_positive(effort) {
            violations.push(format!("effort must be greater than 0 (got {})", effort));
        }
    }

    if let Some(confidence) = fields.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            violations.push(format!(
                "confidence must be between 0 and 1 (got {})",
                confidence
            ));
        }
    }

    if model.uses_reach() {
        if let Some(reach) = fields.reach {
            if !is_positive(reach) {
                violations.push(format!("reach must be greater than 0 (got {})", reach));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;

    fn fields(title: &str) -> IdeaFields {
        IdeaFields::new(title)
    }

    #[test]
    fn test_valid_record_has_no_violations() {
        let mut f = fields("Add search");
        f.impact = Some(Impact::Large);
        f.confidence = Some(0.8);
        f.effort = Some(2.0);
        assert!(validate(&f, ScoringModel::Ice).is_empty());
    }

    #[test]
    fn test_absent_fields_are_not_violations() {
        assert!(validate(&fields("Bare"), ScoringModel::Rice).is_empty());
    }

    #[test]
    fn test_blank_title() {
        let violations = validate(&fields("   "), ScoringModel::Ice);
        assert_eq!(violations, vec!["title is required"]);
    }

    #[test]
    fn test_reports_every_violation() {
        let mut f = fields("");
        f.effort = Some(0.0);
        f.confidence = Some(1.5);
        f.reach = Some(-10.0);
        let violations = validate(&f, ScoringModel::Rice);
        assert_eq!(violations.len(), 4);
        assert!(violations[1].contains("effort"));
        assert!(violations[2].contains("confidence"));
        assert!(violations[3].contains("reach"));
    }

    #[test]
    fn test_reach_ignored_under_ice() {
        let mut f = fields("Ice only");
        f.reach = Some(0.0);
        assert!(validate(&f, ScoringModel::Ice).is_empty());
    }

    #[test]
    fn test_confidence_bounds_inclusive() {
        let mut f = fields("Edge");
        f.confidence = Some(0.0);
        assert!(validate(&f, ScoringModel::Ice).is_empty());
        f.confidence = Some(1.0);
        assert!(validate(&f, ScoringModel::Ice).is_empty());
    }

    #[test]
    fn test_nan_effort_is_rejected() {
        let mut f = fields("NaN");
        f.effort = Some(f64::NAN);
        assert_eq!(validate(&f, ScoringModel::Ice).len(), 1);
    }
}
