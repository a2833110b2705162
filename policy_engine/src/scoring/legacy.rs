//! Generic checklist scorer.
//!
//! Older forms score a visa from the checklist stored with the visa in
//! the catalog: every criterion the applicant ticks adds its points.
//! Ticked keys the checklist does not know are ignored.

use super::{ScoreValue, Track, TrackDetails, TrackScore};
use crate::error::{PolicyError, PolicyResult};
use crate::policy::{PolicyTables, VisaPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyAnswers {
    pub visa_code: String,
    /// Keys of the criteria the applicant meets.
    #[serde(default)]
    pub satisfied: BTreeSet<String>,
}

pub fn score_legacy(visa: &VisaPolicy, satisfied: &BTreeSet<String>) -> PolicyResult<TrackScore> {
    let rules = visa
        .point_rules
        .as_ref()
        .ok_or_else(|| PolicyError::NoPointRules(visa.code.clone()))?;

    let mut details = TrackDetails {
        threshold: rules.pass_score,
        visa_code: Some(visa.code.clone()),
        ..Default::default()
    };
    for criterion in &rules.criteria {
        if satisfied.contains(&criterion.key) {
            details.add(&criterion.key, criterion.points);
        }
    }

    let earned = details.sum();
    Ok(TrackScore {
        track: Track::Legacy,
        value: ScoreValue::Points {
            earned,
            max: rules.max_score,
        },
        pass: earned >= rules.pass_score,
        details,
    })
}

/// Resolves the visa in the catalog, then scores it.
pub fn score_legacy_by_code(
    tables: &PolicyTables,
    answers: &LegacyAnswers,
) -> PolicyResult<TrackScore> {
    let visa = tables.visa(&answers.visa_code)?;
    score_legacy(visa, &answers.satisfied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(code: &str, keys: &[&str]) -> LegacyAnswers {
        LegacyAnswers {
            visa_code: code.into(),
            satisfied: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn sums_satisfied_criteria() {
        let tables = PolicyTables::builtin();
        let result = score_legacy_by_code(
            &tables,
            &answers("D-10", &["masters", "age_under_30", "stem_major"]),
        )
        .unwrap();
        assert_eq!(result.value, ScoreValue::Points { earned: 55, max: 190 });
        assert!(!result.pass);
        assert_eq!(result.details.visa_code.as_deref(), Some("D-10"));

        let result = score_legacy_by_code(
            &tables,
            &answers("d-10", &["masters", "age_under_30", "stem_major", "global_company"]),
        )
        .unwrap();
        assert_eq!(result.value.points(), Some(75));
        assert!(result.pass);
    }

    #[test]
    fn unknown_keys_contribute_nothing() {
        let tables = PolicyTables::builtin();
        let result =
            score_legacy_by_code(&tables, &answers("F-2-7", &["masters", "astronaut"])).unwrap();
        assert_eq!(result.value.points(), Some(25));
        assert_eq!(result.details.components.len(), 1);
    }

    #[test]
    fn oversized_criteria_saturate() {
        use crate::policy::{PointCriterion, PointRules};

        let tables = PolicyTables::builtin();
        let mut visa = tables.visa("D-10").unwrap().clone();
        visa.point_rules = Some(PointRules {
            pass_score: 60,
            max_score: 100,
            criteria: ["a", "b"]
                .iter()
                .map(|key| PointCriterion {
                    key: key.to_string(),
                    label: key.to_uppercase(),
                    points: u32::MAX / 2 + 1,
                })
                .collect(),
        });
        let satisfied = ["a", "b"].iter().map(|k| k.to_string()).collect();
        let result = score_legacy(&visa, &satisfied).unwrap();
        assert_eq!(result.value.points(), Some(u32::MAX));
        assert!(result.pass);
    }

    #[test]
    fn visas_without_rules_or_unknown_codes_are_errors() {
        let tables = PolicyTables::builtin();
        assert!(matches!(
            score_legacy_by_code(&tables, &answers("E-9", &[])),
            Err(PolicyError::NoPointRules(_))
        ));
        assert!(matches!(
            score_legacy_by_code(&tables, &answers("X-1", &[])),
            Err(PolicyError::VisaNotFound(_))
        ));
    }
}
