//! Permanent residence by income.
//!
//! Not a point total: the score is the applicant's income as a
//! percentage of the track's income requirement, rounded and capped at
//! 100.  Only a full 100 passes.

use super::{ScoreValue, Track, TrackDetails, TrackScore};
use crate::money::{dec, non_negative, round_half_up};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTrack {
    #[default]
    Generic,
    Stem,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermanentResidenceInput {
    #[serde(default)]
    pub annual_income: i64,
    #[serde(default)]
    pub income_track: IncomeTrack,
}

/// Annual income requirements per track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermanentResidencePolicy {
    /// Twice the previous year's GNI per capita.
    pub generic_threshold: i64,
    /// The previous year's GNI per capita.
    pub stem_threshold: i64,
}

impl Default for PermanentResidencePolicy {
    fn default() -> Self {
        Self {
            generic_threshold: 88_102_000,
            stem_threshold: 44_051_000,
        }
    }
}

impl PermanentResidencePolicy {
    pub fn threshold(&self, track: IncomeTrack) -> Option<i64> {
        match track {
            IncomeTrack::Generic => Some(self.generic_threshold),
            IncomeTrack::Stem => Some(self.stem_threshold),
            IncomeTrack::Unknown => None,
        }
    }
}

const FULL: u32 = 100;

pub fn score(input: &PermanentResidenceInput, policy: &PermanentResidencePolicy) -> TrackScore {
    let required = policy
        .threshold(input.income_track)
        .filter(|threshold| *threshold > 0);

    let percent = match required {
        Some(threshold) => {
            let ratio = dec(non_negative(input.annual_income)) * Decimal::ONE_HUNDRED
                / dec(threshold);
            round_half_up(ratio).clamp(0, i64::from(FULL)) as u32
        }
        None => 0,
    };

    let mut details = TrackDetails {
        threshold: FULL,
        required_income: required,
        ..Default::default()
    };
    details.add("income_ratio", percent);

    TrackScore {
        track: Track::PermanentResidence,
        value: ScoreValue::PercentOfRequirement { percent },
        pass: percent >= FULL,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(income: i64, track: IncomeTrack) -> TrackScore {
        score(
            &PermanentResidenceInput {
                annual_income: income,
                income_track: track,
            },
            &PermanentResidencePolicy::default(),
        )
    }

    fn percent(score: &TrackScore) -> u32 {
        match score.value {
            ScoreValue::PercentOfRequirement { percent } => percent,
            ScoreValue::Points { .. } => panic!("expected a percentage"),
        }
    }

    #[test]
    fn meeting_the_requirement_passes() {
        let result = run(88_102_000, IncomeTrack::Generic);
        assert_eq!(percent(&result), 100);
        assert!(result.pass);
        assert_eq!(result.details.required_income, Some(88_102_000));
    }

    #[test]
    fn score_is_capped_at_one_hundred() {
        let result = run(881_020_000, IncomeTrack::Generic);
        assert_eq!(percent(&result), 100);
        assert!(result.pass);
    }

    #[test]
    fn partial_income_is_a_percentage() {
        let result = run(44_051_000, IncomeTrack::Generic);
        assert_eq!(percent(&result), 50);
        assert!(!result.pass);

        let result = run(87_600_000, IncomeTrack::Generic);
        assert_eq!(percent(&result), 99);
        assert!(!result.pass);
    }

    #[test]
    fn rounding_can_reach_the_requirement() {
        // 99.5% rounds up to 100.
        let result = run(87_661_490, IncomeTrack::Generic);
        assert_eq!(percent(&result), 100);
        assert!(result.pass);
    }

    #[test]
    fn stem_track_has_a_lower_requirement() {
        let result = run(44_051_000, IncomeTrack::Stem);
        assert_eq!(percent(&result), 100);
        assert!(result.pass);
    }

    #[test]
    fn unknown_track_scores_zero() {
        let result = run(500_000_000, IncomeTrack::Unknown);
        assert_eq!(percent(&result), 0);
        assert!(!result.pass);
        assert_eq!(result.details.required_income, None);
    }

    #[test]
    fn more_income_never_lowers_the_score() {
        let mut previous = 0;
        for income in (0..=200_000_000).step_by(5_000_000) {
            let current = percent(&run(income, IncomeTrack::Generic));
            assert!(current >= previous);
            previous = current;
        }
    }
}
