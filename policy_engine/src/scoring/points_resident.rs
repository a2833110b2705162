//! Point-based residence track.
//!
//! Additive points from age, education, Korean proficiency, annual
//! income, completion of the integration programme and caller-asserted
//! extra points.  Passing needs 80 points on a 120-point scale.  The
//! result also reports how many years a grant would be valid for, which
//! is derived from the total but plays no part in passing.

use super::{
    age_points, band_points, AgeBand, EducationPoints, EducationTier, KoreanLevel, PointBand,
    ScoreValue, Track, TrackDetails, TrackScore,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointsResidentInput {
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub education: EducationTier,
    #[serde(default)]
    pub korean_level: KoreanLevel,
    #[serde(default)]
    pub annual_income: i64,
    /// Integration programme completed.
    #[serde(default)]
    pub program_completed: bool,
    /// Points the caller has already established elsewhere, e.g. for
    /// volunteering or investment.  Added as given.
    #[serde(default)]
    pub extra_points: u32,
}

/// Minimum total for a grant of `years`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidityBand {
    pub min_score: u32,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsResidentTable {
    pub age: Vec<AgeBand>,
    pub education: EducationPoints,
    pub korean: [u32; 6],
    pub income: Vec<PointBand>,
    pub program_completion: u32,
    /// Highest minimum first.
    pub validity: Vec<ValidityBand>,
    pub pass_score: u32,
    pub max_score: u32,
}

impl Default for PointsResidentTable {
    fn default() -> Self {
        Self {
            age: vec![
                AgeBand { min_age: 18, max_age: Some(24), points: 23 },
                AgeBand { min_age: 25, max_age: Some(29), points: 25 },
                AgeBand { min_age: 30, max_age: Some(34), points: 23 },
                AgeBand { min_age: 35, max_age: Some(39), points: 20 },
                AgeBand { min_age: 40, max_age: Some(44), points: 12 },
                AgeBand { min_age: 45, max_age: Some(50), points: 8 },
                AgeBand { min_age: 51, max_age: None, points: 3 },
            ],
            education: EducationPoints {
                associate: 15,
                bachelor: 20,
                master: 25,
                master_stem: 28,
                doctorate: 30,
                doctorate_stem: 35,
            },
            korean: [3, 5, 10, 15, 20, 20],
            income: vec![
                PointBand { min: 100_000_000, points: 30 },
                PointBand { min: 80_000_000, points: 25 },
                PointBand { min: 60_000_000, points: 20 },
                PointBand { min: 50_000_000, points: 15 },
                PointBand { min: 40_000_000, points: 10 },
                PointBand { min: 30_000_000, points: 5 },
            ],
            program_completion: 10,
            validity: vec![
                ValidityBand { min_score: 100, years: 3 },
                ValidityBand { min_score: 90, years: 2 },
                ValidityBand { min_score: 80, years: 1 },
            ],
            pass_score: 80,
            max_score: 120,
        }
    }
}

impl PointsResidentTable {
    pub fn valid_years(&self, total: u32) -> u32 {
        self.validity
            .iter()
            .find(|band| total >= band.min_score)
            .map(|band| band.years)
            .unwrap_or(0)
    }
}

pub fn score(input: &PointsResidentInput, table: &PointsResidentTable) -> TrackScore {
    let mut details = TrackDetails {
        threshold: table.pass_score,
        ..Default::default()
    };

    details.add("age", age_points(&table.age, input.age));
    details.add("education", table.education.points(input.education));
    details.add("korean_level", input.korean_level.points(&table.korean));
    details.add("income", band_points(&table.income, input.annual_income));
    if input.program_completed {
        details.add("program_completion", table.program_completion);
    }
    if input.extra_points > 0 {
        details.add("extra_points", input.extra_points);
    }

    let earned = details.sum();
    details.valid_years = Some(table.valid_years(earned));

    TrackScore {
        track: Track::PointsResident,
        value: ScoreValue::Points {
            earned,
            max: table.max_score,
        },
        pass: earned >= table.pass_score,
        details,
    }
}
