//! Skilled-worker conversion track.
//!
//! Points are additive across income, Korean proficiency, age, years at
//! the current workplace, a recommendation and two yes/no bonuses.  The
//! basic items (income, Korean, age) make up a 300-point scale and an
//! applicant passes at 200.

use super::{
    age_points, band_points, AgeBand, KoreanLevel, PointBand, ScoreValue, Track, TrackDetails,
    TrackScore,
};
use serde::{Deserialize, Serialize};

/// Who recommended the applicant.  Only one recommendation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    #[default]
    None,
    /// Central government ministry.
    Central,
    /// Regional or local government.
    Local,
    /// The employing company.
    Company,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkilledWorkerInput {
    #[serde(default)]
    pub annual_income: i64,
    #[serde(default)]
    pub korean_level: KoreanLevel,
    #[serde(default)]
    pub age: u32,
    /// Full years at the current workplace.
    #[serde(default)]
    pub years_at_workplace: u32,
    #[serde(default)]
    pub recommendation: Recommendation,
    #[serde(default)]
    pub rural_area_work: bool,
    #[serde(default)]
    pub domestic_degree: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPoints {
    pub central: u32,
    pub local: u32,
    pub company: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkilledWorkerTable {
    pub income: Vec<PointBand>,
    pub korean: [u32; 6],
    pub age: Vec<AgeBand>,
    pub experience: Vec<PointBand>,
    pub recommendation: RecommendationPoints,
    pub rural_area_work: u32,
    pub domestic_degree: u32,
    pub pass_score: u32,
    pub max_score: u32,
}

impl Default for SkilledWorkerTable {
    fn default() -> Self {
        Self {
            income: vec![
                PointBand { min: 50_000_000, points: 120 },
                PointBand { min: 40_000_000, points: 95 },
                PointBand { min: 35_000_000, points: 80 },
                PointBand { min: 30_000_000, points: 65 },
                PointBand { min: 26_000_000, points: 50 },
            ],
            korean: [10, 50, 80, 100, 110, 120],
            age: vec![
                AgeBand { min_age: 19, max_age: Some(26), points: 40 },
                AgeBand { min_age: 27, max_age: Some(33), points: 60 },
                AgeBand { min_age: 34, max_age: Some(40), points: 30 },
            ],
            experience: vec![
                PointBand { min: 4, points: 20 },
                PointBand { min: 2, points: 10 },
            ],
            recommendation: RecommendationPoints {
                central: 40,
                local: 30,
                company: 20,
            },
            rural_area_work: 20,
            domestic_degree: 20,
            pass_score: 200,
            max_score: 300,
        }
    }
}

impl SkilledWorkerTable {
    fn recommendation_points(&self, recommendation: Recommendation) -> u32 {
        match recommendation {
            Recommendation::Central => self.recommendation.central,
            Recommendation::Local => self.recommendation.local,
            Recommendation::Company => self.recommendation.company,
            Recommendation::None | Recommendation::Unknown => 0,
        }
    }
}

pub fn score(input: &SkilledWorkerInput, table: &SkilledWorkerTable) -> TrackScore {
    let mut details = TrackDetails {
        threshold: table.pass_score,
        ..Default::default()
    };

    details.add("income", band_points(&table.income, input.annual_income));
    details.add("korean_level", input.korean_level.points(&table.korean));
    details.add("age", age_points(&table.age, input.age));
    details.add(
        "years_at_workplace",
        band_points(&table.experience, i64::from(input.years_at_workplace)),
    );
    details.add(
        "recommendation",
        table.recommendation_points(input.recommendation),
    );
    if input.rural_area_work {
        details.add("rural_area_work", table.rural_area_work);
    }
    if input.domestic_degree {
        details.add("domestic_degree", table.domestic_degree);
    }

    let earned = details.sum();
    TrackScore {
        track: Track::SkilledWorker,
        value: ScoreValue::Points {
            earned,
            max: table.max_score,
        },
        pass: earned >= table.pass_score,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant() -> SkilledWorkerInput {
        SkilledWorkerInput {
            annual_income: 36_000_000,
            korean_level: KoreanLevel::Level3,
            age: 30,
            years_at_workplace: 3,
            recommendation: Recommendation::None,
            rural_area_work: false,
            domestic_degree: false,
        }
    }

    fn points(input: &SkilledWorkerInput) -> u32 {
        score(input, &SkilledWorkerTable::default())
            .value
            .points()
            .unwrap()
    }

    #[test]
    fn typical_applicant_passes() {
        let result = score(&applicant(), &SkilledWorkerTable::default());
        // 80 income + 80 korean + 60 age + 10 experience
        assert_eq!(result.value, ScoreValue::Points { earned: 230, max: 300 });
        assert!(result.pass);
        assert_eq!(result.details.threshold, 200);

        let weaker = SkilledWorkerInput {
            korean_level: KoreanLevel::Level1,
            ..applicant()
        };
        assert_eq!(points(&weaker), 160);
        assert!(!score(&weaker, &SkilledWorkerTable::default()).pass);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        let input = SkilledWorkerInput {
            annual_income: 26_000_000,
            korean_level: KoreanLevel::Level3,
            age: 30,
            years_at_workplace: 2,
            ..Default::default()
        };
        // 50 + 80 + 60 + 10
        assert_eq!(points(&input), 200);
        assert!(score(&input, &SkilledWorkerTable::default()).pass);

        let input = SkilledWorkerInput {
            years_at_workplace: 1,
            ..input
        };
        assert_eq!(points(&input), 190);
        assert!(!score(&input, &SkilledWorkerTable::default()).pass);
    }

    #[test]
    fn age_bands() {
        let at = |age| {
            points(&SkilledWorkerInput {
                age,
                ..Default::default()
            })
        };
        assert_eq!(at(18), 0);
        assert_eq!(at(19), 40);
        assert_eq!(at(26), 40);
        assert_eq!(at(27), 60);
        assert_eq!(at(33), 60);
        assert_eq!(at(34), 30);
        assert_eq!(at(40), 30);
        assert_eq!(at(41), 0);
    }

    #[test]
    fn recommendation_counts_once() {
        let base = points(&applicant());
        for (recommendation, bonus) in [
            (Recommendation::Central, 40),
            (Recommendation::Local, 30),
            (Recommendation::Company, 20),
            (Recommendation::Unknown, 0),
        ] {
            let input = SkilledWorkerInput {
                recommendation,
                ..applicant()
            };
            assert_eq!(points(&input), base + bonus);
        }
    }

    #[test]
    fn positive_inputs_never_lower_the_score() {
        let base = applicant();
        let base_points = points(&base);
        let with = |input: SkilledWorkerInput| points(&input);

        for income in [40_000_000, 50_000_000, 90_000_000] {
            let raised = with(SkilledWorkerInput {
                annual_income: income,
                ..base.clone()
            });
            assert!(raised >= base_points);
        }
        for level in [KoreanLevel::Level4, KoreanLevel::Level5, KoreanLevel::Level6] {
            let raised = with(SkilledWorkerInput {
                korean_level: level,
                ..base.clone()
            });
            assert!(raised >= base_points);
        }
        for years in [4, 10] {
            let raised = with(SkilledWorkerInput {
                years_at_workplace: years,
                ..base.clone()
            });
            assert!(raised >= base_points);
        }
        let rural = with(SkilledWorkerInput {
            rural_area_work: true,
            ..base.clone()
        });
        assert!(rural > base_points);
        let degree = with(SkilledWorkerInput {
            domestic_degree: true,
            ..base.clone()
        });
        assert!(degree > base_points);
    }

    #[test]
    fn bonuses_are_independent() {
        let both = SkilledWorkerInput {
            rural_area_work: true,
            domestic_degree: true,
            ..applicant()
        };
        assert_eq!(points(&both), points(&applicant()) + 40);
    }
}
