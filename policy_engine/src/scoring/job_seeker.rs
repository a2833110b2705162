//! Job-seeker track.
//!
//! Age, education and two yes/no bonuses.  Korean proficiency only ever
//! adds points; leaving it out costs nothing.  Income is not scored.

use super::{
    age_points, AgeBand, EducationPoints, EducationTier, KoreanLevel, ScoreValue, Track,
    TrackDetails, TrackScore,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSeekerInput {
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub education: EducationTier,
    /// Worked or studied at a globally ranked company or university.
    #[serde(default)]
    pub global_institution_experience: bool,
    #[serde(default)]
    pub stem_major: bool,
    #[serde(default)]
    pub korean_level: Option<KoreanLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeekerTable {
    pub age: Vec<AgeBand>,
    pub education: EducationPoints,
    pub global_institution_experience: u32,
    pub stem_major: u32,
    pub korean_bonus: [u32; 6],
    pub pass_score: u32,
    pub max_score: u32,
}

impl Default for JobSeekerTable {
    fn default() -> Self {
        Self {
            age: vec![
                AgeBand { min_age: 18, max_age: Some(29), points: 20 },
                AgeBand { min_age: 30, max_age: Some(34), points: 15 },
                AgeBand { min_age: 35, max_age: Some(39), points: 10 },
                AgeBand { min_age: 40, max_age: None, points: 5 },
            ],
            education: EducationPoints {
                associate: 10,
                bachelor: 20,
                master: 25,
                master_stem: 25,
                doctorate: 30,
                doctorate_stem: 30,
            },
            global_institution_experience: 20,
            stem_major: 10,
            korean_bonus: [5, 10, 15, 20, 20, 20],
            pass_score: 60,
            max_score: 100,
        }
    }
}

pub fn score(input: &JobSeekerInput, table: &JobSeekerTable) -> TrackScore {
    let mut details = TrackDetails {
        threshold: table.pass_score,
        ..Default::default()
    };

    details.add("age", age_points(&table.age, input.age));
    details.add("education", table.education.points(input.education));
    if input.global_institution_experience {
        details.add(
            "global_institution_experience",
            table.global_institution_experience,
        );
    }
    if input.stem_major {
        details.add("stem_major", table.stem_major);
    }
    if let Some(level) = input.korean_level {
        details.add("korean_level", level.points(&table.korean_bonus));
    }

    let earned = details.sum();
    TrackScore {
        track: Track::JobSeeker,
        value: ScoreValue::Points {
            earned,
            max: table.max_score,
        },
        pass: earned >= table.pass_score,
        details,
    }
}
