//! Visa point scoring.
//!
//! Each visa track has its own scorer, input record and point table.
//! The scorers share only their output shape; [`score_track`]
//! dispatches on the [`TrackInput`] tag.  Three tracks produce additive
//! point totals.  The permanent-residence track produces a percentage
//! of an income requirement instead, and [`ScoreValue`] keeps the two
//! apart so they are never summed together.
//!
//! Categorical inputs that are missing or unrecognised score zero.
//! The scorers are meant to run on half-filled forms, so they degrade
//! rather than validate.

pub mod job_seeker;
pub mod legacy;
pub mod permanent_residence;
pub mod points_resident;
pub mod skilled_worker;

use serde::{Deserialize, Serialize};

pub use job_seeker::{JobSeekerInput, JobSeekerTable};
pub use legacy::{score_legacy, score_legacy_by_code, LegacyAnswers};
pub use permanent_residence::{IncomeTrack, PermanentResidenceInput, PermanentResidencePolicy};
pub use points_resident::{PointsResidentInput, PointsResidentTable};
pub use skilled_worker::{Recommendation, SkilledWorkerInput, SkilledWorkerTable};

/// Korean proficiency (TOPIK level or integration programme stage).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KoreanLevel {
    #[default]
    None,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    Level6,
    #[serde(other)]
    Unknown,
}

impl KoreanLevel {
    /// Index into a six-entry point table.
    pub fn index(self) -> Option<usize> {
        match self {
            KoreanLevel::Level1 => Some(0),
            KoreanLevel::Level2 => Some(1),
            KoreanLevel::Level3 => Some(2),
            KoreanLevel::Level4 => Some(3),
            KoreanLevel::Level5 => Some(4),
            KoreanLevel::Level6 => Some(5),
            KoreanLevel::None | KoreanLevel::Unknown => None,
        }
    }

    pub fn points(self, table: &[u32; 6]) -> u32 {
        self.index().map(|i| table[i]).unwrap_or(0)
    }
}

/// Highest completed education.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationTier {
    #[default]
    None,
    Associate,
    Bachelor,
    Master,
    MasterStem,
    Doctorate,
    DoctorateStem,
    #[serde(other)]
    Unknown,
}

/// Points per education tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationPoints {
    pub associate: u32,
    pub bachelor: u32,
    pub master: u32,
    pub master_stem: u32,
    pub doctorate: u32,
    pub doctorate_stem: u32,
}

impl EducationPoints {
    pub fn points(&self, tier: EducationTier) -> u32 {
        match tier {
            EducationTier::Associate => self.associate,
            EducationTier::Bachelor => self.bachelor,
            EducationTier::Master => self.master,
            EducationTier::MasterStem => self.master_stem,
            EducationTier::Doctorate => self.doctorate,
            EducationTier::DoctorateStem => self.doctorate_stem,
            EducationTier::None | EducationTier::Unknown => 0,
        }
    }
}

/// A "value at least `min`" band.  Tables list bands from the highest
/// minimum down; the first band the value reaches wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBand {
    pub min: i64,
    pub points: u32,
}

pub fn band_points(bands: &[PointBand], value: i64) -> u32 {
    bands
        .iter()
        .find(|band| value >= band.min)
        .map(|band| band.points)
        .unwrap_or(0)
}

/// An inclusive age range.  `max_age: None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub min_age: u32,
    pub max_age: Option<u32>,
    pub points: u32,
}

pub fn age_points(bands: &[AgeBand], age: u32) -> u32 {
    bands
        .iter()
        .find(|band| age >= band.min_age && band.max_age.map_or(true, |max| age <= max))
        .map(|band| band.points)
        .unwrap_or(0)
}

/// Point tables and thresholds for every track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub skilled_worker: SkilledWorkerTable,
    pub points_resident: PointsResidentTable,
    pub job_seeker: JobSeekerTable,
    pub permanent_residence: PermanentResidencePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    SkilledWorker,
    PointsResident,
    JobSeeker,
    PermanentResidence,
    Legacy,
}

/// Scorer input, tagged by track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "track", rename_all = "snake_case")]
pub enum TrackInput {
    SkilledWorker(SkilledWorkerInput),
    PointsResident(PointsResidentInput),
    JobSeeker(JobSeekerInput),
    PermanentResidence(PermanentResidenceInput),
}

impl TrackInput {
    pub fn track(&self) -> Track {
        match self {
            TrackInput::SkilledWorker(_) => Track::SkilledWorker,
            TrackInput::PointsResident(_) => Track::PointsResident,
            TrackInput::JobSeeker(_) => Track::JobSeeker,
            TrackInput::PermanentResidence(_) => Track::PermanentResidence,
        }
    }
}

/// Either a point total or a percentage of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreValue {
    Points { earned: u32, max: u32 },
    PercentOfRequirement { percent: u32 },
}

impl ScoreValue {
    /// The point total, or `None` for percentage scores.
    pub fn points(&self) -> Option<u32> {
        match self {
            ScoreValue::Points { earned, .. } => Some(*earned),
            ScoreValue::PercentOfRequirement { .. } => None,
        }
    }

    /// The raw number shown to the user, whatever its unit.
    pub fn display_value(&self) -> u32 {
        match self {
            ScoreValue::Points { earned, .. } => *earned,
            ScoreValue::PercentOfRequirement { percent } => *percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: String,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetails {
    pub components: Vec<ScoreComponent>,
    /// Pass threshold in the unit of the score.
    pub threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_income: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visa_code: Option<String>,
}

impl TrackDetails {
    pub(crate) fn add(&mut self, factor: &str, points: u32) -> u32 {
        self.components.push(ScoreComponent {
            factor: factor.to_string(),
            points,
        });
        points
    }

    /// Saturates at `u32::MAX`; extra points come straight from callers.
    pub(crate) fn sum(&self) -> u32 {
        self.components
            .iter()
            .fold(0u32, |total, c| total.saturating_add(c.points))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackScore {
    pub track: Track,
    pub value: ScoreValue,
    pub pass: bool,
    pub details: TrackDetails,
}

/// Runs the scorer for the input's track.
pub fn score_track(input: &TrackInput, policy: &ScoringPolicy) -> TrackScore {
    let score = match input {
        TrackInput::SkilledWorker(input) => skilled_worker::score(input, &policy.skilled_worker),
        TrackInput::PointsResident(input) => {
            points_resident::score(input, &policy.points_resident)
        }
        TrackInput::JobSeeker(input) => job_seeker::score(input, &policy.job_seeker),
        TrackInput::PermanentResidence(input) => {
            permanent_residence::score(input, &policy.permanent_residence)
        }
    };
    tracing::debug!(
        track = ?score.track,
        score = score.value.display_value(),
        pass = score.pass,
        "scored visa track"
    );
    score
}
