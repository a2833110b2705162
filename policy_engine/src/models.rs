//! Request and response envelopes.
//!
//! The `models` module defines the serialisable records a caller uses to
//! ask for a calculation and the records it gets back.  Each request
//! names exactly one calculator; the calculators' own input and result
//! types live next to the calculators.

use crate::pension::{RefundEstimate, RefundInput};
use crate::payroll::{NetPayInput, NetPayResult};
use crate::scoring::{LegacyAnswers, TrackInput, TrackScore};
use serde::{Deserialize, Serialize};

/// One calculation to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationRequest {
    /// Monthly net pay for a fiscal year, e.g. `"2024"`.
    NetPay {
        fiscal_year: String,
        input: NetPayInput,
    },
    /// Lump-sum refund estimate for a nationality (ISO alpha-2 code).
    PensionRefund {
        country_code: String,
        input: RefundInput,
    },
    VisaScore {
        input: TrackInput,
    },
    LegacyScore {
        answers: LegacyAnswers,
    },
}

/// The result of a successful calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationResult {
    NetPay(NetPayResult),
    PensionRefund(RefundEstimate),
    VisaScore(TrackScore),
    LegacyScore(TrackScore),
}

/// The outcome of one request in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationOutcome {
    Ok(CalculationResult),
    Error {
        message: String,
        /// Set when the failure was a missing year, country or visa.
        not_found: bool,
    },
}

impl CalculationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CalculationOutcome::Ok(_))
    }
}

/// Input to the batch engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchInput {
    pub requests: Vec<CalculationRequest>,
}

/// Outcomes in the same order as the requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<CalculationOutcome>,
}
