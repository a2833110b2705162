//! Pension lump-sum refund estimation.
//!
//! A foreign contributor leaving the country may claim a lump-sum refund
//! of pension contributions.  Eligibility depends on the visa held and
//! on the contributor's nationality; the refund itself is modelled as
//! the contributions paid, compounded at the current year's interest
//! rate over the contribution period.

use crate::error::PolicyResult;
use crate::money::{dec, non_negative, truncate};
use crate::policy::{CountryStatus, PensionCountryEntry, PensionRefundPolicy, PolicyTables};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefundInput {
    pub visa_code: String,
    pub contribution_months: u32,
    pub average_monthly_income: i64,
    /// Annual interest rate for the current year, e.g. `0.03`.
    pub annual_interest_rate: Decimal,
}

/// Why a refund was or was not granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    VisaException,
    CountryAgreement,
    ConditionalThresholdMet,
    ConditionalThresholdNotMet,
    CountryNotEligible,
}

impl RefundReason {
    pub fn is_eligible(self) -> bool {
        matches!(
            self,
            RefundReason::VisaException
                | RefundReason::CountryAgreement
                | RefundReason::ConditionalThresholdMet
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundEstimate {
    pub eligible: bool,
    pub reason: RefundReason,
    /// Contributions paid before interest.  Zero when ineligible.
    pub contributed_principal: i64,
    /// Principal with compound interest, truncated.  Zero when ineligible.
    pub estimated_amount: i64,
    /// Set when the grown amount does not fit in an `i64`.
    /// `estimated_amount` then holds `i64::MAX`.
    #[serde(default)]
    pub capped: bool,
}

pub struct PensionRefundEstimator<'a> {
    policy: &'a PensionRefundPolicy,
}

impl<'a> PensionRefundEstimator<'a> {
    pub fn new(policy: &'a PensionRefundPolicy) -> Self {
        Self { policy }
    }

    /// Rules are evaluated in order and the first match decides.
    pub fn eligibility(
        &self,
        nationality: &PensionCountryEntry,
        input: &RefundInput,
    ) -> RefundReason {
        if self.policy.is_special_visa(&input.visa_code) {
            return RefundReason::VisaException;
        }
        match nationality.status {
            CountryStatus::Eligible => RefundReason::CountryAgreement,
            CountryStatus::Conditional
                if input.contribution_months >= self.policy.conditional_min_months =>
            {
                RefundReason::ConditionalThresholdMet
            }
            CountryStatus::Conditional => RefundReason::ConditionalThresholdNotMet,
            CountryStatus::Ineligible => RefundReason::CountryNotEligible,
        }
    }

    pub fn estimate(
        &self,
        nationality: &PensionCountryEntry,
        input: &RefundInput,
    ) -> RefundEstimate {
        let reason = self.eligibility(nationality, input);
        if !reason.is_eligible() {
            return RefundEstimate {
                eligible: false,
                reason,
                contributed_principal: 0,
                estimated_amount: 0,
                capped: false,
            };
        }

        let principal = dec(non_negative(input.average_monthly_income))
            .checked_mul(self.policy.contribution_rate)
            .and_then(|monthly| monthly.checked_mul(Decimal::from(input.contribution_months)));
        let grown = principal.and_then(|principal| {
            growth_factor(input.annual_interest_rate, input.contribution_months)
                .and_then(|factor| principal.checked_mul(factor))
        });
        let (amount, capped) = match grown.and_then(|value| value.floor().to_i64()) {
            Some(amount) => (amount, false),
            None => {
                warn!(
                    months = input.contribution_months,
                    income = input.average_monthly_income,
                    "pension refund exceeds representable range"
                );
                (i64::MAX, true)
            }
        };
        debug!(
            country = %nationality.code,
            ?reason,
            months = input.contribution_months,
            amount,
            "estimated pension refund"
        );

        RefundEstimate {
            eligible: true,
            reason,
            contributed_principal: principal.map(truncate).unwrap_or(i64::MAX),
            estimated_amount: amount,
            capped,
        }
    }
}

/// `(1 + rate) ^ (months / 12)`.  Whole years use an exact integer
/// power; only the leftover months go through the fractional power.
/// Negative rates count as zero, so the refund never falls below the
/// principal.
fn growth_factor(annual_rate: Decimal, months: u32) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(annual_rate.max(Decimal::ZERO))?;
    let years = u64::from(months / 12);
    let leftover = months % 12;

    let whole = base.checked_powu(years)?;
    if leftover == 0 {
        return Some(whole);
    }
    let fraction = Decimal::from(leftover) / Decimal::from(12);
    whole.checked_mul(base.checked_powd(fraction)?)
}

/// Looks up the contributor's nationality and estimates the refund.
pub fn estimate_refund(
    tables: &PolicyTables,
    country_code: &str,
    input: &RefundInput,
) -> PolicyResult<RefundEstimate> {
    let nationality = tables.country(country_code)?;
    Ok(PensionRefundEstimator::new(&tables.pension).estimate(nationality, input))
}
