//! Calculation dispatch.
//!
//! The `engine` module routes a [`CalculationRequest`] to its calculator
//! and runs batches of requests.  Calculators are pure functions over
//! read-only [`PolicyTables`], so a batch is spread across CPU cores
//! with [`rayon`] without any coordination between requests.

use crate::error::PolicyResult;
use crate::models::{
    BatchInput, BatchResult, CalculationOutcome, CalculationRequest, CalculationResult,
};
use crate::payroll::compute_net_pay;
use crate::pension::estimate_refund;
use crate::policy::PolicyTables;
use crate::scoring::{score_legacy_by_code, score_track};
use rayon::prelude::*;
use tracing::{debug, info};

/// Runs a single request.
pub fn evaluate(
    request: &CalculationRequest,
    tables: &PolicyTables,
) -> PolicyResult<CalculationResult> {
    match request {
        CalculationRequest::NetPay { fiscal_year, input } => {
            compute_net_pay(tables, fiscal_year, input).map(CalculationResult::NetPay)
        }
        CalculationRequest::PensionRefund {
            country_code,
            input,
        } => estimate_refund(tables, country_code, input).map(CalculationResult::PensionRefund),
        CalculationRequest::VisaScore { input } => Ok(CalculationResult::VisaScore(score_track(
            input,
            &tables.scoring,
        ))),
        CalculationRequest::LegacyScore { answers } => {
            score_legacy_by_code(tables, answers).map(CalculationResult::LegacyScore)
        }
    }
}

/// Runs every request in the batch.  One failing request does not
/// affect the others; its slot holds the error instead.
pub fn run_batch(input: BatchInput, tables: &PolicyTables) -> BatchResult {
    let count = input.requests.len();
    let results: Vec<CalculationOutcome> = input
        .requests
        .into_par_iter()
        .map(|request| match evaluate(&request, tables) {
            Ok(result) => CalculationOutcome::Ok(result),
            Err(err) => {
                debug!(error = %err, "calculation failed");
                CalculationOutcome::Error {
                    not_found: err.is_not_found(),
                    message: err.to_string(),
                }
            }
        })
        .collect();

    let failed = results.iter().filter(|outcome| !outcome.is_ok()).count();
    info!(count, failed, "batch evaluated");
    BatchResult { results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::NetPayInput;
    use crate::pension::{RefundInput, RefundReason};
    use crate::scoring::{IncomeTrack, PermanentResidenceInput, PointsResidentInput, TrackInput};
    use rust_decimal::Decimal;

    fn net_pay(year: &str) -> CalculationRequest {
        CalculationRequest::NetPay {
            fiscal_year: year.into(),
            input: NetPayInput {
                gross_salary: 3_000_000,
                non_taxable_allowance: 200_000,
                dependent_count: 1,
            },
        }
    }

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let tables = PolicyTables::builtin();
        let requests = vec![
            net_pay("2024"),
            net_pay("1990"),
            CalculationRequest::PensionRefund {
                country_code: "PH".into(),
                input: RefundInput {
                    visa_code: "E-9".into(),
                    contribution_months: 36,
                    average_monthly_income: 2_100_000,
                    annual_interest_rate: Decimal::new(3, 2),
                },
            },
            CalculationRequest::VisaScore {
                input: TrackInput::PermanentResidence(PermanentResidenceInput {
                    annual_income: 44_051_000,
                    income_track: IncomeTrack::Stem,
                }),
            },
        ];

        let batch = run_batch(BatchInput { requests }, &tables);
        assert_eq!(batch.results.len(), 4);

        match &batch.results[0] {
            CalculationOutcome::Ok(CalculationResult::NetPay(result)) => {
                assert_eq!(result.net_pay, 2_619_710)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match &batch.results[1] {
            CalculationOutcome::Error { not_found, message } => {
                assert!(*not_found);
                assert!(message.contains("1990"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match &batch.results[2] {
            CalculationOutcome::Ok(CalculationResult::PensionRefund(estimate)) => {
                assert_eq!(estimate.reason, RefundReason::VisaException)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        match &batch.results[3] {
            CalculationOutcome::Ok(CalculationResult::VisaScore(score)) => assert!(score.pass),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn extreme_inputs_do_not_sink_the_batch() {
        let tables = PolicyTables::builtin();
        let requests = vec![
            CalculationRequest::VisaScore {
                input: TrackInput::PointsResident(PointsResidentInput {
                    age: 31,
                    extra_points: u32::MAX,
                    ..Default::default()
                }),
            },
            CalculationRequest::NetPay {
                fiscal_year: "2024".into(),
                input: NetPayInput {
                    gross_salary: i64::MAX / 4,
                    ..Default::default()
                },
            },
            net_pay("2024"),
        ];

        let batch = run_batch(BatchInput { requests }, &tables);
        assert!(batch.results.iter().all(CalculationOutcome::is_ok));
        match &batch.results[0] {
            CalculationOutcome::Ok(CalculationResult::VisaScore(score)) => assert!(score.pass),
            other => panic!("unexpected outcome {other:?}"),
        }
        match &batch.results[1] {
            CalculationOutcome::Ok(CalculationResult::NetPay(result)) => {
                assert_eq!(result.net_pay + result.total_deduction, i64::MAX / 4)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn batch_results_match_single_evaluation() {
        let tables = PolicyTables::builtin();
        let requests: Vec<_> = ["2023", "2024", "2025"]
            .into_iter()
            .cycle()
            .take(30)
            .map(net_pay)
            .collect();
        let expected: Vec<_> = requests
            .iter()
            .map(|r| CalculationOutcome::Ok(evaluate(r, &tables).unwrap()))
            .collect();
        let batch = run_batch(BatchInput { requests }, &tables);
        assert_eq!(batch.results, expected);
    }

    #[test]
    fn requests_deserialize_from_json() {
        let request: CalculationRequest = serde_json::from_value(serde_json::json!({
            "kind": "pension_refund",
            "country_code": "CN",
            "input": {
                "visa_code": "E-7-1",
                "contribution_months": 12,
                "average_monthly_income": 2_000_000,
                "annual_interest_rate": "0.03"
            }
        }))
        .unwrap();
        let tables = PolicyTables::builtin();
        match evaluate(&request, &tables).unwrap() {
            CalculationResult::PensionRefund(estimate) => {
                assert!(estimate.eligible);
                assert_eq!(estimate.estimated_amount, 2_224_800);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
