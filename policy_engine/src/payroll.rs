//! Net pay calculation.
//!
//! The `payroll` module turns a monthly gross salary into the statutory
//! deductions an employee sees on a payslip: national pension, health
//! insurance, long-term care, employment insurance, income tax and local
//! income tax.  Income tax uses the annualised method: the monthly
//! taxable income is scaled to a year, run through the earned income
//! deduction, personal deductions, progressive brackets and the earned
//! income tax credit, and the resulting annual tax is spread back over
//! twelve months.
//!
//! Every line is floored to a multiple of ten before it is summed.

use crate::error::PolicyResult;
use crate::money::{dec, floor_to_10, non_negative};
use crate::policy::{select_band, FiscalYearRates, PolicyTables, TaxCreditRule};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Input to the net pay calculator.  All amounts are monthly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetPayInput {
    pub gross_salary: i64,
    /// Allowances exempt from premiums and tax, e.g. meal allowance.
    #[serde(default)]
    pub non_taxable_allowance: i64,
    /// Number of people the personal deduction is claimed for,
    /// including the employee.
    #[serde(default)]
    pub dependent_count: u32,
}

/// Monthly deduction lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// Gross salary minus non-taxable allowance.
    pub taxable_base: i64,
    /// Taxable base clamped into the pension floor/ceiling band.
    pub pension_base: i64,
    pub national_pension: i64,
    pub health_insurance: i64,
    pub long_term_care: i64,
    pub employment_insurance: i64,
    pub income_tax: i64,
    pub local_income_tax: i64,
}

impl DeductionBreakdown {
    /// Sum of all premium and tax lines.
    pub fn total(&self) -> i64 {
        self.national_pension
            + self.health_insurance
            + self.long_term_care
            + self.employment_insurance
            + self.income_tax
            + self.local_income_tax
    }
}

/// The annualised income tax steps, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxWorksheet {
    pub annual_income: i64,
    pub earned_income_deduction: Decimal,
    pub personal_deduction: i64,
    pub tax_base: Decimal,
    pub calculated_tax: Decimal,
    pub tax_credit: Decimal,
    /// Annual tax after the credit, never negative.
    pub determined_tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPayResult {
    pub fiscal_year: String,
    pub gross_salary: i64,
    pub net_pay: i64,
    pub total_deduction: i64,
    pub breakdown: DeductionBreakdown,
    /// Absent when there is no taxable income.
    pub worksheet: Option<IncomeTaxWorksheet>,
}

/// Calculates net pay against one fiscal year's rates.
pub struct NetPayCalculator<'a> {
    rates: &'a FiscalYearRates,
}

impl<'a> NetPayCalculator<'a> {
    pub fn new(rates: &'a FiscalYearRates) -> Self {
        Self { rates }
    }

    pub fn compute(&self, input: &NetPayInput) -> NetPayResult {
        let rates = self.rates;
        let gross = non_negative(input.gross_salary);
        let taxable = gross - non_negative(input.non_taxable_allowance);

        if taxable <= 0 {
            return NetPayResult {
                fiscal_year: rates.year.clone(),
                gross_salary: gross,
                net_pay: gross,
                total_deduction: 0,
                breakdown: DeductionBreakdown::default(),
                worksheet: None,
            };
        }

        let pension_base = taxable.max(rates.pension_floor).min(rates.pension_ceiling);
        let national_pension =
            floor_to_10(dec(pension_base) * rates.pension_rate * rates.pension_employee_share);
        let health_insurance =
            floor_to_10(dec(taxable) * rates.health_rate * rates.health_employee_share);
        let long_term_care = floor_to_10(dec(health_insurance) * rates.long_term_care_rate);
        let employment_insurance = floor_to_10(dec(taxable) * rates.employment_rate);

        let annual_income = taxable.saturating_mul(12);
        let worksheet = annual_income_tax(rates, annual_income, input.dependent_count);
        let income_tax = floor_to_10(worksheet.determined_tax / Decimal::from(12)).max(0);
        let local_income_tax = floor_to_10(dec(income_tax) * rates.local_tax_rate).max(0);

        let breakdown = DeductionBreakdown {
            taxable_base: taxable,
            pension_base,
            national_pension,
            health_insurance,
            long_term_care,
            employment_insurance,
            income_tax,
            local_income_tax,
        };
        let total_deduction = breakdown.total();
        debug!(
            year = %rates.year,
            gross,
            taxable,
            total_deduction,
            "computed net pay"
        );

        NetPayResult {
            fiscal_year: rates.year.clone(),
            gross_salary: gross,
            net_pay: gross - total_deduction,
            total_deduction,
            breakdown,
            worksheet: Some(worksheet),
        }
    }
}

/// Looks up `fiscal_year` and computes net pay.  A year missing from
/// the tables is reported, never substituted.
pub fn compute_net_pay(
    tables: &PolicyTables,
    fiscal_year: &str,
    input: &NetPayInput,
) -> PolicyResult<NetPayResult> {
    let rates = tables.fiscal_year(fiscal_year)?;
    Ok(NetPayCalculator::new(rates).compute(input))
}

/// Runs the annual income tax steps for an annual earned income.
pub fn annual_income_tax(
    rates: &FiscalYearRates,
    annual_income: i64,
    dependent_count: u32,
) -> IncomeTaxWorksheet {
    let annual_income = non_negative(annual_income);
    let earned_income_deduction = earned_income_deduction(rates, annual_income);
    let personal_deduction = rates
        .personal_deduction
        .saturating_mul(i64::from(dependent_count));

    let tax_base = (dec(annual_income) - earned_income_deduction - dec(personal_deduction))
        .max(Decimal::ZERO);
    let calculated_tax = tax_on_base(rates, tax_base);
    let tax_credit = earned_income_tax_credit(&rates.tax_credit, calculated_tax, annual_income);
    let determined_tax = (calculated_tax - tax_credit).max(Decimal::ZERO);

    IncomeTaxWorksheet {
        annual_income,
        earned_income_deduction,
        personal_deduction,
        tax_base,
        calculated_tax,
        tax_credit,
        determined_tax,
    }
}

fn earned_income_deduction(rates: &FiscalYearRates, annual_income: i64) -> Decimal {
    let deduction = match select_band(&rates.earned_income_brackets, annual_income) {
        Some((lower, bracket)) => {
            dec(bracket.base_deduction) + dec(annual_income - lower) * bracket.rate
        }
        None => Decimal::ZERO,
    };
    deduction.min(dec(rates.earned_income_deduction_cap))
}

fn tax_on_base(rates: &FiscalYearRates, tax_base: Decimal) -> Decimal {
    // Brackets are keyed on whole units; a fractional base belongs to
    // the bracket of its integer part.
    let key = tax_base.floor().to_i64().unwrap_or(i64::MAX);
    match select_band(&rates.income_tax_brackets, key) {
        Some((_, bracket)) => {
            (tax_base * bracket.rate - dec(bracket.cumulative_deduction)).max(Decimal::ZERO)
        }
        None => Decimal::ZERO,
    }
}

fn earned_income_tax_credit(
    rule: &TaxCreditRule,
    calculated_tax: Decimal,
    salary: i64,
) -> Decimal {
    let threshold = dec(rule.threshold);
    let credit = if calculated_tax <= threshold {
        calculated_tax * rule.lower_rate
    } else {
        threshold * rule.lower_rate + (calculated_tax - threshold) * rule.upper_rate
    };

    match select_band(&rule.ceilings, salary) {
        Some((_, ceiling)) => {
            let over = salary.saturating_sub(ceiling.reduction_start).max(0);
            let reduction = dec(over) * ceiling.reduction_rate;
            let limit = (dec(ceiling.base) - reduction).max(dec(ceiling.minimum));
            credit.min(limit)
        }
        None => credit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;

    fn input(gross: i64, allowance: i64, dependents: u32) -> NetPayInput {
        NetPayInput {
            gross_salary: gross,
            non_taxable_allowance: allowance,
            dependent_count: dependents,
        }
    }

    #[test]
    fn reference_salary_2024() {
        let tables = PolicyTables::builtin();
        let result = compute_net_pay(&tables, "2024", &input(3_000_000, 200_000, 1)).unwrap();
        let b = &result.breakdown;

        assert_eq!(b.taxable_base, 2_800_000);
        assert_eq!(b.pension_base, 2_800_000);
        assert_eq!(b.national_pension, 126_000);
        assert_eq!(b.health_insurance, 99_260);
        assert_eq!(b.long_term_care, 12_850);
        assert_eq!(b.employment_insurance, 25_200);
        assert_eq!(b.income_tax, 106_350);
        assert_eq!(b.local_income_tax, 10_630);
        assert_eq!(result.total_deduction, 380_290);
        assert_eq!(result.net_pay, 2_619_710);
        assert_eq!(result.net_pay + result.total_deduction, 3_000_000);

        let worksheet = result.worksheet.unwrap();
        assert_eq!(worksheet.annual_income, 33_600_000);
        assert_eq!(worksheet.earned_income_deduction, Decimal::from(10_290_000));
        assert_eq!(worksheet.tax_base, Decimal::from(21_810_000));
        assert_eq!(worksheet.calculated_tax, Decimal::from(2_011_500));
        // 928_450 by rate, capped at 735_200 for a 33.6M salary.
        assert_eq!(worksheet.tax_credit, Decimal::from(735_200));
        assert_eq!(worksheet.determined_tax, Decimal::from(1_276_300));
    }

    #[test]
    fn low_salary_credit_is_rate_limited() {
        let tables = PolicyTables::builtin();
        let result = compute_net_pay(&tables, "2024", &input(1_000_000, 0, 1)).unwrap();
        let b = &result.breakdown;

        assert_eq!(b.national_pension, 45_000);
        assert_eq!(b.health_insurance, 35_450);
        assert_eq!(b.long_term_care, 4_590);
        assert_eq!(b.employment_insurance, 9_000);
        assert_eq!(b.income_tax, 9_450);
        assert_eq!(b.local_income_tax, 940);
        assert_eq!(result.net_pay, 895_570);
    }

    #[test]
    fn allowance_covering_gross_means_no_deductions() {
        let tables = PolicyTables::builtin();
        for allowance in [3_000_000, 5_000_000] {
            let result =
                compute_net_pay(&tables, "2024", &input(3_000_000, allowance, 1)).unwrap();
            assert_eq!(result.net_pay, 3_000_000);
            assert_eq!(result.total_deduction, 0);
            assert_eq!(result.breakdown, DeductionBreakdown::default());
            assert!(result.worksheet.is_none());
        }
    }

    #[test]
    fn negative_inputs_are_clamped() {
        let tables = PolicyTables::builtin();
        let result = compute_net_pay(&tables, "2024", &input(-100, -50, 0)).unwrap();
        assert_eq!(result.gross_salary, 0);
        assert_eq!(result.net_pay, 0);

        let a = compute_net_pay(&tables, "2024", &input(2_000_000, -50, 1)).unwrap();
        let b = compute_net_pay(&tables, "2024", &input(2_000_000, 0, 1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pension_base_stays_in_band() {
        let tables = PolicyTables::builtin();
        let rates = tables.fiscal_year("2024").unwrap();
        for gross in [1, 10_000, 390_000, 2_000_000, 6_170_000, 100_000_000, 10_000_000_000] {
            let result = NetPayCalculator::new(rates).compute(&input(gross, 0, 1));
            let base = result.breakdown.pension_base;
            assert!(base >= rates.pension_floor && base <= rates.pension_ceiling);
        }
        let capped = NetPayCalculator::new(rates).compute(&input(100_000_000, 0, 1));
        assert_eq!(capped.breakdown.national_pension, 277_650);
    }

    #[test]
    fn totals_reconcile_for_every_year() {
        let tables = PolicyTables::builtin();
        for year in tables.years() {
            for gross in [500_000, 2_500_000, 4_000_000, 9_000_000, 40_000_000] {
                let result = compute_net_pay(&tables, year, &input(gross, 200_000, 2)).unwrap();
                assert_eq!(result.breakdown.total(), result.total_deduction);
                assert_eq!(result.net_pay + result.total_deduction, gross);
                assert!(result.breakdown.income_tax >= 0);
                assert_eq!(result.breakdown.income_tax % 10, 0);
                assert_eq!(result.breakdown.local_income_tax % 10, 0);
            }
        }
    }

    #[test]
    fn net_pay_never_drops_as_allowance_grows() {
        let tables = PolicyTables::builtin();
        let mut previous = i64::MIN;
        for allowance in (0..=4_000_000).step_by(100_000) {
            let result = compute_net_pay(&tables, "2024", &input(4_000_000, allowance, 1)).unwrap();
            assert!(result.net_pay >= previous, "allowance {allowance}");
            previous = result.net_pay;
        }
    }

    #[test]
    fn dependents_reduce_tax() {
        let tables = PolicyTables::builtin();
        let single = compute_net_pay(&tables, "2024", &input(5_000_000, 0, 1)).unwrap();
        let family = compute_net_pay(&tables, "2024", &input(5_000_000, 0, 4)).unwrap();
        assert!(family.breakdown.income_tax < single.breakdown.income_tax);
        assert_eq!(
            family.breakdown.national_pension,
            single.breakdown.national_pension
        );
    }

    #[test]
    fn large_deductions_floor_tax_at_zero() {
        let tables = PolicyTables::builtin();
        let rates = tables.fiscal_year("2024").unwrap();
        let worksheet = annual_income_tax(rates, 12_000_000, 20);
        assert_eq!(worksheet.tax_base, Decimal::ZERO);
        assert_eq!(worksheet.determined_tax, Decimal::ZERO);
    }

    #[test]
    fn salaries_past_the_annual_range_saturate() {
        let tables = PolicyTables::builtin();
        let gross = i64::MAX / 4;
        let result = compute_net_pay(&tables, "2024", &input(gross, 0, 1)).unwrap();
        assert_eq!(result.net_pay + result.total_deduction, gross);
        assert_eq!(result.worksheet.as_ref().unwrap().annual_income, i64::MAX);
        assert!(result.breakdown.income_tax > 0);
        assert!(result.net_pay > 0);
    }

    #[test]
    fn unknown_year_is_reported() {
        let tables = PolicyTables::builtin();
        let err = compute_net_pay(&tables, "2019", &input(3_000_000, 0, 1)).unwrap_err();
        assert!(matches!(err, PolicyError::FiscalYearNotFound(year) if year == "2019"));
    }
}
