//! Versioned policy tables.
//!
//! The `policy` module holds the reference data every calculator reads:
//! contribution rates and tax brackets per fiscal year, the pension
//! country list, the visa catalog and the constants of the scoring
//! tracks.  Tables are built once (see [`PolicyTables::builtin`]),
//! optionally extended from JSON documents on disk, validated and then
//! shared read-only.  Publishing a new fiscal year means adding a new
//! table; an existing year is never edited in place.

use crate::error::{PolicyError, PolicyResult};
use crate::scoring::ScoringPolicy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// A band in an ascending, "first match wins" bracket table.
pub trait Band {
    /// Inclusive upper bound.  `None` marks the unbounded final band.
    fn upper_limit(&self) -> Option<i64>;
}

/// Selects the first band whose upper limit covers `value`.
///
/// Bands are scanned top-down in table order and the scan stops at the
/// first band with `value <= upper_limit`.  The returned lower bound is
/// the previous band's upper limit (zero for the first band), which is
/// what the "excess over" formulas need.
pub fn select_band<B: Band>(bands: &[B], value: i64) -> Option<(i64, &B)> {
    let mut lower = 0;
    for band in bands {
        match band.upper_limit() {
            Some(limit) if value > limit => lower = limit,
            _ => return Some((lower, band)),
        }
    }
    None
}

/// One progressive income tax bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound of the annual tax base.
    pub upper_limit: Option<i64>,
    /// Marginal rate applied to the whole tax base.
    pub rate: Decimal,
    /// Amount subtracted from `tax_base * rate` ("quick deduction").
    pub cumulative_deduction: i64,
}

impl Band for TaxBracket {
    fn upper_limit(&self) -> Option<i64> {
        self.upper_limit
    }
}

/// One earned-income deduction bracket.  The deduction for an income
/// in this band is `base_deduction + (income - lower_bound) * rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnedIncomeBracket {
    pub upper_limit: Option<i64>,
    pub rate: Decimal,
    pub base_deduction: i64,
}

impl Band for EarnedIncomeBracket {
    fn upper_limit(&self) -> Option<i64> {
        self.upper_limit
    }
}

/// Income-dependent ceiling on the earned income tax credit.
///
/// The ceiling is `base - (salary - reduction_start) * reduction_rate`
/// but never below `minimum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCeiling {
    pub salary_upper_limit: Option<i64>,
    pub base: i64,
    pub reduction_start: i64,
    pub reduction_rate: Decimal,
    pub minimum: i64,
}

impl Band for CreditCeiling {
    fn upper_limit(&self) -> Option<i64> {
        self.salary_upper_limit
    }
}

/// Two-tier earned income tax credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreditRule {
    /// Calculated tax up to which `lower_rate` applies.
    pub threshold: i64,
    pub lower_rate: Decimal,
    pub upper_rate: Decimal,
    pub ceilings: Vec<CreditCeiling>,
}

/// Contribution rates and tax tables in force for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalYearRates {
    /// Year key, e.g. `"2024"`.
    pub year: String,
    pub pension_rate: Decimal,
    pub pension_employee_share: Decimal,
    /// Lower bound of the monthly income used for the pension premium.
    pub pension_floor: i64,
    /// Upper bound of the monthly income used for the pension premium.
    pub pension_ceiling: i64,
    pub health_rate: Decimal,
    pub health_employee_share: Decimal,
    /// Long-term care rate, applied to the health premium.
    pub long_term_care_rate: Decimal,
    /// Employee rate of employment insurance.
    pub employment_rate: Decimal,
    /// Ascending by `upper_limit`, last bracket unbounded.
    pub income_tax_brackets: Vec<TaxBracket>,
    /// Ascending by `upper_limit`, last bracket unbounded.
    pub earned_income_brackets: Vec<EarnedIncomeBracket>,
    pub earned_income_deduction_cap: i64,
    /// Annual personal deduction per dependent.
    pub personal_deduction: i64,
    pub tax_credit: TaxCreditRule,
    /// Local income tax as a share of income tax.
    pub local_tax_rate: Decimal,
}

/// Pension refund status of a nationality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryStatus {
    Eligible,
    Ineligible,
    Conditional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PensionCountryEntry {
    /// ISO 3166 alpha-2 code, upper case.
    pub code: String,
    pub name: String,
    pub status: CountryStatus,
    /// Human-readable condition, e.g. a minimum contribution period.
    #[serde(default)]
    pub condition: Option<String>,
    /// Whether a social security agreement is in force.
    #[serde(default)]
    pub agreement: Option<bool>,
}

/// Pension refund constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PensionRefundPolicy {
    /// Total contribution rate (employee and employer) used for the
    /// refund principal.
    pub contribution_rate: Decimal,
    /// Minimum contribution months for conditional nationalities.
    pub conditional_min_months: u32,
    /// Visa codes that are refundable regardless of nationality.
    pub special_visa_codes: BTreeSet<String>,
}

impl PensionRefundPolicy {
    pub fn is_special_visa(&self, visa_code: &str) -> bool {
        self.special_visa_codes.contains(&normalize_code(visa_code))
    }
}

/// UI grouping of a visa.  Never used by scoring logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaCategory {
    Professional,
    NonProfessional,
    Study,
    Residence,
    Family,
    Visit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredDocuments {
    #[serde(default)]
    pub personal: Vec<String>,
    #[serde(default)]
    pub company: Vec<String>,
}

/// A criterion of the legacy generic scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCriterion {
    pub key: String,
    pub label: String,
    pub points: u32,
}

/// Point-rule metadata attached to a visa for the legacy scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRules {
    pub pass_score: u32,
    pub max_score: u32,
    pub criteria: Vec<PointCriterion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaPolicy {
    /// Primary key, e.g. `"E-7-4"`.
    pub code: String,
    pub name: String,
    pub category: VisaCategory,
    #[serde(default)]
    pub max_stay: Option<String>,
    #[serde(default)]
    pub salary_requirement: Option<String>,
    #[serde(default)]
    pub allowed_activities: Vec<String>,
    #[serde(default)]
    pub restricted_activities: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Option<RequiredDocuments>,
    #[serde(default)]
    pub point_rules: Option<PointRules>,
}

/// A policy document as stored on disk.  Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub fiscal_years: Vec<FiscalYearRates>,
    #[serde(default)]
    pub countries: Vec<PensionCountryEntry>,
    #[serde(default)]
    pub visas: Vec<VisaPolicy>,
    #[serde(default)]
    pub special_visa_codes: Vec<String>,
}

/// The full set of reference data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyTables {
    pub fiscal_years: BTreeMap<String, FiscalYearRates>,
    pub countries: BTreeMap<String, PensionCountryEntry>,
    pub visas: BTreeMap<String, VisaPolicy>,
    pub pension: PensionRefundPolicy,
    pub scoring: ScoringPolicy,
}

impl PolicyTables {
    pub fn fiscal_year(&self, year: &str) -> PolicyResult<&FiscalYearRates> {
        self.fiscal_years
            .get(year.trim())
            .ok_or_else(|| PolicyError::FiscalYearNotFound(year.to_string()))
    }

    pub fn country(&self, code: &str) -> PolicyResult<&PensionCountryEntry> {
        self.countries
            .get(&normalize_code(code))
            .ok_or_else(|| PolicyError::CountryNotFound(code.to_string()))
    }

    pub fn visa(&self, code: &str) -> PolicyResult<&VisaPolicy> {
        self.visas
            .get(&normalize_code(code))
            .ok_or_else(|| PolicyError::VisaNotFound(code.to_string()))
    }

    /// Known fiscal years in ascending order.
    pub fn years(&self) -> Vec<&str> {
        self.fiscal_years.keys().map(String::as_str).collect()
    }

    /// Merges a document into the tables.
    ///
    /// Fiscal years may only be added.  Countries and visas are keyed
    /// by code, so a document entry replaces the existing entry for the
    /// same code.  A rejected document leaves the tables untouched.
    pub fn merge(&mut self, document: PolicyDocument) -> PolicyResult<()> {
        let mut incoming = BTreeSet::new();
        for rates in &document.fiscal_years {
            let year = rates.year.trim();
            if self.fiscal_years.contains_key(year) || !incoming.insert(year) {
                return Err(PolicyError::RetroactiveEdit(year.to_string()));
            }
        }

        for rates in document.fiscal_years {
            let year = rates.year.trim().to_string();
            info!(year = %year, "adding fiscal year table");
            self.fiscal_years.insert(year, rates);
        }
        for country in document.countries {
            let code = normalize_code(&country.code);
            if self.countries.insert(code.clone(), country).is_some() {
                debug!(country = %code, "replaced pension country entry");
            }
        }
        for visa in document.visas {
            let code = normalize_code(&visa.code);
            if self.visas.insert(code.clone(), visa).is_some() {
                debug!(visa = %code, "replaced visa policy");
            }
        }
        self.pension.special_visa_codes.extend(
            document
                .special_visa_codes
                .iter()
                .map(|code| normalize_code(code)),
        );
        Ok(())
    }

    /// Loads every document under `dir` on top of these tables and
    /// validates the result.
    pub fn with_documents_from_dir(mut self, dir: &Path) -> PolicyResult<Self> {
        for document in load_documents_from_dir(dir)? {
            self.merge(document)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks the structural invariants of every table.
    pub fn validate(&self) -> PolicyResult<()> {
        for (year, rates) in &self.fiscal_years {
            if *year != rates.year {
                return Err(PolicyError::InvalidTable(format!(
                    "fiscal year key '{year}' does not match table year '{}'",
                    rates.year
                )));
            }
            if rates.pension_floor > rates.pension_ceiling {
                return Err(PolicyError::InvalidTable(format!(
                    "{year}: pension floor exceeds ceiling"
                )));
            }
            check_bands(year, "income tax", &rates.income_tax_brackets)?;
            check_bands(year, "earned income", &rates.earned_income_brackets)?;
            check_bands(year, "tax credit ceiling", &rates.tax_credit.ceilings)?;
        }
        for (code, entry) in &self.countries {
            if *code != normalize_code(&entry.code) {
                return Err(PolicyError::InvalidTable(format!(
                    "country key '{code}' does not match entry '{}'",
                    entry.code
                )));
            }
        }
        for (code, visa) in &self.visas {
            if *code != normalize_code(&visa.code) || !is_valid_visa_code(code) {
                return Err(PolicyError::InvalidTable(format!(
                    "malformed visa code '{}'",
                    visa.code
                )));
            }
        }
        Ok(())
    }
}

fn check_bands<B: Band>(year: &str, table: &str, bands: &[B]) -> PolicyResult<()> {
    let Some((last, rest)) = bands.split_last() else {
        return Err(PolicyError::InvalidTable(format!(
            "{year}: {table} table is empty"
        )));
    };
    if last.upper_limit().is_some() {
        return Err(PolicyError::InvalidTable(format!(
            "{year}: last {table} bracket must be unbounded"
        )));
    }
    let mut previous = i64::MIN;
    for band in rest {
        match band.upper_limit() {
            Some(limit) if limit > previous => previous = limit,
            _ => {
                return Err(PolicyError::InvalidTable(format!(
                    "{year}: {table} brackets are not strictly ascending"
                )))
            }
        }
    }
    Ok(())
}

/// Upper-cases and trims a country or visa code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Accepts codes such as `E-7`, `E-7-4` or `F-2-7`.
pub fn is_valid_visa_code(code: &str) -> bool {
    let mut parts = code.split('-');
    let letter_ok = parts
        .next()
        .map(|p| p.len() == 1 && p.chars().all(|c| c.is_ascii_uppercase()))
        .unwrap_or(false);
    let numbers: Vec<&str> = parts.collect();
    letter_ok
        && (1..=2).contains(&numbers.len())
        && numbers
            .iter()
            .all(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Load all policy documents from a directory.
///
/// Every `.json` file is parsed as a [`PolicyDocument`].  Files are
/// visited in name order so that merging is deterministic.  A file that
/// fails to parse is logged and skipped; an unreadable directory is an
/// error.
pub fn load_documents_from_dir(path: &Path) -> PolicyResult<Vec<PolicyDocument>> {
    let mut files = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file = entry.path();
            if entry.file_type()?.is_file()
                && file.extension().map(|ext| ext == "json").unwrap_or(false)
            {
                files.push(file);
            }
        }
    } else {
        warn!(path = %path.display(), "policy directory does not exist");
    }
    files.sort();

    let mut documents = Vec::new();
    for file in files {
        let data = std::fs::read_to_string(&file)?;
        match serde_json::from_str::<PolicyDocument>(&data) {
            Ok(document) => {
                debug!(file = %file.display(), "loaded policy document");
                documents.push(document);
            }
            Err(err) => {
                warn!(file = %file.display(), error = %err, "skipping unparseable policy document");
            }
        }
    }
    Ok(documents)
}
