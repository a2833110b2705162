//! Compiled-in policy tables.
//!
//! These are the tables the service starts with.  Additional years,
//! countries and visas can be layered on top from JSON documents (see
//! [`PolicyTables::with_documents_from_dir`]).  Figures are a model of
//! the published schedules and carry no guarantee of legal accuracy.

use crate::policy::{
    CountryStatus, CreditCeiling, EarnedIncomeBracket, FiscalYearRates, PensionCountryEntry,
    PensionRefundPolicy, PointCriterion, PointRules, PolicyTables, RequiredDocuments, TaxBracket,
    TaxCreditRule, VisaCategory, VisaPolicy,
};
use crate::scoring::ScoringPolicy;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

impl PolicyTables {
    /// Builds the compiled-in tables.
    pub fn builtin() -> Self {
        let fiscal_years = [
            fiscal_year("2023", 370_000, 5_900_000, Decimal::new(1281, 4)),
            fiscal_year("2024", 390_000, 6_170_000, Decimal::new(1295, 4)),
            fiscal_year("2025", 400_000, 6_370_000, Decimal::new(1295, 4)),
        ]
        .into_iter()
        .map(|rates| (rates.year.clone(), rates))
        .collect();

        let countries = pension_countries()
            .into_iter()
            .map(|entry| (entry.code.clone(), entry))
            .collect();

        let visas = visa_catalog()
            .into_iter()
            .map(|visa| (visa.code.clone(), visa))
            .collect::<BTreeMap<_, _>>();

        PolicyTables {
            fiscal_years,
            countries,
            visas,
            pension: PensionRefundPolicy {
                contribution_rate: Decimal::new(9, 2),
                conditional_min_months: 12,
                special_visa_codes: ["E-8", "E-9", "H-2"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            scoring: ScoringPolicy::default(),
        }
    }
}

// Income tax, earned income deduction and credit schedules have been
// unchanged since the 2023 reform; only the insurance figures move.
fn fiscal_year(
    year: &str,
    pension_floor: i64,
    pension_ceiling: i64,
    long_term_care_rate: Decimal,
) -> FiscalYearRates {
    FiscalYearRates {
        year: year.to_string(),
        pension_rate: Decimal::new(9, 2),
        pension_employee_share: Decimal::new(5, 1),
        pension_floor,
        pension_ceiling,
        health_rate: Decimal::new(709, 4),
        health_employee_share: Decimal::new(5, 1),
        long_term_care_rate,
        employment_rate: Decimal::new(9, 3),
        income_tax_brackets: vec![
            tax_bracket(Some(14_000_000), 6, 0),
            tax_bracket(Some(50_000_000), 15, 1_260_000),
            tax_bracket(Some(88_000_000), 24, 5_760_000),
            tax_bracket(Some(150_000_000), 35, 15_440_000),
            tax_bracket(Some(300_000_000), 38, 19_940_000),
            tax_bracket(Some(500_000_000), 40, 25_940_000),
            tax_bracket(Some(1_000_000_000), 42, 35_940_000),
            tax_bracket(None, 45, 65_940_000),
        ],
        earned_income_brackets: vec![
            earned_bracket(Some(5_000_000), 70, 0),
            earned_bracket(Some(15_000_000), 40, 3_500_000),
            earned_bracket(Some(45_000_000), 15, 7_500_000),
            earned_bracket(Some(100_000_000), 5, 12_000_000),
            earned_bracket(None, 2, 14_750_000),
        ],
        earned_income_deduction_cap: 20_000_000,
        personal_deduction: 1_500_000,
        tax_credit: TaxCreditRule {
            threshold: 1_300_000,
            lower_rate: Decimal::new(55, 2),
            upper_rate: Decimal::new(30, 2),
            ceilings: vec![
                CreditCeiling {
                    salary_upper_limit: Some(33_000_000),
                    base: 740_000,
                    reduction_start: 0,
                    reduction_rate: Decimal::ZERO,
                    minimum: 740_000,
                },
                CreditCeiling {
                    salary_upper_limit: Some(70_000_000),
                    base: 740_000,
                    reduction_start: 33_000_000,
                    reduction_rate: Decimal::new(8, 3),
                    minimum: 660_000,
                },
                CreditCeiling {
                    salary_upper_limit: None,
                    base: 660_000,
                    reduction_start: 70_000_000,
                    reduction_rate: Decimal::new(5, 1),
                    minimum: 500_000,
                },
            ],
        },
        local_tax_rate: Decimal::new(1, 1),
    }
}

fn tax_bracket(upper_limit: Option<i64>, percent: i64, cumulative_deduction: i64) -> TaxBracket {
    TaxBracket {
        upper_limit,
        rate: Decimal::new(percent, 2),
        cumulative_deduction,
    }
}

fn earned_bracket(
    upper_limit: Option<i64>,
    percent: i64,
    base_deduction: i64,
) -> EarnedIncomeBracket {
    EarnedIncomeBracket {
        upper_limit,
        rate: Decimal::new(percent, 2),
        base_deduction,
    }
}

fn country(code: &str, name: &str, status: CountryStatus, agreement: bool) -> PensionCountryEntry {
    PensionCountryEntry {
        code: code.to_string(),
        name: name.to_string(),
        status,
        condition: None,
        agreement: Some(agreement),
    }
}

fn pension_countries() -> Vec<PensionCountryEntry> {
    use CountryStatus::*;

    let min_period = Some("At least 12 months of contributions".to_string());
    vec![
        country("AU", "Australia", Eligible, true),
        country("CA", "Canada", Eligible, true),
        country("DE", "Germany", Eligible, true),
        country("HU", "Hungary", Eligible, true),
        country("ID", "Indonesia", Eligible, false),
        country("KH", "Cambodia", Eligible, false),
        country("LK", "Sri Lanka", Eligible, false),
        country("MN", "Mongolia", Eligible, false),
        country("NP", "Nepal", Eligible, false),
        country("PH", "Philippines", Eligible, false),
        country("TH", "Thailand", Eligible, false),
        country("US", "United States", Eligible, true),
        country("UZ", "Uzbekistan", Eligible, true),
        PensionCountryEntry {
            condition: min_period.clone(),
            ..country("CN", "China", Conditional, true)
        },
        PensionCountryEntry {
            condition: min_period.clone(),
            ..country("IN", "India", Conditional, true)
        },
        PensionCountryEntry {
            condition: min_period,
            ..country("KZ", "Kazakhstan", Conditional, false)
        },
        country("BD", "Bangladesh", Ineligible, false),
        country("JP", "Japan", Ineligible, true),
        country("MM", "Myanmar", Ineligible, false),
        country("PK", "Pakistan", Ineligible, false),
        country("VN", "Vietnam", Ineligible, false),
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn visa(code: &str, name: &str, category: VisaCategory) -> VisaPolicy {
    VisaPolicy {
        code: code.to_string(),
        name: name.to_string(),
        category,
        max_stay: None,
        salary_requirement: None,
        allowed_activities: Vec::new(),
        restricted_activities: Vec::new(),
        notes: None,
        documents: None,
        point_rules: None,
    }
}

fn criterion(key: &str, label: &str, points: u32) -> PointCriterion {
    PointCriterion {
        key: key.to_string(),
        label: label.to_string(),
        points,
    }
}

fn visa_catalog() -> Vec<VisaPolicy> {
    use VisaCategory::*;

    vec![
        VisaPolicy {
            max_stay: Some("5 years".into()),
            salary_requirement: Some("At least the previous year's GNI per capita".into()),
            allowed_activities: strings(&["Work in the designated professional occupation"]),
            restricted_activities: strings(&["Simple labour", "Work for an unregistered employer"]),
            documents: Some(RequiredDocuments {
                personal: strings(&["Passport", "Degree certificate", "Career certificate"]),
                company: strings(&["Employment contract", "Business registration"]),
            }),
            ..visa("E-7-1", "Professional worker", Professional)
        },
        VisaPolicy {
            max_stay: Some("2 years, renewable".into()),
            salary_requirement: Some("Annual income of at least 26,000,000".into()),
            notes: Some("Conversion track for long-term skilled workers".into()),
            documents: Some(RequiredDocuments {
                personal: strings(&["Passport", "Alien registration card", "Income certificate"]),
                company: strings(&["Employment contract", "Recommendation letter"]),
            }),
            ..visa("E-7-4", "Skilled worker", Professional)
        },
        VisaPolicy {
            max_stay: Some("8 months".into()),
            restricted_activities: strings(&["Change of workplace"]),
            ..visa("E-8", "Seasonal worker", NonProfessional)
        },
        VisaPolicy {
            max_stay: Some("4 years 10 months".into()),
            restricted_activities: strings(&["Work outside the permitted industry"]),
            ..visa("E-9", "Non-professional employment", NonProfessional)
        },
        VisaPolicy {
            max_stay: Some("3 years".into()),
            ..visa("H-2", "Working visit", NonProfessional)
        },
        VisaPolicy {
            max_stay: Some("Length of the degree programme".into()),
            restricted_activities: strings(&["Employment without permission"]),
            ..visa("D-2", "Student", Study)
        },
        VisaPolicy {
            max_stay: Some("6 months, renewable up to 2 years".into()),
            notes: Some("Job-seeking stay for graduates and professionals".into()),
            point_rules: Some(PointRules {
                pass_score: 60,
                max_score: 190,
                criteria: vec![
                    criterion("doctorate", "Doctoral degree", 30),
                    criterion("masters", "Master's degree", 25),
                    criterion("bachelors", "Bachelor's degree", 20),
                    criterion("age_under_30", "Aged under 30", 20),
                    criterion("global_company", "Experience at a global institution", 20),
                    criterion("stem_major", "STEM major", 10),
                    criterion("korean_topik_4", "TOPIK level 4 or above", 20),
                ],
            }),
            ..visa("D-10", "Job seeker", Study)
        },
        VisaPolicy {
            max_stay: Some("1 to 3 years per grant".into()),
            notes: Some("Point-based residence".into()),
            point_rules: Some(PointRules {
                pass_score: 80,
                max_score: 120,
                criteria: vec![
                    criterion("age_30_34", "Aged 30 to 34", 23),
                    criterion("masters", "Master's degree", 25),
                    criterion("korean_level_4", "Korean level 4 or above", 15),
                    criterion("income_50m", "Annual income of 50,000,000 or more", 20),
                    criterion("kiip_complete", "Integration programme completed", 10),
                    criterion("volunteer", "Social contribution", 5),
                ],
            }),
            ..visa("F-2-7", "Point-based resident", Residence)
        },
        VisaPolicy {
            max_stay: Some("Permanent".into()),
            salary_requirement: Some(
                "Income of at least twice GNI per capita (generic track)".into(),
            ),
            ..visa("F-5", "Permanent resident", Residence)
        },
        VisaPolicy {
            max_stay: Some("3 years".into()),
            ..visa("F-6", "Marriage migrant", Family)
        },
        visa("C-3", "Short-term visitor", Visit),
    ]
}
