//! Error types for policy lookups and policy loading.
//!
//! The calculators themselves are total functions and never fail.  The
//! only failures in this crate come from resolving reference data: a
//! fiscal year, country or visa code that is not present in the loaded
//! [`PolicyTables`](crate::policy::PolicyTables), or a policy document
//! on disk that cannot be read or would break a table invariant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("fiscal year '{0}' is not present in the policy tables")]
    FiscalYearNotFound(String),

    #[error("country '{0}' is not present in the pension country list")]
    CountryNotFound(String),

    #[error("visa code '{0}' is not present in the visa catalog")]
    VisaNotFound(String),

    #[error("visa '{0}' does not define point rules")]
    NoPointRules(String),

    #[error("invalid policy table: {0}")]
    InvalidTable(String),

    #[error("fiscal year '{0}' is already defined; published years cannot be edited")]
    RetroactiveEdit(String),

    #[error("failed to read policy data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy data: {0}")]
    Json(#[from] serde_json::Error),
}

impl PolicyError {
    /// Whether the error is a lookup miss rather than a broken table.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PolicyError::FiscalYearNotFound(_)
                | PolicyError::CountryNotFound(_)
                | PolicyError::VisaNotFound(_)
        )
    }
}

pub type PolicyResult<T> = Result<T, PolicyError>;
