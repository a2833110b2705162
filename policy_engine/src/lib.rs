//! Policy Engine library crate.
//!
//! This crate implements the calculators behind an immigration helper
//! application: monthly net pay after statutory deductions
//! ([`payroll`]), pension lump-sum refund eligibility and amount
//! ([`pension`]) and the visa point scoring tracks ([`scoring`]).  All
//! of them read versioned, immutable [`policy`] tables and are pure
//! functions of their input.  Applications may call the calculators
//! directly, dispatch requests through [`engine::run_batch`] or embed
//! the HTTP API via [`api::build_router`].

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod money;
pub mod payroll;
pub mod pension;
pub mod policy;
pub mod scoring;
pub mod tables;
pub mod telemetry;

pub use error::{PolicyError, PolicyResult};
pub use policy::PolicyTables;
