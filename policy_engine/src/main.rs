//! Entry point for the Policy Engine binary.
//!
//! Running this binary starts an HTTP server exposing the calculators.
//! Configuration comes from the environment; see [`policy_engine::config`]
//! for the variables that are read.

use anyhow::Result;
use policy_engine::config::AppConfig;
use policy_engine::{api, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    telemetry::init(&config.log_level)?;
    api::serve(&config).await
}
