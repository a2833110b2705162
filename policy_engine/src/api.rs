//! HTTP API for the policy engine.
//!
//! This module exposes the calculators using the
//! [`axum`](https://crates.io/crates/axum) framework.  Clients submit a
//! batch of calculation requests and receive the outcomes in JSON; the
//! policy tables the calculators read can be browsed as well.  The
//! tables are loaded once at startup and shared read-only between
//! requests.

use crate::config::AppConfig;
use crate::engine::run_batch;
use crate::error::PolicyError;
use crate::models::{BatchInput, BatchResult};
use crate::policy::{PensionCountryEntry, PolicyTables, VisaPolicy};
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Application state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<PolicyTables>,
}

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    Policy(PolicyError),
    Internal(anyhow::Error),
}

impl From<PolicyError> for ApiError {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Policy(err) if err.is_not_found() => (StatusCode::NOT_FOUND, err.to_string()),
            ApiError::Policy(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            ApiError::Internal(err) => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Builds the compiled-in tables and layers any documents found in
/// `policy_dir` on top.
pub fn load_tables(config: &AppConfig) -> Result<PolicyTables> {
    let tables = PolicyTables::builtin();
    let tables = match &config.policy_dir {
        Some(dir) => tables
            .with_documents_from_dir(dir)
            .with_context(|| format!("loading policy documents from {}", dir.display()))?,
        None => {
            tables.validate()?;
            tables
        }
    };
    info!(years = ?tables.years(), visas = tables.visas.len(), "policy tables loaded");
    Ok(tables)
}

pub fn build_router(tables: Arc<PolicyTables>) -> Router {
    Router::new()
        .route("/api/calculate", post(calculate_handler))
        .route("/api/policy/years", get(years_handler))
        .route("/api/policy/visas/:code", get(visa_handler))
        .route("/api/policy/countries/:code", get(country_handler))
        .with_state(AppState { tables })
}

/// Handler for POST /api/calculate
async fn calculate_handler(
    State(state): State<AppState>,
    Json(input): Json<BatchInput>,
) -> Result<Json<BatchResult>, ApiError> {
    // Batches are CPU bound; keep them off the async workers.
    let tables = state.tables.clone();
    let result = tokio::task::spawn_blocking(move || run_batch(input, &tables))
        .await
        .context("batch worker panicked")?;
    Ok(Json(result))
}

async fn years_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.tables.years().into_iter().map(String::from).collect())
}

async fn visa_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<VisaPolicy>, ApiError> {
    Ok(Json(state.tables.visa(&code)?.clone()))
}

async fn country_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PensionCountryEntry>, ApiError> {
    Ok(Json(state.tables.country(&code)?.clone()))
}

/// Launch the API server.  Loads the policy tables, binds to the
/// configured address and blocks until the server terminates.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let tables = Arc::new(load_tables(config)?);
    let router = build_router(tables);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
