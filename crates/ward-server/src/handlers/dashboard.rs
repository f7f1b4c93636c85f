//! Dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::forecasts::{build_engine, parse_as_of};
use crate::{AppError, AppState};
use ward_core::{DashboardAggregator, DashboardSummary};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Anchor date (YYYY-MM-DD) used as "today"
    pub as_of: Option<String>,
}

/// GET /api/dashboard/summary - KPIs, cost breakdown, recent stays and smart alert
pub async fn get_dashboard_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let as_of = parse_as_of(params.as_of.as_deref())?;
    let engine = build_engine(&state, as_of)?;

    Ok(Json(DashboardAggregator::new(&engine).summary()))
}
