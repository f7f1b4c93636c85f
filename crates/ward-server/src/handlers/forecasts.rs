//! Forecast handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{AppError, AppState};
use ward_core::forecast::{
    CategoryForecast, CostCategory, ForecastEngine, GlobalForecast, MAX_HORIZON_DAYS,
};

/// Query parameters shared by forecast and dashboard endpoints
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Horizon in days (defaults to the configured horizon)
    pub days: Option<String>,
    /// Anchor date (YYYY-MM-DD) used as "today"
    pub as_of: Option<String>,
}

/// Parse the `days` parameter, rejecting negative and non-numeric values
pub(crate) fn parse_days(raw: Option<&str>, default: u32) -> Result<u32, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    let days: i64 = raw
        .parse()
        .map_err(|_| AppError::bad_request("Invalid days parameter (use a whole number)"))?;
    if days < 0 {
        return Err(AppError::bad_request("days must not be negative"));
    }
    if days > i64::from(MAX_HORIZON_DAYS) {
        return Err(AppError::bad_request(&format!(
            "days must not exceed {}",
            MAX_HORIZON_DAYS
        )));
    }
    Ok(days as u32)
}

/// Parse the optional `as_of` anchor date
pub(crate) fn parse_as_of(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request("Invalid as_of date format (use YYYY-MM-DD)"))
}

/// Snapshot the database into a fresh engine
pub(crate) fn build_engine(
    state: &AppState,
    as_of: Option<NaiveDate>,
) -> Result<ForecastEngine, AppError> {
    let engine = ForecastEngine::from_source(&state.db, state.engine_config.clone())?;
    Ok(match as_of {
        Some(today) => engine.as_of(today),
        None => engine,
    })
}

/// GET /api/forecasts - Global forecast across all categories
pub async fn get_global_forecast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<GlobalForecast>, AppError> {
    let days = parse_days(
        params.days.as_deref(),
        state.engine_config.default_horizon_days,
    )?;
    let as_of = parse_as_of(params.as_of.as_deref())?;

    let engine = build_engine(&state, as_of)?;
    Ok(Json(engine.global_forecast(days)))
}

/// GET /api/forecasts/:category - Forecast for one cost category
pub async fn get_category_forecast(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<CategoryForecast>, AppError> {
    let category: CostCategory = category
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;
    let days = parse_days(
        params.days.as_deref(),
        state.engine_config.default_horizon_days,
    )?;
    let as_of = parse_as_of(params.as_of.as_deref())?;

    let engine = build_engine(&state, as_of)?;
    Ok(Json(engine.forecast_category(category, days)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days(None, 30).ok(), Some(30));
        assert_eq!(parse_days(Some(""), 30).ok(), Some(30));
        assert_eq!(parse_days(Some("90"), 30).ok(), Some(90));
        assert_eq!(parse_days(Some("0"), 30).ok(), Some(0));
        assert!(parse_days(Some("-5"), 30).is_err());
        assert!(parse_days(Some("ten"), 30).is_err());
        assert!(parse_days(Some("99999"), 30).is_err());
    }

    #[test]
    fn test_parse_as_of() {
        assert_eq!(parse_as_of(None).ok(), Some(None));
        assert_eq!(
            parse_as_of(Some("2025-06-30")).ok(),
            Some(NaiveDate::from_ymd_opt(2025, 6, 30))
        );
        assert!(parse_as_of(Some("30/06/2025")).is_err());
    }
}
