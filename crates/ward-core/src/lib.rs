//! Ward Core Library
//!
//! Shared functionality for the Ward hospital cost forecasting tool:
//! - Encrypted database access and migrations
//! - Record sources and in-memory snapshots
//! - CSV import of acts, consumables, stays and personnel
//! - Cost forecasting (aggregation, seasonality, trend regression)
//! - Dashboard KPIs and smart alert

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod source;

/// Fixture builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::EngineConfig;
pub use dashboard::{
    AlertLevel, CategoryCost, CostBreakdown, CostDriver, DashboardAggregator, DashboardSummary,
    Direction, RecentStay, SmartAlert, Window,
};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{
    CategoryForecast, CostCategory, FinancialEvent, ForecastEngine, GlobalForecast, Granularity,
    HistoryPoint, Period, MAX_HORIZON_DAYS,
};
pub use import::{parse_records, ParsedRecords};
pub use source::{RecordSnapshot, RecordSource};
