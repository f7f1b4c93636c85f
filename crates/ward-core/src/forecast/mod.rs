//! Cost forecasting
//!
//! Each cost category (medical acts, consumables, stays) is forecast
//! independently:
//!
//! 1. **Aggregate** - dated amounts are summed per day, or per month for
//!    horizons beyond the daily limit
//! 2. **Seasonality** - a day-of-week factor is estimated from the daily totals
//! 3. **Trend** - a least-squares line is fitted over the period totals
//! 4. **Project** - trend × seasonality, floored at zero, for each future period
//!
//! The global forecast merges the category histories and adds the personnel
//! baseline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ward_core::forecast::{CostCategory, ForecastEngine};
//!
//! let engine = ForecastEngine::from_source(&db, EngineConfig::default())?;
//! let global = engine.global_forecast(30);
//! let stays = engine.forecast_category(CostCategory::Stays, 90);
//! ```

pub mod aggregator;
pub mod engine;
pub mod period;
pub mod regression;
pub mod seasonality;
pub mod types;

pub use aggregator::{GroupedSeries, TimeSeriesAggregator};
pub use engine::{
    merge_histories, CostCategory, CostProjection, FinancialEvent, ForecastEngine, MAX_HORIZON_DAYS,
};
pub use period::{epoch_day, Granularity, Period};
pub use regression::{RegressionModel, TrendRegressor};
pub use seasonality::{SeasonalityEstimator, SeasonalityIndex};
pub use types::{CategoryForecast, GlobalForecast, HistoryPoint, Methodology};
