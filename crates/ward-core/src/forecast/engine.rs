//! Forecast engine - per-category and global cost forecasts

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{Consumable, HospitalStay, MedicalAct};
use crate::source::{RecordSnapshot, RecordSource};

use super::aggregator::TimeSeriesAggregator;
use super::period::{Granularity, Period};
use super::regression::TrendRegressor;
use super::seasonality::SeasonalityEstimator;
use super::types::{CategoryForecast, GlobalForecast, HistoryPoint, Methodology};

/// Forecastable cost categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostCategory {
    MedicalActs,
    Consumables,
    Stays,
}

impl CostCategory {
    pub const ALL: [CostCategory; 3] = [Self::MedicalActs, Self::Consumables, Self::Stays];

    /// URL / CLI slug
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MedicalActs => "medical-acts",
            Self::Consumables => "consumables",
            Self::Stays => "stays",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MedicalActs => "Medical acts",
            Self::Consumables => "Consumables",
            Self::Stays => "Stays",
        }
    }

    /// Project the category's records into dated amounts
    ///
    /// Acts use their cost, consumables their total cost, stays their
    /// revenue booked on the start date.
    pub fn events(&self, snapshot: &RecordSnapshot) -> Vec<FinancialEvent> {
        match self {
            Self::MedicalActs => project(&snapshot.medical_acts, *self),
            Self::Consumables => project(&snapshot.consumables, *self),
            Self::Stays => project(&snapshot.stays, *self),
        }
    }
}

impl std::str::FromStr for CostCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "medical-acts" | "medicalacts" | "acts" => Ok(Self::MedicalActs),
            "consumables" => Ok(Self::Consumables),
            "stays" => Ok(Self::Stays),
            _ => Err(format!(
                "Unknown category: {} (valid: medical-acts, consumables, stays)",
                s
            )),
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dated amount attributed to a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialEvent {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub category: CostCategory,
}

impl FinancialEvent {
    /// Whether the aggregator can place this event (it has a date and an amount)
    pub fn is_usable(&self) -> bool {
        self.date.is_some() && self.amount.is_some()
    }
}

/// Events the aggregator will skip, counted per category
fn unusable_counts(events: &[FinancialEvent]) -> Vec<(CostCategory, usize)> {
    CostCategory::ALL
        .into_iter()
        .map(|category| {
            let count = events
                .iter()
                .filter(|event| event.category == category && !event.is_usable())
                .count();
            (category, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Records that can be projected into a `FinancialEvent`
pub trait CostProjection {
    fn event_date(&self) -> Option<NaiveDate>;
    fn event_amount(&self) -> Option<f64>;
}

impl CostProjection for MedicalAct {
    fn event_date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn event_amount(&self) -> Option<f64> {
        self.cost
    }
}

impl CostProjection for Consumable {
    fn event_date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn event_amount(&self) -> Option<f64> {
        self.cost()
    }
}

impl CostProjection for HospitalStay {
    fn event_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    fn event_amount(&self) -> Option<f64> {
        self.revenue()
    }
}

fn project<T: CostProjection>(records: &[T], category: CostCategory) -> Vec<FinancialEvent> {
    records
        .iter()
        .map(|record| FinancialEvent {
            date: record.event_date(),
            amount: record.event_amount(),
            category,
        })
        .collect()
}

/// Sum two optional amounts; None only when both are None
fn add_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

/// Merge category histories by period key and add a per-period baseline
///
/// The baseline goes on top of the real value only where one exists, and on
/// top of the prediction everywhere. A merged period is future when no
/// category has a real value for it.
pub fn merge_histories<'a, I>(histories: I, baseline_per_period: f64) -> Vec<HistoryPoint>
where
    I: IntoIterator<Item = &'a [HistoryPoint]>,
{
    let mut merged: BTreeMap<Period, (Option<f64>, Option<f64>)> = BTreeMap::new();

    for history in histories {
        for point in history {
            let slot = merged.entry(point.period).or_insert((None, None));
            slot.0 = add_optional(slot.0, point.real);
            slot.1 = add_optional(slot.1, Some(point.predicted));
        }
    }

    merged
        .into_iter()
        .map(|(period, (real, predicted))| HistoryPoint {
            period,
            real: real.map(|value| value + baseline_per_period),
            predicted: predicted.unwrap_or(0.0) + baseline_per_period,
            is_future: real.is_none(),
        })
        .collect()
}

/// Longest forecast horizon in days (ten years)
///
/// Longer horizons are clamped to it.
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// Produces cost forecasts from a record snapshot
///
/// The engine works on an in-memory snapshot and an explicit "today", so
/// repeated calls with the same inputs give identical results.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    snapshot: RecordSnapshot,
    config: EngineConfig,
    today: NaiveDate,
}

impl ForecastEngine {
    /// Create an engine anchored on the local current date
    pub fn new(snapshot: RecordSnapshot, config: EngineConfig) -> Self {
        Self {
            snapshot,
            config,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Snapshot a record source and build an engine over it
    pub fn from_source<S: RecordSource + ?Sized>(source: &S, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(source.snapshot()?, config))
    }

    /// Anchor the engine on a specific date
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn snapshot(&self) -> &RecordSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn granularity(&self, horizon_days: u32) -> Granularity {
        Granularity::for_horizon(horizon_days, self.config.daily_max_horizon)
    }

    /// Personnel cost over the baseline period (daily cost × baseline days)
    pub fn personnel_baseline(&self) -> f64 {
        self.snapshot.daily_personnel_cost() * f64::from(self.config.personnel_baseline_days)
    }

    /// Forecast one category over `horizon_days`
    pub fn forecast_category(&self, category: CostCategory, horizon_days: u32) -> CategoryForecast {
        let forecast = self.forecast_events(&category.events(&self.snapshot), horizon_days);
        debug!(
            category = category.as_str(),
            horizon_days,
            current_total = forecast.current_total,
            predicted_total = forecast.predicted_total,
            "Category forecast computed"
        );
        forecast
    }

    /// Forecast an arbitrary list of dated amounts over `horizon_days`
    pub fn forecast_events(&self, events: &[FinancialEvent], horizon_days: u32) -> CategoryForecast {
        let horizon_days = horizon_days.min(MAX_HORIZON_DAYS);
        for (category, skipped) in unusable_counts(events) {
            debug!(
                category = category.as_str(),
                skipped, "Events without a date or amount ignored"
            );
        }

        let granularity = self.granularity(horizon_days);
        let series = TimeSeriesAggregator::new(granularity)
            .aggregate(events.iter().map(|event| (event.date, event.amount)));

        let Some(last_period) = series.last_period() else {
            return CategoryForecast::empty();
        };

        let seasonality = SeasonalityEstimator::fit(&series);
        let model = series
            .iter()
            .map(|(period, value)| (period.x() as f64, value))
            .collect::<TrendRegressor>()
            .fit();

        let estimate = |period: Period| -> f64 {
            let trend = model.predict(period.x() as f64);
            let factor = period
                .weekday()
                .map(|day| seasonality.factor(day))
                .unwrap_or(1.0);
            // f64::max also maps a NaN estimate to zero
            (trend * factor).max(0.0)
        };

        let history_start = granularity.history_start(self.today, horizon_days);
        let mut history: Vec<HistoryPoint> = series
            .iter()
            .filter(|(period, _)| period.start_date().is_some_and(|d| d >= history_start))
            .map(|(period, value)| HistoryPoint::observed(period, value, estimate(period)))
            .collect();

        let mut predicted_total = 0.0;
        let last_x = last_period.x();
        for step in 1..=i64::from(granularity.future_steps(horizon_days)) {
            let Some(period) = Period::from_x(granularity, last_x + step) else {
                break;
            };
            let predicted = estimate(period);
            predicted_total += predicted;
            history.push(HistoryPoint::future(period, predicted));
        }

        CategoryForecast {
            current_total: series.total(),
            predicted_total,
            history,
            methodology: Methodology {
                slope: model.slope,
                seasonality,
            },
        }
    }

    /// Forecast every category and combine them with the personnel baseline
    pub fn global_forecast(&self, horizon_days: u32) -> GlobalForecast {
        let horizon_days = horizon_days.min(MAX_HORIZON_DAYS);
        let granularity = self.granularity(horizon_days);
        let medical_acts = self.forecast_category(CostCategory::MedicalActs, horizon_days);
        let consumables = self.forecast_category(CostCategory::Consumables, horizon_days);
        let stays = self.forecast_category(CostCategory::Stays, horizon_days);

        let baseline = self.personnel_baseline();
        let categories = [&medical_acts, &consumables, &stays];
        let global_total =
            categories.iter().map(|c| c.current_total).sum::<f64>() + baseline;
        let global_prediction =
            categories.iter().map(|c| c.predicted_total).sum::<f64>() + baseline;

        let per_period =
            self.snapshot.daily_personnel_cost() * f64::from(granularity.period_days());
        let global_history = merge_histories(
            categories.iter().map(|c| c.history.as_slice()),
            per_period,
        );

        debug!(
            horizon_days,
            granularity = granularity.as_str(),
            global_total,
            global_prediction,
            points = global_history.len(),
            "Global forecast computed"
        );

        GlobalForecast {
            global_total,
            global_prediction,
            global_history,
            medical_acts,
            consumables,
            stays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn act(id: i64, day: Option<NaiveDate>, cost: Option<f64>) -> MedicalAct {
        MedicalAct {
            id,
            patient_id: None,
            act_type: "Consultation".to_string(),
            date: day,
            practitioner: None,
            cost,
        }
    }

    fn engine(snapshot: RecordSnapshot, today: NaiveDate) -> ForecastEngine {
        ForecastEngine::new(snapshot, EngineConfig::default()).as_of(today)
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "medical-acts".parse::<CostCategory>(),
            Ok(CostCategory::MedicalActs)
        );
        assert_eq!(
            "medical_acts".parse::<CostCategory>(),
            Ok(CostCategory::MedicalActs)
        );
        assert_eq!("Stays".parse::<CostCategory>(), Ok(CostCategory::Stays));
        assert!("personnel".parse::<CostCategory>().is_err());
    }

    #[test]
    fn test_stay_events_book_revenue_on_start_date() {
        let snapshot = RecordSnapshot {
            stays: vec![HospitalStay {
                id: 1,
                patient_id: None,
                patient_name: None,
                start_date: Some(date(2025, 3, 10)),
                end_date: Some(date(2025, 3, 13)),
                daily_rate: Some(200.0),
                pathology: None,
            }],
            ..Default::default()
        };
        let events = CostCategory::Stays.events(&snapshot);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, Some(date(2025, 3, 10)));
        assert_eq!(events[0].amount, Some(600.0));
        assert_eq!(events[0].category, CostCategory::Stays);
    }

    #[test]
    fn test_unusable_events_counted_per_category() {
        let event = |category, date, amount| FinancialEvent {
            date,
            amount,
            category,
        };
        let day = Some(date(2025, 3, 10));
        let events = [
            event(CostCategory::MedicalActs, day, Some(10.0)),
            event(CostCategory::MedicalActs, None, Some(10.0)),
            event(CostCategory::Stays, day, None),
            event(CostCategory::Stays, None, None),
            event(CostCategory::Consumables, day, Some(5.0)),
        ];
        assert!(events[0].is_usable());
        assert_eq!(
            unusable_counts(&events),
            vec![(CostCategory::MedicalActs, 1), (CostCategory::Stays, 2)]
        );
    }

    #[test]
    fn test_empty_category_forecast() {
        let forecast = engine(RecordSnapshot::default(), date(2025, 6, 1))
            .forecast_category(CostCategory::MedicalActs, 30);
        assert_eq!(forecast, CategoryForecast::empty());
    }

    #[test]
    fn test_horizon_is_clamped() {
        let today = date(2025, 6, 30);
        let snapshot = RecordSnapshot {
            medical_acts: vec![act(1, Some(today), Some(100.0))],
            ..Default::default()
        };
        let engine = engine(snapshot, today);

        let capped = engine.forecast_category(CostCategory::MedicalActs, MAX_HORIZON_DAYS);
        let oversized = engine.forecast_category(CostCategory::MedicalActs, u32::MAX);
        assert_eq!(oversized, capped);
        assert_eq!(oversized.future_points().count(), 122);
    }

    #[test]
    fn test_flat_series_projects_flat() {
        let today = date(2025, 6, 30);
        let acts = (0..14)
            .map(|i| act(i, Some(today - Duration::days(i)), Some(100.0)))
            .collect();
        let forecast = engine(
            RecordSnapshot {
                medical_acts: acts,
                ..Default::default()
            },
            today,
        )
        .forecast_category(CostCategory::MedicalActs, 7);

        assert_eq!(forecast.current_total, 1400.0);
        assert!(forecast.methodology.slope.abs() < 1e-9);
        assert_eq!(forecast.future_points().count(), 7);
        assert!((forecast.predicted_total - 700.0).abs() < 1e-6);
        // Only the last 7 days are kept as back-tested history
        assert_eq!(forecast.history.iter().filter(|p| !p.is_future).count(), 8);
    }

    #[test]
    fn test_future_starts_after_last_data_point() {
        let today = date(2025, 6, 30);
        let last = date(2025, 6, 20);
        let acts = vec![
            act(1, Some(last - Duration::days(1)), Some(10.0)),
            act(2, Some(last), Some(20.0)),
        ];
        let forecast = engine(
            RecordSnapshot {
                medical_acts: acts,
                ..Default::default()
            },
            today,
        )
        .forecast_category(CostCategory::MedicalActs, 3);

        let future: Vec<_> = forecast.future_points().map(|p| p.period).collect();
        assert_eq!(
            future,
            vec![
                Period::Day(date(2025, 6, 21)),
                Period::Day(date(2025, 6, 22)),
                Period::Day(date(2025, 6, 23)),
            ]
        );
    }

    #[test]
    fn test_decreasing_trend_never_goes_negative() {
        let today = date(2025, 6, 30);
        let acts = (0..5)
            .map(|i| {
                let day = today - Duration::days(4 - i);
                act(i, Some(day), Some(500.0 - 120.0 * i as f64))
            })
            .collect();
        let forecast = engine(
            RecordSnapshot {
                medical_acts: acts,
                ..Default::default()
            },
            today,
        )
        .forecast_category(CostCategory::MedicalActs, 30);

        assert!(forecast.methodology.slope < 0.0);
        assert!(forecast.history.iter().all(|p| p.predicted >= 0.0));
        assert!(forecast.predicted_total >= 0.0);
    }

    #[test]
    fn test_merge_histories_adds_baseline() {
        let day = Period::Day(date(2025, 1, 1));
        let next = Period::Day(date(2025, 1, 2));
        let a = vec![HistoryPoint::observed(day, 100.0, 90.0), HistoryPoint::future(next, 80.0)];
        let b = vec![HistoryPoint::observed(day, 50.0, 40.0)];

        let merged = merge_histories([a.as_slice(), b.as_slice()], 10.0);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].real, Some(160.0));
        assert_eq!(merged[0].predicted, 140.0);
        assert!(!merged[0].is_future);
        assert_eq!(merged[1].real, None);
        assert_eq!(merged[1].predicted, 90.0);
        assert!(merged[1].is_future);
    }

    #[test]
    fn test_global_forecast_adds_personnel_baseline() {
        let snapshot = RecordSnapshot {
            personnel: vec![crate::models::Personnel {
                id: 1,
                name: "Nurse".to_string(),
                role: None,
                service: None,
                cost_per_day: Some(200.0),
                email: None,
                phone: None,
            }],
            ..Default::default()
        };
        let global = engine(snapshot, date(2025, 6, 1)).global_forecast(30);
        assert_eq!(global.global_total, 6000.0);
        assert_eq!(global.global_prediction, 6000.0);
        assert!(global.global_history.is_empty());
    }
}
