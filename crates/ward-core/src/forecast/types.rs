//! Forecast results, serialized in the dashboard's camelCase JSON shape

use serde::Serialize;

use super::period::Period;
use super::seasonality::SeasonalityIndex;

fn is_false(value: &bool) -> bool {
    !*value
}

/// One point of a forecast history
///
/// Observed periods carry both the real total and the back-tested model
/// value; future periods carry only the prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real: Option<f64>,
    pub predicted: f64,
    #[serde(skip_serializing_if = "is_false")]
    pub is_future: bool,
}

impl HistoryPoint {
    pub fn observed(period: Period, real: f64, predicted: f64) -> Self {
        Self {
            period,
            real: Some(real),
            predicted,
            is_future: false,
        }
    }

    pub fn future(period: Period, predicted: f64) -> Self {
        Self {
            period,
            real: None,
            predicted,
            is_future: true,
        }
    }
}

/// Model parameters behind a category forecast
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Methodology {
    pub slope: f64,
    pub seasonality: SeasonalityIndex,
}

/// Forecast for one cost category
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForecast {
    /// Sum of every dated, valued record, all time
    pub current_total: f64,
    /// Sum of future predictions
    pub predicted_total: f64,
    pub history: Vec<HistoryPoint>,
    pub methodology: Methodology,
}

impl CategoryForecast {
    /// Forecast for a category with no usable records
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn future_points(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.history.iter().filter(|point| point.is_future)
    }
}

/// Combined forecast across categories plus the personnel baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalForecast {
    pub global_total: f64,
    pub global_prediction: f64,
    pub global_history: Vec<HistoryPoint>,
    pub medical_acts: CategoryForecast,
    pub consumables: CategoryForecast,
    pub stays: CategoryForecast,
}
