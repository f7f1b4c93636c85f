//! Dashboard KPIs over two adjacent rolling windows
//!
//! The current window covers the last `window_days` days up to today, the
//! previous window the same length just before it. Every KPI is computed for
//! both windows and reported with a trend. The smart alert names the cost
//! driver that moved the most between the two windows.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forecast::ForecastEngine;

/// Percentage change from `previous` to `current`
///
/// Returns 100.0 when `previous` is zero: any cost appearing from a zero
/// baseline counts as a full increase.
pub fn trend(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 100.0;
    }
    (current - previous) / previous * 100.0
}

/// Round to two decimals (cents)
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `today - days`, clamped to the earliest representable date
fn days_before(today: NaiveDate, days: i64) -> NaiveDate {
    today
        .checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

impl Window {
    /// `[today - days, today]`
    pub fn current(today: NaiveDate, days: u32) -> Self {
        Self {
            start: days_before(today, i64::from(days)),
            end: today,
        }
    }

    /// `[today - 2 * days, today - days - 1]`
    pub fn previous(today: NaiveDate, days: u32) -> Self {
        let days = i64::from(days);
        Self {
            start: days_before(today, 2 * days),
            end: days_before(today, days + 1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Cost drivers compared by the smart alert, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostDriver {
    MedicalActs,
    Consumables,
    Stays,
    Personnel,
}

impl CostDriver {
    pub const ALL: [CostDriver; 4] = [
        Self::MedicalActs,
        Self::Consumables,
        Self::Stays,
        Self::Personnel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MedicalActs => "Medical acts",
            Self::Consumables => "Consumables",
            Self::Stays => "Stays",
            Self::Personnel => "Personnel",
        }
    }
}

/// Cost per driver over a window (or all time)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub medical_acts: f64,
    pub consumables: f64,
    pub stays: f64,
    pub personnel: f64,
}

impl CostBreakdown {
    pub fn get(&self, driver: CostDriver) -> f64 {
        match driver {
            CostDriver::MedicalActs => self.medical_acts,
            CostDriver::Consumables => self.consumables,
            CostDriver::Stays => self.stays,
            CostDriver::Personnel => self.personnel,
        }
    }

    pub fn total(&self) -> f64 {
        self.medical_acts + self.consumables + self.stays + self.personnel
    }

    /// Driver amounts in tie-break order
    pub fn entries(&self) -> [(CostDriver, f64); 4] {
        CostDriver::ALL.map(|driver| (driver, self.get(driver)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

impl Direction {
    fn between(current: f64, previous: f64) -> Self {
        if current > previous {
            Self::Increased
        } else if current < previous {
            Self::Decreased
        } else {
            Self::Unchanged
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
            Self::Unchanged => "remained unchanged",
        }
    }
}

/// Rule-derived description of the dominant cost movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartAlert {
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub driver: String,
    pub direction: Direction,
}

/// One slice of the all-time cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentStay {
    pub patient_name: String,
    pub department: String,
    pub status: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_real_cost: f64,
    pub total_real_cost_trend: f64,
    pub total_predicted_cost: f64,
    pub total_predicted_cost_trend: f64,
    pub avg_cost_per_stay: f64,
    pub avg_cost_per_stay_trend: f64,
    pub personnel_cost_ratio: f64,
    pub personnel_cost_ratio_trend: f64,
    pub cost_by_category: Vec<CategoryCost>,
    pub recent_stays: Vec<RecentStay>,
    pub smart_alert: SmartAlert,
}

/// Computes dashboard KPIs from a forecast engine's snapshot
pub struct DashboardAggregator<'a> {
    engine: &'a ForecastEngine,
}

impl<'a> DashboardAggregator<'a> {
    pub fn new(engine: &'a ForecastEngine) -> Self {
        Self { engine }
    }

    pub fn current_window(&self) -> Window {
        Window::current(self.engine.today(), self.engine.config().window_days)
    }

    pub fn previous_window(&self) -> Window {
        Window::previous(self.engine.today(), self.engine.config().window_days)
    }

    /// Cost per driver, restricted to `window` when given
    ///
    /// Acts and consumables count when their date is in the window, stays
    /// when both dates are. Without a window every dated record counts.
    /// Personnel is always the flat baseline.
    pub fn breakdown(&self, window: Option<Window>) -> CostBreakdown {
        let snapshot = self.engine.snapshot();
        let in_window = |date: Option<NaiveDate>| match (date, window) {
            (Some(date), Some(window)) => window.contains(date),
            (Some(_), None) => true,
            (None, _) => false,
        };

        let medical_acts = snapshot
            .medical_acts
            .iter()
            .filter(|act| in_window(act.date))
            .filter_map(|act| act.cost)
            .sum();
        let consumables = snapshot
            .consumables
            .iter()
            .filter(|c| in_window(c.date))
            .filter_map(|c| c.cost())
            .sum();
        let stays = snapshot
            .stays
            .iter()
            .filter(|stay| match window {
                Some(window) => stay.within(window.start, window.end),
                None => stay.start_date.is_some() && stay.end_date.is_some(),
            })
            .filter_map(|stay| stay.revenue())
            .sum();

        CostBreakdown {
            medical_acts,
            consumables,
            stays,
            personnel: self.engine.personnel_baseline(),
        }
    }

    /// Total real cost within a window, personnel baseline included
    pub fn real_cost(&self, window: Window) -> f64 {
        self.breakdown(Some(window)).total()
    }

    /// Average revenue of the stays overlapping a window, 0 when none
    pub fn avg_cost_per_stay(&self, window: Window) -> f64 {
        let overlapping: Vec<f64> = self
            .engine
            .snapshot()
            .stays
            .iter()
            .filter(|stay| stay.overlaps(window.start, window.end))
            .map(|stay| stay.revenue().unwrap_or(0.0))
            .collect();

        if overlapping.is_empty() {
            return 0.0;
        }
        round_cents(overlapping.iter().sum::<f64>() / overlapping.len() as f64)
    }

    /// Share of personnel in the real cost of a window, in percent
    pub fn personnel_ratio(&self, window: Window) -> f64 {
        let real = self.real_cost(window);
        if real == 0.0 {
            return 0.0;
        }
        self.engine.personnel_baseline() / real * 100.0
    }

    /// Describe the driver with the largest absolute move between windows
    ///
    /// Drivers are scanned in a fixed order and only a strictly larger move
    /// replaces the current pick, so ties go to the earliest driver. When
    /// nothing moved the driver is "General".
    pub fn smart_alert(&self, current: &CostBreakdown, previous: &CostBreakdown) -> SmartAlert {
        let mut dominant: Option<(CostDriver, f64, f64)> = None;
        let mut max_delta = 0.0;
        for ((driver, now), (_, before)) in current.entries().into_iter().zip(previous.entries()) {
            let delta = (now - before).abs();
            if delta > max_delta {
                max_delta = delta;
                dominant = Some((driver, now, before));
            }
        }

        let real_trend = trend(current.total(), previous.total());
        let threshold = self.engine.config().alert_threshold_pct;

        let (driver, direction) = match dominant {
            Some((driver, now, before)) => (driver.label(), Direction::between(now, before)),
            None => ("General", Direction::Unchanged),
        };

        let (level, title, message) = if real_trend > threshold {
            (
                AlertLevel::Warning,
                "Cost increase alert",
                format!(
                    "Costs are up {:.1}% on the previous period. Main driver: '{}', which {}.",
                    real_trend,
                    driver,
                    direction.verb()
                ),
            )
        } else if real_trend < -threshold {
            (
                AlertLevel::Success,
                "Cost reduction detected",
                format!(
                    "Costs are down {:.1}% on the previous period. Main driver: '{}', which {}.",
                    real_trend.abs(),
                    driver,
                    direction.verb()
                ),
            )
        } else if dominant.is_none() {
            (
                AlertLevel::Info,
                "Stable costs",
                "Costs are stable. No significant change in any expense category.".to_string(),
            )
        } else {
            (
                AlertLevel::Info,
                "Stable costs",
                format!(
                    "Costs are stable ({:+.1}%). Largest movement: '{}', which {}.",
                    real_trend,
                    driver,
                    direction.verb()
                ),
            )
        };

        SmartAlert {
            level,
            title: title.to_string(),
            message,
            driver: driver.to_string(),
            direction,
        }
    }

    /// Most recent complete stays, newest start date first
    pub fn recent_stays(&self) -> Vec<RecentStay> {
        let today = self.engine.today();
        let mut stays: Vec<_> = self
            .engine
            .snapshot()
            .stays
            .iter()
            .filter(|stay| {
                stay.start_date.is_some() && stay.end_date.is_some() && stay.patient_id.is_some()
            })
            .collect();
        stays.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));

        stays
            .into_iter()
            .take(self.engine.config().recent_stays_limit)
            .map(|stay| RecentStay {
                patient_name: stay
                    .patient_name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                department: stay
                    .pathology
                    .clone()
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
                status: if stay.end_date.is_some_and(|end| end > today) {
                    "In progress".to_string()
                } else {
                    "Completed".to_string()
                },
                cost: stay.revenue().unwrap_or(0.0),
            })
            .collect()
    }

    /// Compute the full dashboard payload
    pub fn summary(&self) -> DashboardSummary {
        let current = self.current_window();
        let previous = self.previous_window();

        let current_breakdown = self.breakdown(Some(current));
        let previous_breakdown = self.breakdown(Some(previous));
        let real_current = current_breakdown.total();
        let real_previous = previous_breakdown.total();

        let horizon = self.engine.config().window_days;
        let predicted = round_cents(self.engine.global_forecast(horizon).global_prediction);

        let avg_current = self.avg_cost_per_stay(current);
        let avg_previous = self.avg_cost_per_stay(previous);
        let ratio_current = self.personnel_ratio(current);
        let ratio_previous = self.personnel_ratio(previous);

        let cost_by_category = self
            .breakdown(None)
            .entries()
            .into_iter()
            .map(|(driver, value)| CategoryCost {
                name: driver.label().to_string(),
                value,
            })
            .collect();

        let smart_alert = self.smart_alert(&current_breakdown, &previous_breakdown);

        debug!(
            real_current,
            real_previous,
            predicted,
            alert = ?smart_alert.level,
            driver = %smart_alert.driver,
            "Dashboard summary computed"
        );

        DashboardSummary {
            total_real_cost: real_current,
            total_real_cost_trend: trend(real_current, real_previous),
            total_predicted_cost: predicted,
            total_predicted_cost_trend: trend(predicted, real_current),
            avg_cost_per_stay: avg_current,
            avg_cost_per_stay_trend: trend(avg_current, avg_previous),
            personnel_cost_ratio: ratio_current,
            personnel_cost_ratio_trend: ratio_current - ratio_previous,
            cost_by_category,
            recent_stays: self.recent_stays(),
            smart_alert,
        }
    }
}
