//! Period keys and granularity
//!
//! A `Period` is either a calendar day or a calendar month. Periods order
//! chronologically and render as `YYYY-MM-DD` / `YYYY-MM`, so the string form
//! sorts the same way. Each period also maps to a numeric x used by the
//! trend regression: days since 1970-01-01 for days, `year * 12 + month` for
//! months.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Aggregation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
}

impl Granularity {
    /// Daily for horizons up to `daily_max` days, monthly beyond
    pub fn for_horizon(horizon_days: u32, daily_max: u32) -> Self {
        if horizon_days <= daily_max {
            Self::Daily
        } else {
            Self::Monthly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    /// Number of future periods projected for a horizon
    pub fn future_steps(&self, horizon_days: u32) -> u32 {
        match self {
            Self::Daily => horizon_days,
            Self::Monthly => horizon_days.div_ceil(30),
        }
    }

    /// Nominal length of one period in days
    pub fn period_days(&self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::Monthly => 30,
        }
    }

    /// Earliest date kept in back-tested history for a horizon
    pub fn history_start(&self, today: NaiveDate, horizon_days: u32) -> NaiveDate {
        match self {
            Self::Daily => today
                .checked_sub_signed(Duration::days(i64::from(horizon_days)))
                .unwrap_or(NaiveDate::MIN),
            Self::Monthly => today
                .checked_sub_months(Months::new(horizon_days / 30))
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown granularity: {} (valid: daily, monthly)", s)),
        }
    }
}

/// Days between 1970-01-01 and `date`
pub fn epoch_day(date: NaiveDate) -> i64 {
    // NaiveDate's default is the Unix epoch
    (date - NaiveDate::default()).num_days()
}

/// A chronologically ordered period key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl Period {
    /// The period containing `date` at the given granularity
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => Self::Day(date),
            Granularity::Monthly => Self::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Day(_) => Granularity::Daily,
            Self::Month { .. } => Granularity::Monthly,
        }
    }

    /// Numeric time coordinate for regression
    pub fn x(&self) -> i64 {
        match self {
            Self::Day(date) => epoch_day(*date),
            Self::Month { year, month } => i64::from(*year) * 12 + i64::from(*month),
        }
    }

    /// Inverse of `x()`; None when the coordinate falls outside chrono's range
    pub fn from_x(granularity: Granularity, x: i64) -> Option<Self> {
        match granularity {
            Granularity::Daily => NaiveDate::default()
                .checked_add_signed(Duration::days(x))
                .map(Self::Day),
            Granularity::Monthly => {
                // x = year * 12 + month with month in 1..=12
                let index = x - 1;
                let year = i32::try_from(index.div_euclid(12)).ok()?;
                let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
                Some(Self::Month { year, month })
            }
        }
    }

    /// First calendar day of the period
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Day(date) => Some(*date),
            Self::Month { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1),
        }
    }

    /// Weekday of a daily period; monthly periods have none
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            Self::Day(date) => Some(date.weekday()),
            Self::Month { .. } => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::Day(date));
        }
        // Months are parsed through their first day to reuse chrono's validation
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(|date| Self::of(date, Granularity::Monthly))
            .map_err(|_| format!("Invalid period: {} (use YYYY-MM-DD or YYYY-MM)", s))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
