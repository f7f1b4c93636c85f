//! Day-of-week seasonality
//!
//! Each weekday gets a multiplicative factor: the mean of the daily totals
//! that fall on that weekday divided by the mean of all daily totals. A
//! weekday without data keeps a neutral factor of 1.0. Monthly series carry no
//! weekday signal, so their index is empty and every factor reads as 1.0.

use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::aggregator::GroupedSeries;
use super::period::Granularity;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Multiplicative factor per weekday
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalityIndex {
    factors: Option<[f64; 7]>,
}

impl SeasonalityIndex {
    /// An index that leaves every value unchanged
    pub fn neutral() -> Self {
        Self { factors: None }
    }

    pub fn is_neutral(&self) -> bool {
        self.factors.is_none()
    }

    pub fn factor(&self, day: Weekday) -> f64 {
        self.factors
            .map(|factors| factors[day.num_days_from_monday() as usize])
            .unwrap_or(1.0)
    }

    /// Weekday factors from Monday to Sunday; empty for a neutral index
    pub fn factors(&self) -> Vec<(Weekday, f64)> {
        match self.factors {
            Some(factors) => WEEKDAYS.iter().copied().zip(factors).collect(),
            None => Vec::new(),
        }
    }
}

impl Default for SeasonalityIndex {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Serialize for SeasonalityIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let factors = self.factors();
        let mut map = serializer.serialize_map(Some(factors.len()))?;
        for (day, factor) in factors {
            map.serialize_entry(weekday_name(day), &factor)?;
        }
        map.end()
    }
}

pub struct SeasonalityEstimator;

impl SeasonalityEstimator {
    /// Estimate weekday factors from a daily series
    ///
    /// Returns a neutral index for monthly series, empty series, or series
    /// whose mean is zero.
    pub fn fit(series: &GroupedSeries) -> SeasonalityIndex {
        if series.granularity() != Granularity::Daily {
            return SeasonalityIndex::neutral();
        }
        let Some(global_mean) = series.mean() else {
            return SeasonalityIndex::neutral();
        };
        if global_mean == 0.0 {
            return SeasonalityIndex::neutral();
        }

        let mut sums = [0.0_f64; 7];
        let mut counts = [0_u32; 7];
        for (period, value) in series.iter() {
            if let Some(day) = period.weekday() {
                let slot = day.num_days_from_monday() as usize;
                sums[slot] += value;
                counts[slot] += 1;
            }
        }

        let mut factors = [1.0_f64; 7];
        for slot in 0..7 {
            if counts[slot] > 0 {
                factors[slot] = (sums[slot] / f64::from(counts[slot])) / global_mean;
            }
        }

        SeasonalityIndex {
            factors: Some(factors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::aggregator::TimeSeriesAggregator;
    use chrono::{Datelike, Duration, NaiveDate};

    fn monday() -> NaiveDate {
        // 2025-01-06 is a Monday
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[test]
    fn test_weekday_pattern() {
        // Four weeks: weekdays cost 100, weekends cost 30
        let entries: Vec<_> = (0..28)
            .map(|i| {
                let day = monday() + Duration::days(i);
                let amount = if day.weekday().num_days_from_monday() >= 5 {
                    30.0
                } else {
                    100.0
                };
                (Some(day), Some(amount))
            })
            .collect();
        let series = TimeSeriesAggregator::new(Granularity::Daily).aggregate(entries);
        let index = SeasonalityEstimator::fit(&series);

        let mean = (5.0 * 100.0 + 2.0 * 30.0) / 7.0;
        assert!((index.factor(Weekday::Mon) - 100.0 / mean).abs() < 1e-9);
        assert!((index.factor(Weekday::Sun) - 30.0 / mean).abs() < 1e-9);
        assert!(index.factor(Weekday::Sat) < 1.0);
    }

    #[test]
    fn test_missing_weekday_is_neutral() {
        let series = TimeSeriesAggregator::new(Granularity::Daily).aggregate(vec![
            (Some(monday()), Some(100.0)),
            (Some(monday() + Duration::days(1)), Some(300.0)),
        ]);
        let index = SeasonalityEstimator::fit(&series);

        assert_eq!(index.factor(Weekday::Mon), 0.5);
        assert_eq!(index.factor(Weekday::Tue), 1.5);
        assert_eq!(index.factor(Weekday::Fri), 1.0);
    }

    #[test]
    fn test_monthly_index_is_neutral_and_serializes_empty() {
        let series = TimeSeriesAggregator::new(Granularity::Monthly)
            .aggregate(vec![(Some(monday()), Some(100.0))]);
        let index = SeasonalityEstimator::fit(&series);

        assert!(index.is_neutral());
        assert_eq!(index.factor(Weekday::Wed), 1.0);
        assert_eq!(serde_json::to_value(&index).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_serializes_all_weekdays() {
        let series = TimeSeriesAggregator::new(Granularity::Daily)
            .aggregate(vec![(Some(monday()), Some(100.0))]);
        let json = serde_json::to_value(SeasonalityEstimator::fit(&series)).unwrap();
        let map = json.as_object().unwrap();

        assert_eq!(map.len(), 7);
        assert_eq!(map["MONDAY"], 1.0);
        assert_eq!(map["SUNDAY"], 1.0);
    }

    #[test]
    fn test_zero_mean_is_neutral() {
        let series = TimeSeriesAggregator::new(Granularity::Daily)
            .aggregate(vec![(Some(monday()), Some(0.0))]);
        assert!(SeasonalityEstimator::fit(&series).is_neutral());
    }
}
