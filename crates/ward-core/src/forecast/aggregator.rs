//! Grouping of dated amounts into period totals

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::period::{Granularity, Period};

/// Period totals in chronological order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSeries {
    granularity: Granularity,
    points: BTreeMap<Period, f64>,
    total: f64,
}

impl GroupedSeries {
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            points: BTreeMap::new(),
            total: 0.0,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Sum of every contributing amount
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, period: &Period) -> Option<f64> {
        self.points.get(period).copied()
    }

    /// Latest period with data
    pub fn last_period(&self) -> Option<Period> {
        self.points.keys().next_back().copied()
    }

    /// Mean over periods (not over records)
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.values().sum::<f64>() / self.points.len() as f64)
    }

    /// Periods and their totals, oldest first
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.points.iter().map(|(period, value)| (*period, *value))
    }
}

/// Groups dated amounts by day or by month
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesAggregator {
    granularity: Granularity,
}

impl TimeSeriesAggregator {
    pub fn new(granularity: Granularity) -> Self {
        Self { granularity }
    }

    /// Sum amounts per period
    ///
    /// Entries without a date, without an amount, or with a non-finite amount
    /// are skipped and contribute to neither the points nor the total.
    pub fn aggregate<I>(&self, entries: I) -> GroupedSeries
    where
        I: IntoIterator<Item = (Option<NaiveDate>, Option<f64>)>,
    {
        let mut series = GroupedSeries::empty(self.granularity);

        for (date, amount) in entries {
            let (Some(date), Some(amount)) = (date, amount) else {
                continue;
            };
            if !amount.is_finite() {
                continue;
            }

            *series
                .points
                .entry(Period::of(date, self.granularity))
                .or_insert(0.0) += amount;
            series.total += amount;
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_daily_grouping_sums_same_day() {
        let series = TimeSeriesAggregator::new(Granularity::Daily).aggregate(vec![
            (date(2025, 1, 2), Some(100.0)),
            (date(2025, 1, 1), Some(50.0)),
            (date(2025, 1, 2), Some(25.0)),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.total(), 175.0);
        let points: Vec<_> = series.iter().collect();
        assert_eq!(points[0].0.to_string(), "2025-01-01");
        assert_eq!(points[1], (Period::Day(date(2025, 1, 2).unwrap()), 125.0));
    }

    #[test]
    fn test_monthly_grouping() {
        let series = TimeSeriesAggregator::new(Granularity::Monthly).aggregate(vec![
            (date(2025, 1, 2), Some(100.0)),
            (date(2025, 1, 31), Some(50.0)),
            (date(2025, 2, 1), Some(10.0)),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.get(&Period::Month { year: 2025, month: 1 }), Some(150.0));
        assert_eq!(
            series.last_period(),
            Some(Period::Month { year: 2025, month: 2 })
        );
    }

    #[test]
    fn test_incomplete_entries_are_dropped() {
        let series = TimeSeriesAggregator::new(Granularity::Daily).aggregate(vec![
            (None, Some(100.0)),
            (date(2025, 1, 1), None),
            (date(2025, 1, 1), Some(f64::NAN)),
            (date(2025, 1, 1), Some(40.0)),
        ]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.total(), 40.0);
    }

    #[test]
    fn test_total_matches_point_sum() {
        let entries: Vec<_> = (1..=28)
            .map(|d| (date(2025, 2, d), Some(d as f64 * 1.5)))
            .collect();
        let series = TimeSeriesAggregator::new(Granularity::Daily).aggregate(entries);
        let sum: f64 = series.iter().map(|(_, v)| v).sum();
        assert!((series.total() - sum).abs() < 1e-9);
    }

    #[test]
    fn test_empty_series() {
        let series = TimeSeriesAggregator::new(Granularity::Daily)
            .aggregate(Vec::<(Option<NaiveDate>, Option<f64>)>::new());
        assert!(series.is_empty());
        assert_eq!(series.total(), 0.0);
        assert_eq!(series.mean(), None);
        assert_eq!(series.last_period(), None);
    }
}
