//! Engine configuration
//!
//! Defaults reproduce the dashboard's conventions (30-day windows, 30-day
//! personnel baseline, daily granularity up to 120 days). Each value can be
//! overridden through a `WARD_*` environment variable.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables for forecasting and the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Horizons up to this many days are forecast per day, longer ones per month
    pub daily_max_horizon: u32,
    /// Days of personnel cost added to every total
    pub personnel_baseline_days: u32,
    /// Length of each rolling dashboard window
    pub window_days: u32,
    /// Real-cost trend (in %) beyond which the smart alert leaves "info"
    pub alert_threshold_pct: f64,
    /// Number of stays listed on the dashboard
    pub recent_stays_limit: usize,
    /// Horizon used when a caller does not specify one
    pub default_horizon_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_max_horizon: 120,
            personnel_baseline_days: 30,
            window_days: 30,
            alert_threshold_pct: 5.0,
            recent_stays_limit: 5,
            default_horizon_days: 30,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(var = name, value = %raw, "Ignoring unparsable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl EngineConfig {
    /// Load configuration from `WARD_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            daily_max_horizon: env_or("WARD_DAILY_MAX_HORIZON", defaults.daily_max_horizon),
            personnel_baseline_days: env_or(
                "WARD_PERSONNEL_BASELINE_DAYS",
                defaults.personnel_baseline_days,
            ),
            window_days: env_or("WARD_WINDOW_DAYS", defaults.window_days),
            alert_threshold_pct: env_or("WARD_ALERT_THRESHOLD_PCT", defaults.alert_threshold_pct),
            recent_stays_limit: env_or("WARD_RECENT_STAYS_LIMIT", defaults.recent_stays_limit),
            default_horizon_days: env_or("WARD_DEFAULT_HORIZON", defaults.default_horizon_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.daily_max_horizon, 120);
        assert_eq!(config.personnel_baseline_days, 30);
        assert_eq!(config.default_horizon_days, 30);
        assert_eq!(config.alert_threshold_pct, 5.0);
    }

    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        std::env::set_var("WARD_RECENT_STAYS_LIMIT", "8");
        std::env::set_var("WARD_ALERT_THRESHOLD_PCT", "not-a-number");
        let config = EngineConfig::from_env();
        std::env::remove_var("WARD_RECENT_STAYS_LIMIT");
        std::env::remove_var("WARD_ALERT_THRESHOLD_PCT");

        assert_eq!(config.recent_stays_limit, 8);
        assert_eq!(config.alert_threshold_pct, 5.0);
    }
}
