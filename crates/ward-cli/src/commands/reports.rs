//! Forecast and dashboard command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ward_core::db::Database;
use ward_core::forecast::{CategoryForecast, CostCategory, ForecastEngine};
use ward_core::{AlertLevel, DashboardAggregator, EngineConfig};

use super::{format_money, format_trend};

/// Build an engine over the current database contents
pub fn load_engine(db: &Database, as_of: Option<NaiveDate>) -> Result<ForecastEngine> {
    let engine = ForecastEngine::from_source(db, EngineConfig::from_env())
        .context("Failed to read records")?;
    Ok(match as_of {
        Some(today) => engine.as_of(today),
        None => engine,
    })
}

fn print_category(name: &str, forecast: &CategoryForecast) {
    println!();
    println!("   {}", name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Recorded total:   {:>14}", format_money(forecast.current_total));
    println!("   Predicted total:  {:>14}", format_money(forecast.predicted_total));
    println!("   Trend slope:      {:>14.4}", forecast.methodology.slope);

    let seasonality = &forecast.methodology.seasonality;
    if !seasonality.is_neutral() {
        let factors: Vec<String> = seasonality
            .factors()
            .into_iter()
            .map(|(day, factor)| format!("{} {:.2}", day, factor))
            .collect();
        println!("   Weekday factors:  {}", factors.join(", "));
    }
}

pub fn cmd_forecast(
    db: &Database,
    days: Option<u32>,
    category: Option<&str>,
    as_of: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let engine = load_engine(db, as_of)?;
    let days = days.unwrap_or(engine.config().default_horizon_days);

    if let Some(category) = category {
        let category: CostCategory = category.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        let forecast = engine.forecast_category(category, days);

        if json {
            println!("{}", serde_json::to_string_pretty(&forecast)?);
            return Ok(());
        }

        println!();
        println!(
            "🔮 {} forecast, next {} days ({}, as of {})",
            category.label(),
            days,
            engine.granularity(days).as_str(),
            engine.today()
        );
        print_category(category.label(), &forecast);

        if !forecast.history.is_empty() {
            println!();
            println!("   {:<12} {:>14} {:>14}", "Period", "Real", "Predicted");
            for point in &forecast.history {
                let real = point
                    .real
                    .map(format_money)
                    .unwrap_or_else(|| "-".to_string());
                let marker = if point.is_future { " *" } else { "" };
                println!(
                    "   {:<12} {:>14} {:>14}{}",
                    point.period.to_string(),
                    real,
                    format_money(point.predicted),
                    marker
                );
            }
            println!();
            println!("   * projected");
        }
        println!();
        return Ok(());
    }

    let forecast = engine.global_forecast(days);

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    println!();
    println!(
        "🔮 Cost forecast, next {} days ({}, as of {})",
        days,
        engine.granularity(days).as_str(),
        engine.today()
    );
    println!();
    println!("   Recorded total:   {:>14}", format_money(forecast.global_total));
    println!(
        "   Predicted total:  {:>14}",
        format_money(forecast.global_prediction)
    );
    println!(
        "   (includes {} personnel baseline)",
        format_money(engine.personnel_baseline())
    );

    print_category(CostCategory::MedicalActs.label(), &forecast.medical_acts);
    print_category(CostCategory::Consumables.label(), &forecast.consumables);
    print_category(CostCategory::Stays.label(), &forecast.stays);
    println!();

    Ok(())
}

pub fn cmd_dashboard(db: &Database, as_of: Option<NaiveDate>, json: bool) -> Result<()> {
    let engine = load_engine(db, as_of)?;
    let summary = DashboardAggregator::new(&engine).summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           🏥 Ward Dashboard             │");
    println!("╰─────────────────────────────────────────╯");
    println!("  As of {}", engine.today());
    println!();
    println!(
        "  Real cost (30d):      {:>14}  {}",
        format_money(summary.total_real_cost),
        format_trend(summary.total_real_cost_trend)
    );
    println!(
        "  Predicted (30d):      {:>14}  {}",
        format_money(summary.total_predicted_cost),
        format_trend(summary.total_predicted_cost_trend)
    );
    println!(
        "  Avg cost per stay:    {:>14}  {}",
        format_money(summary.avg_cost_per_stay),
        format_trend(summary.avg_cost_per_stay_trend)
    );
    println!(
        "  Personnel ratio:      {:>13.1}%  {:+.1} pts",
        summary.personnel_cost_ratio, summary.personnel_cost_ratio_trend
    );

    println!();
    println!("  Cost by category");
    for slice in &summary.cost_by_category {
        println!("    {:<20} {:>14}", slice.name, format_money(slice.value));
    }

    if !summary.recent_stays.is_empty() {
        println!();
        println!("  Recent stays");
        for stay in &summary.recent_stays {
            println!(
                "    {:<22} {:<16} {:<12} {:>12}",
                stay.patient_name,
                stay.department,
                stay.status,
                format_money(stay.cost)
            );
        }
    }

    let alert = &summary.smart_alert;
    let icon = match alert.level {
        AlertLevel::Warning => "⚠️ ",
        AlertLevel::Success => "✅",
        AlertLevel::Info => "💡",
    };
    println!();
    println!("  {} {}", icon, alert.title);
    println!("     {}", alert.message);
    println!();

    Ok(())
}
