//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database initialization and shared utilities (open_db)
//! - `import` - CSV record import
//! - `records` - Adding single records
//! - `reports` - Forecast and dashboard output
//! - `serve` - Web server command
//! - `status` - Database status

pub mod core;
pub mod import;
pub mod records;
pub mod reports;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use records::*;
pub use reports::*;
pub use serve::*;
pub use status::*;

/// Format an amount with thousands separators and two decimals
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{:02}", sign, grouped, cents % 100)
}

/// Format a signed percentage trend, e.g. "+12.5%"
pub fn format_trend(trend: f64) -> String {
    format!("{:+.1}%", trend)
}
