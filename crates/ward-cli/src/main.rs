//! Ward CLI - Hospital cost forecasting
//!
//! Usage:
//!   ward init                          Initialize database
//!   ward import --kind acts --file F   Import records from CSV
//!   ward forecast --days 90            Forecast costs
//!   ward dashboard                     Show KPIs and the smart alert
//!   ward serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Forecast {
            days,
            category,
            as_of,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_forecast(&db, days, category.as_deref(), as_of, json)
        }
        Commands::Dashboard { as_of, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&db, as_of, json)
        }
        Commands::Add { record } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(&db, record).map(|_| ())
        }
        Commands::Import { kind, file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &kind, &file).map(|_| ())
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
