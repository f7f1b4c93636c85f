//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ward_core::forecast::MAX_HORIZON_DAYS;

/// Ward - Forecast and monitor hospital costs
#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Self-hosted hospital cost forecasting and dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ward.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set WARD_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, record counts)
    Status,

    /// Forecast costs over a horizon
    Forecast {
        /// Horizon in days (daily up to 120 days, monthly beyond, at most 3650)
        #[arg(
            short,
            long,
            value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_HORIZON_DAYS))
        )]
        days: Option<u32>,

        /// Only one category: medical-acts, consumables, stays
        #[arg(short, long)]
        category: Option<String>,

        /// Compute as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Show the cost dashboard (KPIs, breakdown, recent stays, alert)
    Dashboard {
        /// Compute as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Add a single record
    Add {
        #[command(subcommand)]
        record: AddRecord,
    },

    /// Import records from CSV
    Import {
        /// Record kind: acts, consumables, stays, personnel
        #[arg(short, long)]
        kind: String,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, every API request needs a key from WARD_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AddRecord {
    /// Add a patient
    Patient {
        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },

    /// Add a medical act
    Act {
        /// Act type (e.g., Consultation, Imaging)
        #[arg(long = "type")]
        act_type: String,

        /// Date performed (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Cost of the act
        #[arg(long)]
        cost: Option<f64>,

        /// Practitioner name
        #[arg(long)]
        practitioner: Option<String>,

        /// Patient ID
        #[arg(long)]
        patient: Option<i64>,
    },

    /// Add consumable usage
    Consumable {
        /// Item name
        #[arg(long)]
        item: String,

        /// Quantity used
        #[arg(long)]
        quantity: Option<i64>,

        /// Cost per unit
        #[arg(long)]
        unit_cost: Option<f64>,

        /// Total cost (overrides quantity × unit cost)
        #[arg(long)]
        total_cost: Option<f64>,

        /// Date used (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Patient ID
        #[arg(long)]
        patient: Option<i64>,
    },

    /// Add a hospital stay
    Stay {
        /// Admission date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Discharge date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Daily rate
        #[arg(long)]
        daily_rate: Option<f64>,

        /// Pathology or department
        #[arg(long)]
        pathology: Option<String>,

        /// Patient ID
        #[arg(long)]
        patient: Option<i64>,
    },

    /// Add a staff member
    Personnel {
        /// Full name
        #[arg(long)]
        name: String,

        /// Role (e.g., Nurse, Surgeon)
        #[arg(long)]
        role: Option<String>,

        /// Hospital service
        #[arg(long)]
        service: Option<String>,

        /// Cost per day
        #[arg(long)]
        cost_per_day: Option<f64>,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
}
