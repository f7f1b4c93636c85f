//! Error types for Ward
//!
//! Only record reads and writes can fail. Forecast and dashboard
//! computations are infallible once a snapshot has been taken.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Missing or wrong `WARD_DB_KEY`, or key derivation failure
    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV row that could not be turned into a record (carries the line number)
    #[error("Record import failed: {0}")]
    Import(String),

    /// A record that breaks a domain rule, e.g. a stay ending before it starts
    #[error("Invalid record: {0}")]
    InvalidData(String),

    /// A record source that cannot provide the requested records
    #[error("Records unavailable: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
