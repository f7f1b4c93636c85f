//! SQLite persistence for ward records
//!
//! Connections come from an r2d2 pool. Files are encrypted with SQLCipher
//! unless opened with `new_unencrypted`. Record queries live in `records`,
//! which also makes `Database` a `RecordSource` for the forecasting engine.

use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info};

use crate::error::{Error, Result};

mod records;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Passphrase used to unlock an encrypted database
pub const DB_KEY_ENV: &str = "WARD_DB_KEY";

/// Pooled connections per database
const POOL_SIZE: u32 = 10;

/// Fixed salt: the key depends on the passphrase only, so a database file
/// can be copied or renamed. Changing it locks out every existing database.
const KEY_SALT: &[u8; 16] = b"ward-salt-v1-fix";

/// Turn a passphrase into a hex SQLCipher raw key with Argon2id
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    let salt = SaltString::encode_b64(KEY_SALT)
        .map_err(|e| Error::Encryption(format!("invalid key salt: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("key derivation failed: {}", e)))?
        .hash
        .ok_or_else(|| Error::Encryption("key derivation produced no output".to_string()))?;

    Ok(hex::encode(hash.as_bytes()))
}

/// Parse a stored `YYYY-MM-DD` column; unreadable values count as missing
pub(crate) fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

/// Format a date for storage
pub(crate) fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Pooled handle on the ward database
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
    encrypted: bool,
}

impl Database {
    /// Open (or create) an encrypted database keyed by `WARD_DB_KEY`
    ///
    /// Fails when the variable is unset; `new_unencrypted` is the explicit
    /// opt-out for development databases.
    pub fn new(path: &str) -> Result<Self> {
        let passphrase = std::env::var(DB_KEY_ENV).map_err(|_| {
            Error::Encryption(format!(
                "{} is not set. Export a passphrase to encrypt patient data, \
                 or pass --no-encrypt for a development database.",
                DB_KEY_ENV
            ))
        })?;
        Self::new_with_key(path, Some(&passphrase))
    }

    /// Open (or create) a plain SQLite database
    ///
    /// Patient data is stored in clear text.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open (or create) a database, encrypted when a passphrase is given
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let key_pragma = passphrase
            .map(derive_key)
            .transpose()?
            .map(|key| format!("PRAGMA key = 'x\"{}\"';", key));
        let encrypted = key_pragma.is_some();

        // SQLCipher needs the key on every connection the pool opens
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            if let Some(pragma) = &key_pragma {
                conn.execute_batch(pragma)?;
            }
            Ok(())
        });
        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted,
        };
        db.run_migrations()?;
        debug!(path, encrypted, "Database opened");

        Ok(db)
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Unencrypted scratch database in the temp directory
    ///
    /// A file rather than `:memory:` so every pooled connection sees the
    /// same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);

        let path = std::env::temp_dir().join(format!(
            "ward_scratch_{}_{}.db",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let path = path.to_string_lossy().into_owned();
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Whether the database was opened with a key and SQLCipher is active
    pub fn is_encrypted(&self) -> Result<bool> {
        if !self.encrypted {
            return Ok(false);
        }
        let conn = self.conn()?;
        let cipher: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(cipher.is_ok())
    }

    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Create the record tables if missing
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                birth_date DATE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Dates and amounts are nullable: incomplete rows are kept but
            -- ignored by the forecasting engine.
            CREATE TABLE IF NOT EXISTS medical_acts (
                id INTEGER PRIMARY KEY,
                patient_id INTEGER REFERENCES patients(id) ON DELETE SET NULL,
                act_type TEXT NOT NULL DEFAULT '',
                date DATE,
                practitioner TEXT,
                cost REAL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_medical_acts_date ON medical_acts(date);
            CREATE INDEX IF NOT EXISTS idx_medical_acts_patient ON medical_acts(patient_id);

            CREATE TABLE IF NOT EXISTS consumables (
                id INTEGER PRIMARY KEY,
                patient_id INTEGER REFERENCES patients(id) ON DELETE SET NULL,
                item TEXT NOT NULL DEFAULT '',
                quantity INTEGER,
                unit_cost REAL,
                date DATE,
                total_cost REAL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_consumables_date ON consumables(date);

            CREATE TABLE IF NOT EXISTS stays (
                id INTEGER PRIMARY KEY,
                patient_id INTEGER REFERENCES patients(id) ON DELETE SET NULL,
                start_date DATE,
                end_date DATE,
                daily_rate REAL,
                pathology TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_stays_dates ON stays(start_date, end_date);

            CREATE TABLE IF NOT EXISTS personnel (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                role TEXT,
                service TEXT,
                cost_per_day REAL,
                email TEXT,
                phone TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        info!(path = %self.db_path, "Database schema ready");
        Ok(())
    }
}
