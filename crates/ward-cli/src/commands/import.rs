//! CSV import command implementation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use ward_core::db::Database;
use ward_core::import::parse_records;
use ward_core::models::RecordKind;

/// Import one kind of record from a CSV file, returning the number inserted
pub fn cmd_import(db: &Database, kind: &str, file: &Path) -> Result<usize> {
    let kind: RecordKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing {} from {}...", kind, file.display());

    let records = parse_records(BufReader::new(csv_file), kind)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if records.is_empty() {
        println!("   No rows found");
        return Ok(0);
    }

    let imported = db
        .import_records(&records)
        .context("Failed to save imported records")?;

    info!(kind = %kind, file = %file.display(), imported, "CSV import complete");
    println!("✅ Imported {} {} records", imported, kind);
    println!();
    println!("   Run 'ward forecast' to refresh the projection");

    Ok(imported)
}
