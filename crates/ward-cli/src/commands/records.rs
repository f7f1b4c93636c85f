//! Record entry commands

use anyhow::{bail, Context, Result};
use ward_core::db::Database;
use ward_core::models::{NewConsumable, NewMedicalAct, NewPatient, NewPersonnel, NewStay};

use crate::cli::AddRecord;

fn ensure_non_negative(value: Option<f64>, flag: &str) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            bail!("{} must be a non-negative number", flag);
        }
    }
    Ok(())
}

fn ensure_patient(db: &Database, patient_id: Option<i64>) -> Result<()> {
    if let Some(id) = patient_id {
        if db.get_patient(id)?.is_none() {
            bail!("Patient not found: {}", id);
        }
    }
    Ok(())
}

/// Add a single record, returning its new ID
pub fn cmd_add(db: &Database, record: AddRecord) -> Result<i64> {
    let (label, id) = match record {
        AddRecord::Patient {
            first_name,
            last_name,
            birth_date,
        } => {
            let id = db
                .add_patient(&NewPatient {
                    first_name,
                    last_name,
                    birth_date,
                })
                .context("Failed to add patient")?;
            ("patient", id)
        }
        AddRecord::Act {
            act_type,
            date,
            cost,
            practitioner,
            patient,
        } => {
            ensure_non_negative(cost, "--cost")?;
            ensure_patient(db, patient)?;
            let id = db
                .add_medical_act(&NewMedicalAct {
                    patient_id: patient,
                    act_type,
                    date,
                    practitioner,
                    cost,
                })
                .context("Failed to add medical act")?;
            ("medical act", id)
        }
        AddRecord::Consumable {
            item,
            quantity,
            unit_cost,
            total_cost,
            date,
            patient,
        } => {
            if quantity.is_some_and(|q| q < 0) {
                bail!("--quantity must not be negative");
            }
            ensure_non_negative(unit_cost, "--unit-cost")?;
            ensure_non_negative(total_cost, "--total-cost")?;
            ensure_patient(db, patient)?;
            let id = db
                .add_consumable(&NewConsumable {
                    patient_id: patient,
                    item,
                    quantity,
                    unit_cost,
                    date,
                    total_cost,
                })
                .context("Failed to add consumable")?;
            ("consumable", id)
        }
        AddRecord::Stay {
            start,
            end,
            daily_rate,
            pathology,
            patient,
        } => {
            ensure_non_negative(daily_rate, "--daily-rate")?;
            ensure_patient(db, patient)?;
            let id = db
                .add_stay(&NewStay {
                    patient_id: patient,
                    start_date: start,
                    end_date: end,
                    daily_rate,
                    pathology,
                })
                .context("Failed to add stay")?;
            ("stay", id)
        }
        AddRecord::Personnel {
            name,
            role,
            service,
            cost_per_day,
            email,
            phone,
        } => {
            if name.trim().is_empty() {
                bail!("--name must not be empty");
            }
            ensure_non_negative(cost_per_day, "--cost-per-day")?;
            let id = db
                .add_personnel(&NewPersonnel {
                    name,
                    role,
                    service,
                    cost_per_day,
                    email,
                    phone,
                })
                .context("Failed to add staff member")?;
            ("staff member", id)
        }
    };

    println!("✅ Added {} (ID: {})", label, id);
    Ok(id)
}
