//! Test utilities for ward-core
//!
//! Fixture builders shared by the core's own tests and by the server and CLI
//! crates (through the `test-utils` feature).

use chrono::{Duration, Local, NaiveDate};

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewMedicalAct, NewPatient, NewPersonnel, NewStay};

/// The local date `days` days ago (negative values are in the future)
pub fn days_ago(days: i64) -> NaiveDate {
    Local::now().date_naive() - Duration::days(days)
}

/// A scratch database seeded with a small, realistic ward
///
/// Contains two patients, medical acts spread over the last two months, one
/// finished and one ongoing stay, and two staff members.
pub fn seeded_database() -> Result<Database> {
    let db = Database::in_memory()?;
    seed_ward(&db)?;
    Ok(db)
}

/// Seed `db` with the fixture ward used across tests
pub fn seed_ward(db: &Database) -> Result<()> {
    let alice = db.add_patient(&NewPatient {
        first_name: "Alice".to_string(),
        last_name: "Moreau".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1975, 6, 12),
    })?;
    let bruno = db.add_patient(&NewPatient {
        first_name: "Bruno".to_string(),
        last_name: "Petit".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 3),
    })?;

    for (days, act_type, cost) in [
        (55, "Consultation", 60.0),
        (40, "Imaging", 180.0),
        (20, "Consultation", 60.0),
        (10, "Surgery", 1500.0),
        (2, "Imaging", 200.0),
    ] {
        db.add_medical_act(&NewMedicalAct {
            patient_id: Some(alice),
            act_type: act_type.to_string(),
            date: Some(days_ago(days)),
            practitioner: Some("Dr. Garnier".to_string()),
            cost: Some(cost),
        })?;
    }

    db.add_stay(&NewStay {
        patient_id: Some(alice),
        start_date: Some(days_ago(12)),
        end_date: Some(days_ago(8)),
        daily_rate: Some(450.0),
        pathology: Some("Orthopedics".to_string()),
    })?;
    db.add_stay(&NewStay {
        patient_id: Some(bruno),
        start_date: Some(days_ago(1)),
        end_date: Some(days_ago(-3)),
        daily_rate: Some(380.0),
        pathology: None,
    })?;

    db.add_personnel(&NewPersonnel {
        name: "Dr. Garnier".to_string(),
        role: Some("Surgeon".to_string()),
        service: Some("Orthopedics".to_string()),
        cost_per_day: Some(600.0),
        ..Default::default()
    })?;
    db.add_personnel(&NewPersonnel {
        name: "Julie Roche".to_string(),
        role: Some("Nurse".to_string()),
        service: Some("Orthopedics".to_string()),
        cost_per_day: Some(220.0),
        ..Default::default()
    })?;

    Ok(())
}
