//! Record operations: patients, medical acts, consumables, stays, personnel

use rusqlite::{params, Row};

use super::{format_date, parse_date, Database};
use crate::error::Result;
use crate::import::ParsedRecords;
use crate::models::*;
use crate::source::RecordSnapshot;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birth_date: parse_date(row.get(3)?),
    })
}

fn act_from_row(row: &Row<'_>) -> rusqlite::Result<MedicalAct> {
    Ok(MedicalAct {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        act_type: row.get(2)?,
        date: parse_date(row.get(3)?),
        practitioner: row.get(4)?,
        cost: row.get(5)?,
    })
}

fn consumable_from_row(row: &Row<'_>) -> rusqlite::Result<Consumable> {
    Ok(Consumable {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        item: row.get(2)?,
        quantity: row.get(3)?,
        unit_cost: row.get(4)?,
        date: parse_date(row.get(5)?),
        total_cost: row.get(6)?,
    })
}

fn stay_from_row(row: &Row<'_>) -> rusqlite::Result<HospitalStay> {
    let first_name: Option<String> = row.get(6)?;
    let last_name: Option<String> = row.get(7)?;
    let patient_name = match (first_name, last_name) {
        (None, None) => None,
        (first, last) => Some(
            format!(
                "{} {}",
                first.unwrap_or_default(),
                last.unwrap_or_default()
            )
            .trim()
            .to_string(),
        ),
    };

    Ok(HospitalStay {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name,
        start_date: parse_date(row.get(2)?),
        end_date: parse_date(row.get(3)?),
        daily_rate: row.get(4)?,
        pathology: row.get(5)?,
    })
}

fn personnel_from_row(row: &Row<'_>) -> rusqlite::Result<Personnel> {
    Ok(Personnel {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        service: row.get(3)?,
        cost_per_day: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
    })
}

const STAY_SELECT: &str = r#"
    SELECT s.id, s.patient_id, s.start_date, s.end_date, s.daily_rate, s.pathology,
           p.first_name, p.last_name
    FROM stays s
    LEFT JOIN patients p ON p.id = s.patient_id
"#;

impl Database {
    /// Add a patient
    pub fn add_patient(&self, patient: &NewPatient) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO patients (first_name, last_name, birth_date) VALUES (?, ?, ?)",
            params![
                patient.first_name,
                patient.last_name,
                format_date(patient.birth_date)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all patients
    pub fn list_patients(&self) -> Result<Vec<Patient>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, birth_date FROM patients ORDER BY last_name, first_name",
        )?;
        let patients = stmt
            .query_map([], patient_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(patients)
    }

    /// Get a patient by ID
    pub fn get_patient(&self, id: i64) -> Result<Option<Patient>> {
        let conn = self.conn()?;
        let patient = conn
            .query_row(
                "SELECT id, first_name, last_name, birth_date FROM patients WHERE id = ?",
                params![id],
                patient_from_row,
            )
            .ok();
        Ok(patient)
    }

    /// Record a medical act
    pub fn add_medical_act(&self, act: &NewMedicalAct) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO medical_acts (patient_id, act_type, date, practitioner, cost) VALUES (?, ?, ?, ?, ?)",
            params![
                act.patient_id,
                act.act_type,
                format_date(act.date),
                act.practitioner,
                act.cost
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all medical acts, oldest first
    pub fn list_medical_acts(&self) -> Result<Vec<MedicalAct>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, patient_id, act_type, date, practitioner, cost FROM medical_acts ORDER BY date, id",
        )?;
        let acts = stmt
            .query_map([], act_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(acts)
    }

    /// Record consumable usage
    pub fn add_consumable(&self, consumable: &NewConsumable) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO consumables (patient_id, item, quantity, unit_cost, date, total_cost)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                consumable.patient_id,
                consumable.item,
                consumable.quantity,
                consumable.unit_cost,
                format_date(consumable.date),
                consumable.total_cost
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all consumables, oldest first
    pub fn list_consumables(&self) -> Result<Vec<Consumable>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, patient_id, item, quantity, unit_cost, date, total_cost FROM consumables ORDER BY date, id",
        )?;
        let consumables = stmt
            .query_map([], consumable_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(consumables)
    }

    /// Record a hospital stay
    pub fn add_stay(&self, stay: &NewStay) -> Result<i64> {
        stay.validate()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO stays (patient_id, start_date, end_date, daily_rate, pathology) VALUES (?, ?, ?, ?, ?)",
            params![
                stay.patient_id,
                format_date(stay.start_date),
                format_date(stay.end_date),
                stay.daily_rate,
                stay.pathology
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all stays with their patient names, oldest first
    pub fn list_stays(&self) -> Result<Vec<HospitalStay>> {
        let conn = self.conn()?;
        let sql = format!("{} ORDER BY s.start_date, s.id", STAY_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let stays = stmt
            .query_map([], stay_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stays)
    }

    /// Add a staff member
    pub fn add_personnel(&self, personnel: &NewPersonnel) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO personnel (name, role, service, cost_per_day, email, phone)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                personnel.name,
                personnel.role,
                personnel.service,
                personnel.cost_per_day,
                personnel.email,
                personnel.phone
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all staff members
    pub fn list_personnel(&self) -> Result<Vec<Personnel>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, role, service, cost_per_day, email, phone FROM personnel ORDER BY name, id",
        )?;
        let personnel = stmt
            .query_map([], personnel_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(personnel)
    }

    /// Count rows in each record table
    pub fn record_counts(&self) -> Result<RecordCounts> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?)
        };

        Ok(RecordCounts {
            patients: count("patients")?,
            medical_acts: count("medical_acts")?,
            consumables: count("consumables")?,
            stays: count("stays")?,
            personnel: count("personnel")?,
        })
    }

    /// Insert parsed CSV records, returning how many were stored
    pub fn import_records(&self, records: &ParsedRecords) -> Result<usize> {
        match records {
            ParsedRecords::MedicalActs(acts) => {
                for act in acts {
                    self.add_medical_act(act)?;
                }
            }
            ParsedRecords::Consumables(consumables) => {
                for consumable in consumables {
                    self.add_consumable(consumable)?;
                }
            }
            ParsedRecords::Stays(stays) => {
                for stay in stays {
                    self.add_stay(stay)?;
                }
            }
            ParsedRecords::Personnel(personnel) => {
                for member in personnel {
                    self.add_personnel(member)?;
                }
            }
        }
        Ok(records.len())
    }

    /// Read every cost-bearing record into one in-memory snapshot
    pub fn snapshot(&self) -> Result<RecordSnapshot> {
        Ok(RecordSnapshot {
            medical_acts: self.list_medical_acts()?,
            consumables: self.list_consumables()?,
            stays: self.list_stays()?,
            personnel: self.list_personnel()?,
        })
    }
}
