//! Record sources for the forecasting engine
//!
//! The engine never talks to storage directly. It asks a `RecordSource` for a
//! full snapshot of the four record kinds once per request and computes
//! everything else in memory from that snapshot.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Consumable, HospitalStay, MedicalAct, Personnel};

/// Read-only, full-snapshot access to cost-bearing records
pub trait RecordSource {
    fn medical_acts(&self) -> Result<Vec<MedicalAct>>;
    fn consumables(&self) -> Result<Vec<Consumable>>;
    fn stays(&self) -> Result<Vec<HospitalStay>>;
    fn personnel(&self) -> Result<Vec<Personnel>>;

    /// Fetch all four record kinds. Any read failure aborts the whole snapshot.
    fn snapshot(&self) -> Result<RecordSnapshot> {
        Ok(RecordSnapshot {
            medical_acts: self.medical_acts()?,
            consumables: self.consumables()?,
            stays: self.stays()?,
            personnel: self.personnel()?,
        })
    }
}

/// An already-fetched set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub medical_acts: Vec<MedicalAct>,
    pub consumables: Vec<Consumable>,
    pub stays: Vec<HospitalStay>,
    pub personnel: Vec<Personnel>,
}

impl RecordSnapshot {
    /// Summed daily cost of all staff; missing rates count as zero
    pub fn daily_personnel_cost(&self) -> f64 {
        self.personnel.iter().filter_map(|p| p.cost_per_day).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.medical_acts.is_empty()
            && self.consumables.is_empty()
            && self.stays.is_empty()
            && self.personnel.is_empty()
    }
}

impl RecordSource for RecordSnapshot {
    fn medical_acts(&self) -> Result<Vec<MedicalAct>> {
        Ok(self.medical_acts.clone())
    }

    fn consumables(&self) -> Result<Vec<Consumable>> {
        Ok(self.consumables.clone())
    }

    fn stays(&self) -> Result<Vec<HospitalStay>> {
        Ok(self.stays.clone())
    }

    fn personnel(&self) -> Result<Vec<Personnel>> {
        Ok(self.personnel.clone())
    }

    fn snapshot(&self) -> Result<RecordSnapshot> {
        Ok(self.clone())
    }
}

impl RecordSource for Database {
    fn medical_acts(&self) -> Result<Vec<MedicalAct>> {
        self.list_medical_acts()
    }

    fn consumables(&self) -> Result<Vec<Consumable>> {
        self.list_consumables()
    }

    fn stays(&self) -> Result<Vec<HospitalStay>> {
        self.list_stays()
    }

    fn personnel(&self) -> Result<Vec<Personnel>> {
        self.list_personnel()
    }

    fn snapshot(&self) -> Result<RecordSnapshot> {
        Database::snapshot(self)
    }
}
