//! Domain models for Ward
//!
//! Records mirror what the persistence layer stores. Every cost-bearing field
//! is optional: a record without a usable date or amount is simply left out
//! of aggregation instead of failing a whole request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Input for creating a patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPatient {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

/// A billed medical act (consultation, imaging, surgery...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalAct {
    pub id: i64,
    pub patient_id: Option<i64>,
    pub act_type: String,
    pub date: Option<NaiveDate>,
    pub practitioner: Option<String>,
    pub cost: Option<f64>,
}

/// Input for recording a medical act
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMedicalAct {
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub act_type: String,
    pub date: Option<NaiveDate>,
    pub practitioner: Option<String>,
    pub cost: Option<f64>,
}

/// Consumable usage (medication, supplies) charged on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub id: i64,
    pub patient_id: Option<i64>,
    pub item: String,
    pub quantity: Option<i64>,
    pub unit_cost: Option<f64>,
    pub date: Option<NaiveDate>,
    pub total_cost: Option<f64>,
}

impl Consumable {
    /// Charged amount: the recorded total, else quantity × unit cost
    pub fn cost(&self) -> Option<f64> {
        self.total_cost.or(match (self.quantity, self.unit_cost) {
            (Some(quantity), Some(unit_cost)) => Some(quantity as f64 * unit_cost),
            _ => None,
        })
    }
}

/// Input for recording consumable usage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewConsumable {
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub item: String,
    pub quantity: Option<i64>,
    pub unit_cost: Option<f64>,
    pub date: Option<NaiveDate>,
    pub total_cost: Option<f64>,
}

/// A hospital stay billed per night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalStay {
    pub id: i64,
    pub patient_id: Option<i64>,
    /// Joined from the patients table when the stay is linked to a patient
    pub patient_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub daily_rate: Option<f64>,
    pub pathology: Option<String>,
}

impl HospitalStay {
    /// Billable nights, with a one-night minimum for same-day stays
    ///
    /// Returns None when either date is missing or the stay ends before it starts.
    pub fn nights(&self) -> Option<i64> {
        let (start, end) = (self.start_date?, self.end_date?);
        let nights = (end - start).num_days();
        if nights < 0 {
            return None;
        }
        Some(nights.max(1))
    }

    /// Stay revenue: daily rate × billable nights
    pub fn revenue(&self) -> Option<f64> {
        let rate = self.daily_rate?;
        self.nights().map(|nights| rate * nights as f64)
    }

    /// Whether both stay dates fall inside `[start, end]`
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => s >= start && s <= end && e >= start && e <= end,
            _ => false,
        }
    }

    /// Whether the stay overlaps `[start, end]` at all
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => s <= end && e >= start,
            _ => false,
        }
    }
}

/// Input for recording a hospital stay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStay {
    pub patient_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub daily_rate: Option<f64>,
    pub pathology: Option<String>,
}

impl NewStay {
    /// Reject a stay that ends before it starts
    pub fn validate(&self) -> crate::error::Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(crate::error::Error::InvalidData(format!(
                    "stay ends ({}) before it starts ({})",
                    end, start
                )));
            }
        }
        Ok(())
    }
}

/// A staff member with a flat daily cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: i64,
    pub name: String,
    pub role: Option<String>,
    pub service: Option<String>,
    pub cost_per_day: Option<f64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Input for adding a staff member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPersonnel {
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
    pub service: Option<String>,
    pub cost_per_day: Option<f64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Record kinds that can be bulk imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    MedicalActs,
    Consumables,
    Stays,
    Personnel,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MedicalActs => "medical_acts",
            Self::Consumables => "consumables",
            Self::Stays => "stays",
            Self::Personnel => "personnel",
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "medical_acts" | "acts" | "act" => Ok(Self::MedicalActs),
            "consumables" | "consumable" => Ok(Self::Consumables),
            "stays" | "stay" => Ok(Self::Stays),
            "personnel" | "staff" => Ok(Self::Personnel),
            _ => Err(format!(
                "Unknown record kind: {} (valid: acts, consumables, stays, personnel)",
                s
            )),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row counts per table, for status output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCounts {
    pub patients: i64,
    pub medical_acts: i64,
    pub consumables: i64,
    pub stays: i64,
    pub personnel: i64,
}
