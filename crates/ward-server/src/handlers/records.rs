//! Record handlers: patients, medical acts, consumables, stays, personnel

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{AppError, AppState};
use ward_core::models::{
    Consumable, HospitalStay, MedicalAct, NewConsumable, NewMedicalAct, NewPatient,
    NewPersonnel, NewStay, Patient, Personnel,
};

/// Response for created records
#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

fn ensure_non_negative(value: Option<f64>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::bad_request(&format!(
            "{} must be a non-negative number",
            field
        ))),
        _ => Ok(()),
    }
}

fn ensure_patient_exists(state: &AppState, patient_id: Option<i64>) -> Result<(), AppError> {
    if let Some(id) = patient_id {
        if state.db.get_patient(id)?.is_none() {
            return Err(AppError::bad_request(&format!("Unknown patient: {}", id)));
        }
    }
    Ok(())
}

/// GET /api/patients - List all patients
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Patient>>, AppError> {
    Ok(Json(state.db.list_patients()?))
}

/// GET /api/patients/:id - Get a single patient
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, AppError> {
    let patient = state
        .db
        .get_patient(id)?
        .ok_or_else(|| AppError::not_found("Patient not found"))?;
    Ok(Json(patient))
}

/// POST /api/patients - Create a patient
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(patient): Json<NewPatient>,
) -> Result<Json<CreatedResponse>, AppError> {
    if patient.first_name.trim().is_empty() && patient.last_name.trim().is_empty() {
        return Err(AppError::bad_request("Patient name is required"));
    }
    let id = state.db.add_patient(&patient)?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/medical-acts - List all medical acts
pub async fn list_medical_acts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MedicalAct>>, AppError> {
    Ok(Json(state.db.list_medical_acts()?))
}

/// POST /api/medical-acts - Record a medical act
pub async fn create_medical_act(
    State(state): State<Arc<AppState>>,
    Json(act): Json<NewMedicalAct>,
) -> Result<Json<CreatedResponse>, AppError> {
    ensure_non_negative(act.cost, "cost")?;
    ensure_patient_exists(&state, act.patient_id)?;
    let id = state.db.add_medical_act(&act)?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/consumables - List all consumables
pub async fn list_consumables(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Consumable>>, AppError> {
    Ok(Json(state.db.list_consumables()?))
}

/// POST /api/consumables - Record consumable usage
pub async fn create_consumable(
    State(state): State<Arc<AppState>>,
    Json(consumable): Json<NewConsumable>,
) -> Result<Json<CreatedResponse>, AppError> {
    ensure_non_negative(consumable.unit_cost, "unit_cost")?;
    ensure_non_negative(consumable.total_cost, "total_cost")?;
    if consumable.quantity.is_some_and(|q| q < 0) {
        return Err(AppError::bad_request("quantity must not be negative"));
    }
    ensure_patient_exists(&state, consumable.patient_id)?;
    let id = state.db.add_consumable(&consumable)?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/stays - List all stays
pub async fn list_stays(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HospitalStay>>, AppError> {
    Ok(Json(state.db.list_stays()?))
}

/// POST /api/stays - Record a hospital stay
///
/// A stay ending before it starts is rejected by the database layer (400).
pub async fn create_stay(
    State(state): State<Arc<AppState>>,
    Json(stay): Json<NewStay>,
) -> Result<Json<CreatedResponse>, AppError> {
    ensure_non_negative(stay.daily_rate, "daily_rate")?;
    ensure_patient_exists(&state, stay.patient_id)?;
    let id = state.db.add_stay(&stay)?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/personnel - List all staff members
pub async fn list_personnel(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Personnel>>, AppError> {
    Ok(Json(state.db.list_personnel()?))
}

/// POST /api/personnel - Add a staff member
pub async fn create_personnel(
    State(state): State<Arc<AppState>>,
    Json(personnel): Json<NewPersonnel>,
) -> Result<Json<CreatedResponse>, AppError> {
    if personnel.name.trim().is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    ensure_non_negative(personnel.cost_per_day, "cost_per_day")?;
    let id = state.db.add_personnel(&personnel)?;
    Ok(Json(CreatedResponse { id }))
}
