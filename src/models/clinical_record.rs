use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::EntityId;

/// One documented visit. `patient_id` is a value reference only — it is
/// never validated against the patient table, and records survive deletion
/// of their patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub id: EntityId,
    pub patient_id: EntityId,
    pub visit_date: Option<NaiveDate>,
    /// Patient name as submitted at creation time, not re-derived later.
    pub full_name: Option<String>,
    /// National id as submitted at creation time.
    pub national_id: Option<String>,
    pub reason: Option<String>,
    pub current_condition: Option<String>,
    pub health_history: Option<String>,
    pub comments: Option<String>,
}

/// Fields accepted when a visit is first recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalRecordDraft {
    pub visit_date: Option<NaiveDate>,
    pub full_name: Option<String>,
    pub national_id: Option<String>,
    pub reason: Option<String>,
    pub current_condition: Option<String>,
    pub health_history: Option<String>,
    pub comments: Option<String>,
}

/// The edit path is narrower than the create path: the name and national-id
/// snapshots are fixed at creation and cannot be rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalRecordUpdate {
    pub visit_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub current_condition: Option<String>,
    pub health_history: Option<String>,
    pub comments: Option<String>,
}
