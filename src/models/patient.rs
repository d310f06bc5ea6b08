use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: EntityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Always `first + " " + last` as of the most recent write.
    pub full_name: String,
    pub national_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub locality: Option<String>,
    pub email: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_member_id: Option<String>,
}

/// Form fields for registering or editing a patient.
///
/// Every field is optional: partial submissions are stored as-is. Duplicate
/// national ids are accepted without complaint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub locality: Option<String>,
    pub email: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_member_id: Option<String>,
}

impl PatientDraft {
    /// Derived display name, recomputed on every create and edit. Missing
    /// name parts contribute empty strings.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
    }
}
