//! Caller-facing operations surface: what a router layer invokes once it
//! holds a [`StaffSession`]. Every operation consults the session flag
//! first; the stores underneath assume an authorized caller. Identity
//! tokens arrive as strings and are shape-checked before any query.

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, info};

use crate::attachments::{Attachment, AttachmentError, AttachmentStore, UploadFile};
use crate::auth::StaffSession;
use crate::db::repository;
use crate::db::{self, DatabaseError};
use crate::models::{
    ClinicalRecord, ClinicalRecordDraft, ClinicalRecordUpdate, EntityId, Patient, PatientDraft,
};
use crate::pagination::PageWindow;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The session flag is absent; the boundary layer shows its login view.
    #[error("not logged in")]
    Unauthenticated,

    /// Identity token malformed, or well-formed but absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

pub struct ClinicService {
    conn: Connection,
    attachments: AttachmentStore,
}

impl ClinicService {
    /// Open the record database and the attachment root.
    pub fn open(db_path: &Path, attachments_root: &Path) -> Result<Self, ServiceError> {
        let conn = db::open_database(db_path)?;
        let attachments = AttachmentStore::open(attachments_root)?;
        Ok(Self { conn, attachments })
    }

    /// In-memory database variant (for testing).
    pub fn open_in_memory(attachments_root: &Path) -> Result<Self, ServiceError> {
        let conn = db::open_memory_database()?;
        let attachments = AttachmentStore::open(attachments_root)?;
        Ok(Self { conn, attachments })
    }

    fn require_login(session: &StaffSession) -> Result<(), ServiceError> {
        if session.is_authenticated() {
            Ok(())
        } else {
            Err(ServiceError::Unauthenticated)
        }
    }

    /// Shape-check an identity token. Malformed tokens fail here, before
    /// storage sees them.
    fn parse_id(entity: &'static str, token: &str) -> Result<EntityId, ServiceError> {
        EntityId::parse_str(token).map_err(|_| ServiceError::NotFound {
            entity,
            id: token.to_owned(),
        })
    }

    // ───────────────────────────────────────────────
    // Patients
    // ───────────────────────────────────────────────

    pub fn create_patient(
        &self,
        session: &StaffSession,
        draft: &PatientDraft,
    ) -> Result<Patient, ServiceError> {
        Self::require_login(session)?;
        let patient = repository::insert_patient(&self.conn, draft)?;
        info!(id = %patient.id, "patient registered");
        Ok(patient)
    }

    pub fn get_patient(&self, session: &StaffSession, id: &str) -> Result<Patient, ServiceError> {
        Self::require_login(session)?;
        let id = Self::parse_id("patient", id)?;
        repository::get_patient(&self.conn, &id)?.ok_or_else(|| ServiceError::NotFound {
            entity: "patient",
            id: id.to_string(),
        })
    }

    pub fn update_patient(
        &self,
        session: &StaffSession,
        id: &str,
        draft: &PatientDraft,
    ) -> Result<(), ServiceError> {
        Self::require_login(session)?;
        let id = Self::parse_id("patient", id)?;
        repository::update_patient(&self.conn, &id, draft)?;
        debug!(id = %id, "patient updated");
        Ok(())
    }

    pub fn delete_patient(&self, session: &StaffSession, id: &str) -> Result<(), ServiceError> {
        Self::require_login(session)?;
        let id = Self::parse_id("patient", id)?;
        repository::delete_patient(&self.conn, &id)?;
        info!(id = %id, "patient deleted");
        Ok(())
    }

    pub fn list_patients(
        &self,
        session: &StaffSession,
        page: u32,
    ) -> Result<(Vec<Patient>, PageWindow), ServiceError> {
        Self::require_login(session)?;
        Ok(repository::list_patients(&self.conn, page)?)
    }

    pub fn search_patients(
        &self,
        session: &StaffSession,
        name: &str,
    ) -> Result<Vec<Patient>, ServiceError> {
        Self::require_login(session)?;
        Ok(repository::search_patients(&self.conn, name)?)
    }

    // ───────────────────────────────────────────────
    // Clinical records
    // ───────────────────────────────────────────────

    pub fn create_record(
        &self,
        session: &StaffSession,
        patient_id: &str,
        draft: &ClinicalRecordDraft,
    ) -> Result<ClinicalRecord, ServiceError> {
        Self::require_login(session)?;
        // Shape check only — whether the patient row exists is not verified.
        let patient_id = Self::parse_id("patient", patient_id)?;
        let record = repository::insert_clinical_record(&self.conn, &patient_id, draft)?;
        info!(id = %record.id, patient = %patient_id, "clinical record created");
        Ok(record)
    }

    pub fn get_record(
        &self,
        session: &StaffSession,
        id: &str,
    ) -> Result<ClinicalRecord, ServiceError> {
        Self::require_login(session)?;
        let id = Self::parse_id("clinical record", id)?;
        repository::get_clinical_record(&self.conn, &id)?.ok_or_else(|| ServiceError::NotFound {
            entity: "clinical record",
            id: id.to_string(),
        })
    }

    pub fn update_record(
        &self,
        session: &StaffSession,
        id: &str,
        update: &ClinicalRecordUpdate,
    ) -> Result<(), ServiceError> {
        Self::require_login(session)?;
        let id = Self::parse_id("clinical record", id)?;
        repository::update_clinical_record(&self.conn, &id, update)?;
        debug!(id = %id, "clinical record updated");
        Ok(())
    }

    pub fn delete_record(&self, session: &StaffSession, id: &str) -> Result<(), ServiceError> {
        Self::require_login(session)?;
        let id = Self::parse_id("clinical record", id)?;
        repository::delete_clinical_record(&self.conn, &id)?;
        info!(id = %id, "clinical record deleted");
        Ok(())
    }

    pub fn list_records(
        &self,
        session: &StaffSession,
        patient_id: &str,
        page: u32,
    ) -> Result<(Vec<ClinicalRecord>, PageWindow), ServiceError> {
        Self::require_login(session)?;
        let patient_id = Self::parse_id("patient", patient_id)?;
        Ok(repository::list_clinical_records(
            &self.conn,
            &patient_id,
            page,
        )?)
    }

    // ───────────────────────────────────────────────
    // Attachments
    // ───────────────────────────────────────────────

    pub fn upload_attachments(
        &self,
        session: &StaffSession,
        key: &str,
        files: &[UploadFile],
    ) -> Result<(), ServiceError> {
        Self::require_login(session)?;
        self.attachments.upload(key, files)?;
        info!(key, count = files.len(), "attachments stored");
        Ok(())
    }

    pub fn list_attachments(
        &self,
        session: &StaffSession,
        key: &str,
    ) -> Result<Vec<String>, ServiceError> {
        Self::require_login(session)?;
        self.attachments.list(key).map_err(map_attachment_err)
    }

    pub fn fetch_attachment(
        &self,
        session: &StaffSession,
        key: &str,
        file_name: &str,
    ) -> Result<Attachment, ServiceError> {
        Self::require_login(session)?;
        self.attachments
            .fetch(key, file_name)
            .map_err(map_attachment_err)
    }
}

fn map_attachment_err(err: AttachmentError) -> ServiceError {
    match err {
        AttachmentError::NotFound(what) => ServiceError::NotFound {
            entity: "attachment",
            id: what,
        },
        other => ServiceError::Attachment(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::folder_key;
    use chrono::NaiveDate;

    fn test_service() -> (tempfile::TempDir, ClinicService) {
        let dir = tempfile::tempdir().unwrap();
        let service = ClinicService::open_in_memory(dir.path()).unwrap();
        (dir, service)
    }

    fn staff() -> StaffSession {
        StaffSession::logged_in("staff@clinica.test")
    }

    fn patient_draft(first: &str, last: &str) -> PatientDraft {
        PatientDraft {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            national_id: Some("30123456".into()),
            ..Default::default()
        }
    }

    #[test]
    fn anonymous_sessions_are_turned_away() {
        let (_dir, service) = test_service();
        let anon = StaffSession::anonymous();

        assert!(matches!(
            service.list_patients(&anon, 1),
            Err(ServiceError::Unauthenticated)
        ));
        assert!(matches!(
            service.create_patient(&anon, &patient_draft("Juan", "Perez")),
            Err(ServiceError::Unauthenticated)
        ));
        assert!(matches!(
            service.list_attachments(&anon, "2023-05-13Juan Perez"),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn malformed_id_is_not_found_before_any_query() {
        let (_dir, service) = test_service();
        let result = service.get_patient(&staff(), "not-a-valid-id");
        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "patient", .. })
        ));
    }

    #[test]
    fn well_formed_but_absent_id_is_not_found() {
        let (_dir, service) = test_service();
        let result = service.get_patient(&staff(), EntityId::generate().as_str());
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn patient_round_trip_and_rename() {
        let (_dir, service) = test_service();
        let session = staff();

        let created = service
            .create_patient(&session, &patient_draft("Juan", "Perez"))
            .unwrap();
        assert_eq!(created.full_name, "Juan Perez");

        service
            .update_patient(&session, created.id.as_str(), &patient_draft("Juana", "Paredes"))
            .unwrap();

        let stored = service.get_patient(&session, created.id.as_str()).unwrap();
        assert_eq!(stored.full_name, "Juana Paredes");
    }

    #[test]
    fn deleting_a_patient_keeps_their_records() {
        let (_dir, service) = test_service();
        let session = staff();

        let patient = service
            .create_patient(&session, &patient_draft("Juan", "Perez"))
            .unwrap();
        let record = service
            .create_record(
                &session,
                patient.id.as_str(),
                &ClinicalRecordDraft {
                    visit_date: NaiveDate::from_ymd_opt(2023, 5, 12),
                    full_name: Some(patient.full_name.clone()),
                    national_id: patient.national_id.clone(),
                    reason: Some("checkup".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        service.delete_patient(&session, patient.id.as_str()).unwrap();

        let orphan = service.get_record(&session, record.id.as_str()).unwrap();
        assert_eq!(orphan.patient_id, patient.id);
        assert_eq!(orphan.full_name.as_deref(), Some("Juan Perez"));
    }

    #[test]
    fn record_creation_accepts_unknown_patient_ids() {
        let (_dir, service) = test_service();
        let result = service.create_record(
            &staff(),
            EntityId::generate().as_str(),
            &ClinicalRecordDraft::default(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn attachment_round_trip_through_the_service() {
        let (_dir, service) = test_service();
        let session = staff();
        let key = folder_key("Juan Perez", NaiveDate::from_ymd_opt(2023, 5, 12).unwrap());

        service
            .upload_attachments(
                &session,
                &key,
                &[UploadFile {
                    name: "scan.pdf".into(),
                    bytes: b"%PDF-".to_vec(),
                }],
            )
            .unwrap();

        assert_eq!(service.list_attachments(&session, &key).unwrap(), vec!["scan.pdf"]);

        let fetched = service.fetch_attachment(&session, &key, "scan.pdf").unwrap();
        assert_eq!(fetched.bytes, b"%PDF-");

        let missing = service.fetch_attachment(&session, &key, "missing.pdf");
        assert!(matches!(
            missing,
            Err(ServiceError::NotFound { entity: "attachment", .. })
        ));
    }
}
