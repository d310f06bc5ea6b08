use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::config::PAGE_SIZE;
use crate::db::DatabaseError;
use crate::models::{ClinicalRecord, ClinicalRecordDraft, ClinicalRecordUpdate, EntityId};
use crate::pagination::{paginate, PageWindow};

/// Record a visit for `patient_id`. The id is stored by value — whether a
/// patient row with that id exists is never checked.
pub fn insert_clinical_record(
    conn: &Connection,
    patient_id: &EntityId,
    draft: &ClinicalRecordDraft,
) -> Result<ClinicalRecord, DatabaseError> {
    let record = ClinicalRecord {
        id: EntityId::generate(),
        patient_id: patient_id.clone(),
        visit_date: draft.visit_date,
        full_name: draft.full_name.clone(),
        national_id: draft.national_id.clone(),
        reason: draft.reason.clone(),
        current_condition: draft.current_condition.clone(),
        health_history: draft.health_history.clone(),
        comments: draft.comments.clone(),
    };

    conn.execute(
        "INSERT INTO clinical_records (id, patient_id, visit_date, full_name, national_id,
         reason, current_condition, health_history, comments)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id.as_str(),
            record.patient_id.as_str(),
            record.visit_date.map(|d| d.to_string()),
            record.full_name,
            record.national_id,
            record.reason,
            record.current_condition,
            record.health_history,
            record.comments,
        ],
    )?;

    Ok(record)
}

pub fn get_clinical_record(
    conn: &Connection,
    id: &EntityId,
) -> Result<Option<ClinicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, visit_date, full_name, national_id,
         reason, current_condition, health_history, comments
         FROM clinical_records WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.as_str()], map_record_row);

    match result {
        Ok(row) => Ok(Some(record_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite the editable fields. The name and national-id snapshots stay
/// as written at creation. A missing id is a silent no-op.
pub fn update_clinical_record(
    conn: &Connection,
    id: &EntityId,
    update: &ClinicalRecordUpdate,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE clinical_records SET visit_date = ?2, reason = ?3, current_condition = ?4,
         health_history = ?5, comments = ?6
         WHERE id = ?1",
        params![
            id.as_str(),
            update.visit_date.map(|d| d.to_string()),
            update.reason,
            update.current_condition,
            update.health_history,
            update.comments,
        ],
    )?;
    Ok(())
}

/// Remove the record. A missing id is a silent no-op.
pub fn delete_clinical_record(conn: &Connection, id: &EntityId) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM clinical_records WHERE id = ?1",
        params![id.as_str()],
    )?;
    Ok(())
}

pub fn count_clinical_records(
    conn: &Connection,
    patient_id: &EntityId,
) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM clinical_records WHERE patient_id = ?1",
        params![patient_id.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// One page of a patient's visit history, most recent visit first.
pub fn list_clinical_records(
    conn: &Connection,
    patient_id: &EntityId,
    page: u32,
) -> Result<(Vec<ClinicalRecord>, PageWindow), DatabaseError> {
    let total = count_clinical_records(conn, patient_id)?;
    let window = paginate(total, page, PAGE_SIZE);

    let mut stmt = conn.prepare(
        "SELECT id, patient_id, visit_date, full_name, national_id,
         reason, current_condition, health_history, comments
         FROM clinical_records WHERE patient_id = ?1
         ORDER BY visit_date DESC LIMIT ?2 OFFSET ?3",
    )?;

    let rows = stmt.query_map(
        params![
            patient_id.as_str(),
            window.limit as i64,
            window.skip as i64
        ],
        map_record_row,
    )?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row?)?);
    }
    Ok((records, window))
}

// Internal row type for ClinicalRecord mapping
struct RecordRow {
    id: String,
    patient_id: String,
    visit_date: Option<String>,
    full_name: Option<String>,
    national_id: Option<String>,
    reason: Option<String>,
    current_condition: Option<String>,
    health_history: Option<String>,
    comments: Option<String>,
}

fn map_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        visit_date: row.get(2)?,
        full_name: row.get(3)?,
        national_id: row.get(4)?,
        reason: row.get(5)?,
        current_condition: row.get(6)?,
        health_history: row.get(7)?,
        comments: row.get(8)?,
    })
}

fn record_from_row(row: RecordRow) -> Result<ClinicalRecord, DatabaseError> {
    Ok(ClinicalRecord {
        id: EntityId::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_id: EntityId::parse_str(&row.patient_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        visit_date: row
            .visit_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        full_name: row.full_name,
        national_id: row.national_id,
        reason: row.reason,
        current_condition: row.current_condition,
        health_history: row.health_history,
        comments: row.comments,
    })
}
