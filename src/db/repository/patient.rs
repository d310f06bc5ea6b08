use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::config::PAGE_SIZE;
use crate::db::DatabaseError;
use crate::models::{EntityId, Patient, PatientDraft};
use crate::pagination::{paginate, PageWindow};

pub fn insert_patient(conn: &Connection, draft: &PatientDraft) -> Result<Patient, DatabaseError> {
    let patient = Patient {
        id: EntityId::generate(),
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        full_name: draft.full_name(),
        national_id: draft.national_id.clone(),
        birth_date: draft.birth_date,
        address: draft.address.clone(),
        locality: draft.locality.clone(),
        email: draft.email.clone(),
        phone_1: draft.phone_1.clone(),
        phone_2: draft.phone_2.clone(),
        insurance_provider: draft.insurance_provider.clone(),
        insurance_member_id: draft.insurance_member_id.clone(),
    };

    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, full_name, national_id, birth_date,
         address, locality, email, phone_1, phone_2, insurance_provider, insurance_member_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            patient.id.as_str(),
            patient.first_name,
            patient.last_name,
            patient.full_name,
            patient.national_id,
            patient.birth_date.map(|d| d.to_string()),
            patient.address,
            patient.locality,
            patient.email,
            patient.phone_1,
            patient.phone_2,
            patient.insurance_provider,
            patient.insurance_member_id,
        ],
    )?;

    Ok(patient)
}

pub fn get_patient(conn: &Connection, id: &EntityId) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, full_name, national_id, birth_date,
         address, locality, email, phone_1, phone_2, insurance_provider, insurance_member_id
         FROM patients WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.as_str()], map_patient_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite every listed field, recomputing the full name from the
/// submitted first/last name. A missing id is a silent no-op, not an error.
pub fn update_patient(
    conn: &Connection,
    id: &EntityId,
    draft: &PatientDraft,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE patients SET first_name = ?2, last_name = ?3, full_name = ?4, national_id = ?5,
         birth_date = ?6, address = ?7, locality = ?8, email = ?9, phone_1 = ?10, phone_2 = ?11,
         insurance_provider = ?12, insurance_member_id = ?13
         WHERE id = ?1",
        params![
            id.as_str(),
            draft.first_name,
            draft.last_name,
            draft.full_name(),
            draft.national_id,
            draft.birth_date.map(|d| d.to_string()),
            draft.address,
            draft.locality,
            draft.email,
            draft.phone_1,
            draft.phone_2,
            draft.insurance_provider,
            draft.insurance_member_id,
        ],
    )?;
    Ok(())
}

/// Remove the patient row. A missing id is a silent no-op; associated
/// clinical records are left untouched.
pub fn delete_patient(conn: &Connection, id: &EntityId) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM patients WHERE id = ?1", params![id.as_str()])?;
    Ok(())
}

pub fn count_patients(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// One page of patients ordered by last name, plus the pager window.
pub fn list_patients(
    conn: &Connection,
    page: u32,
) -> Result<(Vec<Patient>, PageWindow), DatabaseError> {
    let total = count_patients(conn)?;
    let window = paginate(total, page, PAGE_SIZE);

    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, full_name, national_id, birth_date,
         address, locality, email, phone_1, phone_2, insurance_provider, insurance_member_id
         FROM patients ORDER BY last_name ASC LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt.query_map(
        params![window.limit as i64, window.skip as i64],
        map_patient_row,
    )?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok((patients, window))
}

/// Substring match on the stored full name. `instr` keeps the match
/// case-sensitive (SQLite `LIKE` is not); results are unordered and
/// unpaginated.
pub fn search_patients(conn: &Connection, needle: &str) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, full_name, national_id, birth_date,
         address, locality, email, phone_1, phone_2, insurance_provider, insurance_member_id
         FROM patients WHERE instr(full_name, ?1) > 0",
    )?;

    let rows = stmt.query_map(params![needle], map_patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

// Internal row type for Patient mapping
struct PatientRow {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    full_name: String,
    national_id: Option<String>,
    birth_date: Option<String>,
    address: Option<String>,
    locality: Option<String>,
    email: Option<String>,
    phone_1: Option<String>,
    phone_2: Option<String>,
    insurance_provider: Option<String>,
    insurance_member_id: Option<String>,
}

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        full_name: row.get(3)?,
        national_id: row.get(4)?,
        birth_date: row.get(5)?,
        address: row.get(6)?,
        locality: row.get(7)?,
        email: row.get(8)?,
        phone_1: row.get(9)?,
        phone_2: row.get(10)?,
        insurance_provider: row.get(11)?,
        insurance_member_id: row.get(12)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: EntityId::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        first_name: row.first_name,
        last_name: row.last_name,
        full_name: row.full_name,
        national_id: row.national_id,
        birth_date: row
            .birth_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        address: row.address,
        locality: row.locality,
        email: row.email,
        phone_1: row.phone_1,
        phone_2: row.phone_2,
        insurance_provider: row.insurance_provider,
        insurance_member_id: row.insurance_member_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn draft(first: &str, last: &str) -> PatientDraft {
        PatientDraft {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            national_id: Some("30123456".into()),
            birth_date: NaiveDate::from_ymd_opt(1985, 6, 14),
            locality: Some("Rosario".into()),
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_retrieve() {
        let conn = test_db();
        let created = insert_patient(&conn, &draft("Juan", "Perez")).unwrap();

        let stored = get_patient(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored.full_name, "Juan Perez");
        assert_eq!(stored.national_id.as_deref(), Some("30123456"));
        assert_eq!(stored.birth_date, NaiveDate::from_ymd_opt(1985, 6, 14));
    }

    #[test]
    fn partial_draft_is_stored_as_is() {
        let conn = test_db();
        let created = insert_patient(&conn, &PatientDraft::default()).unwrap();

        let stored = get_patient(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored.first_name, None);
        assert_eq!(stored.full_name, " ");
    }

    #[test]
    fn duplicate_national_id_is_accepted() {
        let conn = test_db();
        insert_patient(&conn, &draft("Juan", "Perez")).unwrap();
        let second = insert_patient(&conn, &draft("Ana", "Gomez"));
        assert!(second.is_ok());
    }

    #[test]
    fn update_recomputes_full_name() {
        let conn = test_db();
        let created = insert_patient(&conn, &draft("Juan", "Perez")).unwrap();

        update_patient(&conn, &created.id, &draft("Juana", "Paredes")).unwrap();
        let stored = get_patient(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored.full_name, "Juana Paredes");

        // Re-applying the same edit leaves the name unchanged
        update_patient(&conn, &created.id, &draft("Juana", "Paredes")).unwrap();
        let stored = get_patient(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored.full_name, "Juana Paredes");
    }

    #[test]
    fn update_of_missing_id_is_a_no_op() {
        let conn = test_db();
        let ghost = EntityId::generate();
        assert!(update_patient(&conn, &ghost, &draft("Juan", "Perez")).is_ok());
        assert_eq!(count_patients(&conn).unwrap(), 0);
    }

    #[test]
    fn delete_of_missing_id_is_a_no_op() {
        let conn = test_db();
        assert!(delete_patient(&conn, &EntityId::generate()).is_ok());
    }

    #[test]
    fn listing_windows_by_last_name() {
        let conn = test_db();
        for i in 0..45 {
            insert_patient(&conn, &draft("Pat", &format!("L{i:02}"))).unwrap();
        }

        let (items, window) = list_patients(&conn, 2).unwrap();
        assert_eq!(items.len(), 20);
        // Items 21..=40 of the ordered set
        assert_eq!(items[0].last_name.as_deref(), Some("L20"));
        assert_eq!(items[19].last_name.as_deref(), Some("L39"));
        assert_eq!(window.page_count, Some(3));
        assert_eq!(window.page_index_list, vec![1, 2, 3]);
    }

    #[test]
    fn single_page_listing_has_no_pager() {
        let conn = test_db();
        for i in 0..5 {
            insert_patient(&conn, &draft("Pat", &format!("L{i}"))).unwrap();
        }

        let (items, window) = list_patients(&conn, 1).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(window.page_count, None);
        assert!(window.page_index_list.is_empty());
    }

    #[test]
    fn search_matches_substring_case_sensitively() {
        let conn = test_db();
        insert_patient(&conn, &draft("Juan", "Perez")).unwrap();
        insert_patient(&conn, &draft("Ana", "Gomez")).unwrap();

        let hits = search_patients(&conn, "Perez").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_name, "Juan Perez");

        assert_eq!(search_patients(&conn, "an Pe").unwrap().len(), 1);
        assert!(search_patients(&conn, "perez").unwrap().is_empty());
        assert!(search_patients(&conn, "Lopez").unwrap().is_empty());
    }
}
