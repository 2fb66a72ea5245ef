use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

/// Fixed-width UTC timestamp so lexical order in SQLite equals chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const SESSION_COLUMNS: &str =
    "session_id, created_by, notes, selected_specialist, conversation, report, created_on";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn insert_session(conn: &Connection, session: &ConsultationSession) -> Result<(), DatabaseError> {
    let report = session
        .report
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO consultation_sessions
         (session_id, created_by, notes, selected_specialist, conversation, report, created_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            session.session_id,
            session.owner_identity,
            session.intake_notes,
            serde_json::to_string(&session.selected_specialist)?,
            serde_json::to_string(&session.transcript)?,
            report,
            format_timestamp(&session.created_on),
        ],
    )?;
    Ok(())
}

/// Fetch a session by id, only if it belongs to `owner`.
pub fn get_session_for_owner(
    conn: &Connection,
    owner: &str,
    session_id: &str,
) -> Result<Option<ConsultationSession>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM consultation_sessions
                 WHERE session_id = ?1 AND created_by = ?2"
            ),
            params![session_id, owner],
            read_row,
        )
        .optional()?;
    row.map(session_from_row).transpose()
}

/// All sessions of an owner, most recent first. Ties on `created_on` fall back
/// to insertion order (later insert first).
pub fn list_sessions_by_owner(conn: &Connection, owner: &str) -> Result<Vec<ConsultationSession>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM consultation_sessions
         WHERE created_by = ?1
         ORDER BY created_on DESC, id DESC"
    ))?;

    let rows = stmt.query_map(params![owner], read_row)?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(session_from_row(row?)?);
    }
    Ok(sessions)
}

/// Overwrite report and conversation together in one statement.
/// Returns the number of rows touched (0 when the session does not exist for this owner).
pub fn update_session_report(
    conn: &Connection,
    owner: &str,
    session_id: &str,
    report: &MedicalReport,
    transcript: &[TranscriptEntry],
) -> Result<usize, DatabaseError> {
    let report_json = serde_json::to_string(report)?;
    let transcript_json = serde_json::to_string(transcript)?;

    let updated = conn.execute(
        "UPDATE consultation_sessions SET report = ?1, conversation = ?2
         WHERE session_id = ?3 AND created_by = ?4",
        params![report_json, transcript_json, session_id, owner],
    )?;
    Ok(updated)
}

struct SessionRow {
    session_id: String,
    created_by: String,
    notes: String,
    selected_specialist: String,
    conversation: String,
    report: Option<String>,
    created_on: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        session_id: row.get(0)?,
        created_by: row.get(1)?,
        notes: row.get(2)?,
        selected_specialist: row.get(3)?,
        conversation: row.get(4)?,
        report: row.get(5)?,
        created_on: row.get(6)?,
    })
}

fn session_from_row(row: SessionRow) -> Result<ConsultationSession, DatabaseError> {
    let created_on = DateTime::parse_from_rfc3339(&row.created_on)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("created_on: {e}")))?
        .with_timezone(&Utc);

    Ok(ConsultationSession {
        session_id: row.session_id,
        owner_identity: row.created_by,
        intake_notes: row.notes,
        selected_specialist: serde_json::from_str(&row.selected_specialist)?,
        transcript: serde_json::from_str(&row.conversation)?,
        report: row
            .report
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?,
        created_on,
    })
}
