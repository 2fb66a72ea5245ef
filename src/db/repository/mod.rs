//! Repository layer - entity-scoped database operations.

mod session;

pub use session::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;
    use crate::specialists;
    use chrono::{Duration, TimeZone, Utc};
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_session(id: &str, owner: &str, minutes: i64) -> ConsultationSession {
        ConsultationSession {
            session_id: id.into(),
            owner_identity: owner.into(),
            intake_notes: "Headache for two days".into(),
            selected_specialist: specialists::first().clone(),
            transcript: vec![],
            report: None,
            created_on: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn make_report(session_id: &str) -> MedicalReport {
        MedicalReport {
            session_id_ref: session_id.into(),
            agent_label: "General Physician AI".into(),
            patient_label: ANONYMOUS_PATIENT.into(),
            generated_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            chief_complaint: "Cough".into(),
            summary: "Patient has a cough.".into(),
            symptoms: vec!["cough".into()],
            duration_description: "3 days".into(),
            severity: Severity::Mild,
            medications_mentioned: vec![],
            recommendations: vec!["Hydrate".into(), "Rest".into(), "Monitor fever".into()],
        }
    }

    #[test]
    fn insert_and_get_session() {
        let conn = test_db();
        let session = make_session("s-1", "ana@example.com", 0);
        insert_session(&conn, &session).unwrap();

        let loaded = get_session_for_owner(&conn, "ana@example.com", "s-1").unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn get_missing_session_returns_none() {
        let conn = test_db();
        assert!(get_session_for_owner(&conn, "ana@example.com", "nope").unwrap().is_none());
    }

    #[test]
    fn owner_scoped_get_hides_other_owners() {
        let conn = test_db();
        insert_session(&conn, &make_session("s-1", "ana@example.com", 0)).unwrap();

        assert!(get_session_for_owner(&conn, "ana@example.com", "s-1").unwrap().is_some());
        assert!(get_session_for_owner(&conn, "bob@example.com", "s-1").unwrap().is_none());
    }

    #[test]
    fn duplicate_session_id_rejected() {
        let conn = test_db();
        insert_session(&conn, &make_session("s-1", "ana@example.com", 0)).unwrap();
        let err = insert_session(&conn, &make_session("s-1", "ana@example.com", 1));
        assert!(matches!(err, Err(DatabaseError::Sqlite(_))));
    }

    #[test]
    fn list_orders_most_recent_first() {
        let conn = test_db();
        insert_session(&conn, &make_session("t1", "ana@example.com", 0)).unwrap();
        insert_session(&conn, &make_session("t3", "ana@example.com", 20)).unwrap();
        insert_session(&conn, &make_session("t2", "ana@example.com", 10)).unwrap();
        insert_session(&conn, &make_session("other", "bob@example.com", 30)).unwrap();

        let ids: Vec<String> = list_sessions_by_owner(&conn, "ana@example.com")
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids, vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn list_breaks_timestamp_ties_by_insertion() {
        let conn = test_db();
        insert_session(&conn, &make_session("first", "ana@example.com", 5)).unwrap();
        insert_session(&conn, &make_session("second", "ana@example.com", 5)).unwrap();

        let ids: Vec<String> = list_sessions_by_owner(&conn, "ana@example.com")
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn update_report_writes_both_columns() {
        let conn = test_db();
        insert_session(&conn, &make_session("s-1", "ana@example.com", 0)).unwrap();
        let transcript = vec![
            TranscriptEntry::user("I have a cough for 3 days"),
            TranscriptEntry::assistant("Noted"),
        ];

        let n = update_session_report(&conn, "ana@example.com", "s-1", &make_report("s-1"), &transcript)
            .unwrap();
        assert_eq!(n, 1);

        let loaded = get_session_for_owner(&conn, "ana@example.com", "s-1").unwrap().unwrap();
        assert_eq!(loaded.report, Some(make_report("s-1")));
        assert_eq!(loaded.transcript, transcript);
    }

    #[test]
    fn update_report_for_unknown_session_touches_nothing() {
        let conn = test_db();
        let n = update_session_report(&conn, "ana@example.com", "missing", &make_report("missing"), &[])
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = format_timestamp(&Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(a, "2024-01-02T03:04:05.000000Z");
    }
}
