//! Session store: creation, lookup and report persistence for
//! consultation sessions.
//!
//! One SQLite connection behind a mutex. `update_report` writes report and
//! transcript in a single statement inside a transaction, so concurrent
//! writers on the same session resolve to last-write-wins on the pair.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{SubsecRound, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::error::ConsultError;
use crate::identity::OwnerIdentity;
use crate::models::{ConsultationSession, MedicalReport, SpecialistProfile, TranscriptEntry};

pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(db::open_database(path)?),
        })
    }

    /// In-memory store, used by tests and ephemeral runs.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(db::open_memory_database()?),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ConsultError> {
        self.conn
            .lock()
            .map_err(|_| ConsultError::Storage("session store lock poisoned".into()))
    }

    /// Create a consultation bound to exactly one specialist.
    ///
    /// The specialist is snapshotted into the row. Fails with
    /// `Unauthenticated` for a blank owner and `ValidationFailed` when notes
    /// or specialist are missing; nothing is written in either case.
    pub fn create_session(
        &self,
        owner: &str,
        notes: &str,
        specialist: Option<&SpecialistProfile>,
    ) -> Result<ConsultationSession, ConsultError> {
        let owner = OwnerIdentity::resolve(Some(owner))?;
        if notes.trim().is_empty() {
            return Err(ConsultError::ValidationFailed("intake notes are required".into()));
        }
        let specialist = specialist.ok_or_else(|| {
            ConsultError::ValidationFailed("a specialist must be selected".into())
        })?;

        self.insert_new(&owner, notes.trim(), specialist.clone())
    }

    /// Repeat consultation with the same specialist as an earlier session.
    /// Intake notes may be empty here.
    pub fn create_follow_up_session(
        &self,
        owner: &str,
        previous_session_id: &str,
        notes: &str,
    ) -> Result<ConsultationSession, ConsultError> {
        let previous = self.get_session(owner, previous_session_id)?;
        let owner = OwnerIdentity::resolve(Some(owner))?;
        self.insert_new(&owner, notes.trim(), previous.selected_specialist)
    }

    fn insert_new(
        &self,
        owner: &OwnerIdentity,
        notes: &str,
        specialist: SpecialistProfile,
    ) -> Result<ConsultationSession, ConsultError> {
        let session = ConsultationSession {
            session_id: Uuid::new_v4().to_string(),
            owner_identity: owner.as_str().to_string(),
            intake_notes: notes.to_string(),
            selected_specialist: specialist,
            transcript: Vec::new(),
            report: None,
            // Stored with microsecond precision; truncate so the returned
            // record equals what a later read yields.
            created_on: Utc::now().trunc_subsecs(6),
        };

        let conn = self.lock()?;
        db::insert_session(&conn, &session)?;

        tracing::info!(
            session_id = %session.session_id,
            specialist_id = session.selected_specialist.id,
            "Consultation session created"
        );
        Ok(session)
    }

    /// Fetch one of the owner's sessions.
    pub fn get_session(&self, owner: &str, session_id: &str) -> Result<ConsultationSession, ConsultError> {
        let owner = OwnerIdentity::resolve(Some(owner))?;
        let conn = self.lock()?;
        db::get_session_for_owner(&conn, owner.as_str(), session_id)?
            .ok_or_else(|| ConsultError::NotFound(format!("session {session_id}")))
    }

    /// The owner's consultation history, most recent first.
    pub fn list_sessions(&self, owner: &str) -> Result<Vec<ConsultationSession>, ConsultError> {
        let owner = OwnerIdentity::resolve(Some(owner))?;
        let conn = self.lock()?;
        Ok(db::list_sessions_by_owner(&conn, owner.as_str())?)
    }

    /// Atomically overwrite report and transcript together.
    pub fn update_report(
        &self,
        owner: &str,
        session_id: &str,
        report: &MedicalReport,
        transcript: &[TranscriptEntry],
    ) -> Result<(), ConsultError> {
        let owner = OwnerIdentity::resolve(Some(owner))?;
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(DatabaseError::from)?;

        let updated = db::update_session_report(&tx, owner.as_str(), session_id, report, transcript)?;
        if updated == 0 {
            // Dropping `tx` rolls back.
            return Err(ConsultError::NotFound(format!("session {session_id}")));
        }
        tx.commit().map_err(DatabaseError::from)?;

        tracing::info!(
            session_id = %session_id,
            transcript_entries = transcript.len(),
            severity = %report.severity,
            "Report persisted"
        );
        Ok(())
    }
}
