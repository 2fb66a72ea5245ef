use std::collections::HashSet;
use std::sync::Mutex;

/// Sessions with a report generation currently running.
#[derive(Default)]
pub struct InFlightSessions {
    active: Mutex<HashSet<String>>,
}

impl InFlightSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the session without blocking. `None` when another generation
    /// holds it (or the set is poisoned).
    pub fn try_claim(&self, session_id: &str) -> Option<InFlightGuard<'_>> {
        let mut active = self.active.lock().ok()?;
        if !active.insert(session_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            owner: self,
            session_id: session_id.to_string(),
        })
    }

    pub fn is_in_flight(&self, session_id: &str) -> bool {
        self.active
            .lock()
            .map(|a| a.contains(session_id))
            .unwrap_or(false)
    }

    fn release(&self, session_id: &str) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(session_id);
        }
    }
}

/// RAII claim on one session. Dropping it releases the session, including
/// on early return and on task abort.
pub struct InFlightGuard<'a> {
    owner: &'a InFlightSessions,
    session_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.release(&self.session_id);
    }
}
