//! Session model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::intake::IntakeState;

/// Per-conversation state, keyed by the client-supplied session id.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub intake: IntakeState,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    /// A fresh session that has not been prompted yet.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            intake: IntakeState::default(),
            created_at: now,
            last_seen: now,
        }
    }

    /// Whether the intake dialogue is finished.
    pub fn flow_complete(&self) -> bool {
        self.intake.is_complete()
    }

    /// Record activity on this session.
    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    /// Whether the session has been idle for longer than `max_idle` at `now`.
    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_seen) > max_idle
    }
}
