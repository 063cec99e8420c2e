//! Data types shared between the durable attempt log and its session mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// De-duplication key for an attempt: identity components, unix-second
/// timestamp, and reason. Events carrying the same key are the same event.
pub type AttemptKey = (Option<String>, Option<String>, i64, String);

/// A single failed login event.
///
/// Rows are append-only: never edited, never deleted. Attempts older than
/// the configured window simply stop matching window queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: i64,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    /// Free-form annotation, may be empty. Informational only: it takes
    /// part in de-duplication but never in counting logic.
    pub reason: String,
    /// Creation time at second precision, used only for windowing.
    pub attempted_at: DateTime<Utc>,
}

impl LoginAttempt {
    pub fn dedup_key(&self) -> AttemptKey {
        (
            self.session_id.clone(),
            self.ip_address.clone(),
            self.attempted_at.timestamp(),
            self.reason.clone(),
        )
    }
}

/// The (session id, source IP) pair used as the attempt-counting key.
///
/// Both components are kept because either alone is spoofable or volatile:
/// sessions can be dropped by the client and IPs can be shared behind NAT.
/// Counting unions records keyed by either matching component, so a dropped
/// session does not reset the counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIdentity {
    pub session_id: Option<SessionId>,
    pub ip_address: Option<String>,
}

impl ClientIdentity {
    pub fn new(session_id: Option<SessionId>, ip_address: Option<String>) -> Self {
        Self {
            session_id,
            ip_address,
        }
    }

    /// An identity with neither component can never match an attempt.
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.ip_address.is_none()
    }

    /// Union matching: true if either the session id or the IP address
    /// matches. Absent components on either side never match.
    pub fn matches(&self, session_id: Option<&str>, ip_address: Option<&str>) -> bool {
        let session_hit = match (self.session_id.as_ref(), session_id) {
            (Some(ours), Some(theirs)) => ours.as_str() == theirs,
            _ => false,
        };
        let ip_hit = match (self.ip_address.as_deref(), ip_address) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        };
        session_hit || ip_hit
    }

    pub fn matches_attempt(&self, attempt: &LoginAttempt) -> bool {
        self.matches(attempt.session_id.as_deref(), attempt.ip_address.as_deref())
    }
}

/// Entry in the session-side attempt mirror.
///
/// Timestamps are unix seconds so the de-duplication key stays stable
/// across the durable and ephemeral halves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAttempt {
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub reason: String,
    pub attempted_at: i64,
}

impl RecordedAttempt {
    pub fn dedup_key(&self) -> AttemptKey {
        (
            self.session_id.clone(),
            self.ip_address.clone(),
            self.attempted_at,
            self.reason.clone(),
        )
    }
}

impl From<&LoginAttempt> for RecordedAttempt {
    fn from(attempt: &LoginAttempt) -> Self {
        Self {
            session_id: attempt.session_id.clone(),
            ip_address: attempt.ip_address.clone(),
            reason: attempt.reason.clone(),
            attempted_at: attempt.attempted_at.timestamp(),
        }
    }
}
