//! The ephemeral half of the attempt store: a key-value view of the
//! framework session attached to the current request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::RecordedAttempt;

/// Session key holding the mirrored attempt log.
pub const ATTEMPTS_KEY: &str = "login_shield.attempts";

/// Session key holding the last non-ignored page, used to bounce a user
/// back after a successful login.
pub const REFERER_KEY: &str = "referer";

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contract the surrounding framework's session must satisfy.
///
/// Implementations need interior mutability: handles are shared across the
/// request pipeline, so `set` takes `&self`.
pub trait SessionHandle: Send + Sync {
    /// Identifier of the session, if one is established.
    fn id(&self) -> Option<SessionId>;

    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);
}

/// Read the mirrored attempt log out of the session.
///
/// A malformed payload is discarded with a warning rather than failing the
/// request: the mirror is a cache, the durable log stays authoritative.
pub fn mirrored_attempts(session: &dyn SessionHandle) -> Vec<RecordedAttempt> {
    let Some(value) = session.get(ATTEMPTS_KEY) else {
        return Vec::new();
    };

    match serde_json::from_value(value) {
        Ok(attempts) => attempts,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed session attempt mirror");
            Vec::new()
        }
    }
}

/// Append one attempt to the session mirror, dropping entries with
/// `attempted_at < keep_since` on the way. The mirror is a cache of the
/// durable log, not a log itself, so expired entries need not be kept.
pub fn mirror_attempt(session: &dyn SessionHandle, attempt: RecordedAttempt, keep_since: i64) {
    let mut attempts = mirrored_attempts(session);
    attempts.retain(|a| a.attempted_at >= keep_since);
    attempts.push(attempt);

    match serde_json::to_value(&attempts) {
        Ok(value) => session.set(ATTEMPTS_KEY, value),
        Err(e) => tracing::warn!(error = %e, "Failed to mirror attempt into session"),
    }
}
