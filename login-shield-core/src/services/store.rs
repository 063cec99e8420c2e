//! Merged view over the durable attempt log and its session mirror.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    repositories::AttemptRepository,
    session::{self, SessionHandle},
    storage::{AttemptKey, ClientIdentity, LoginAttempt, RecordedAttempt},
};

/// Record and retrieve failed login attempts for a client identity.
///
/// Writes go to the durable log and are mirrored into the session for
/// low-latency re-reads within the same request lifecycle. Reads merge
/// both halves and de-duplicate by `(identity, timestamp, reason)`; the
/// mirror only ever adds events the durable half does not have, so no
/// cache invalidation is needed.
pub struct AttemptStore<R: AttemptRepository> {
    repository: Arc<R>,
}

impl<R: AttemptRepository> AttemptStore<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Append a new attempt. Always succeeds unless the durable backend is
    /// unreachable; `reason` content is not validated. Mirror entries older
    /// than `keep_since` are pruned while appending, keeping the session
    /// half bounded by the window.
    pub async fn record(
        &self,
        session: &dyn SessionHandle,
        identity: &ClientIdentity,
        reason: &str,
        keep_since: DateTime<Utc>,
    ) -> Result<LoginAttempt, Error> {
        let attempt = self.repository.record_attempt(identity, reason).await?;
        session::mirror_attempt(
            session,
            RecordedAttempt::from(&attempt),
            keep_since.timestamp(),
        );
        Ok(attempt)
    }

    /// Number of attempts for the identity with `attempted_at >= cutoff`,
    /// merged across both halves. Read-only and idempotent.
    pub async fn count_since(
        &self,
        session: &dyn SessionHandle,
        identity: &ClientIdentity,
        cutoff: DateTime<Utc>,
    ) -> Result<u32, Error> {
        let durable = self.repository.attempts_since(identity, cutoff).await?;

        // Every durable row is a distinct event; de-duplication only applies
        // to mirror entries that shadow a durable write.
        let mut count = durable.len() as u32;
        let mut seen: HashSet<AttemptKey> = durable.iter().map(LoginAttempt::dedup_key).collect();

        let cutoff_ts = cutoff.timestamp();
        for mirrored in session::mirrored_attempts(session) {
            if mirrored.attempted_at < cutoff_ts
                || !identity.matches(
                    mirrored.session_id.as_deref(),
                    mirrored.ip_address.as_deref(),
                )
            {
                continue;
            }
            if seen.insert(mirrored.dedup_key()) {
                count += 1;
            }
        }

        Ok(count)
    }
}
