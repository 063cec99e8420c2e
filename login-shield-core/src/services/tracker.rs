//! Windowed attempt counting over the merging store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    Error, repositories::AttemptRepository, services::AttemptStore, session::SessionHandle,
    storage::ClientIdentity,
};

/// Turns raw attempts into the decision input the gate needs: the number
/// of attempts for a client identity within the trailing window.
pub struct AttemptTracker<R: AttemptRepository> {
    store: AttemptStore<R>,
    window: Duration,
}

impl<R: AttemptRepository> AttemptTracker<R> {
    pub fn new(repository: Arc<R>, window: Duration) -> Self {
        Self {
            store: AttemptStore::new(repository),
            window,
        }
    }

    /// Count of attempts for the identity within the trailing window.
    pub async fn attempt_count(
        &self,
        session: &dyn SessionHandle,
        identity: &ClientIdentity,
    ) -> Result<u32, Error> {
        let cutoff = Utc::now() - self.window;
        self.store.count_since(session, identity, cutoff).await
    }

    /// Record a new attempt, then return the refreshed count.
    ///
    /// The escalation decision between redirect and hard block needs the
    /// post-increment count, so the recount is part of the operation.
    pub async fn add_attempt(
        &self,
        session: &dyn SessionHandle,
        identity: &ClientIdentity,
        reason: &str,
    ) -> Result<u32, Error> {
        let keep_since = Utc::now() - self.window;
        self.store.record(session, identity, reason, keep_since).await?;
        self.attempt_count(session, identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use crate::test_support::{MemorySession, MockAttemptRepository};

    fn identity() -> ClientIdentity {
        ClientIdentity::new(Some(SessionId::new("sess-1")), Some("10.0.0.1".to_string()))
    }

    #[tokio::test]
    async fn test_add_attempt_returns_post_increment_count() {
        let repo = Arc::new(MockAttemptRepository::new());
        let tracker = AttemptTracker::new(repo, Duration::minutes(15));
        let session = MemorySession::new("sess-1");

        assert_eq!(tracker.attempt_count(&session, &identity()).await.unwrap(), 0);
        assert_eq!(tracker.add_attempt(&session, &identity(), "").await.unwrap(), 1);
        assert_eq!(tracker.add_attempt(&session, &identity(), "").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_attempts_outside_window_stop_counting() {
        let repo = Arc::new(MockAttemptRepository::new());
        // Two stale attempts, never deleted, outside the 15 minute window.
        repo.seed(
            Some("sess-1"),
            Some("10.0.0.1"),
            "",
            Utc::now() - Duration::minutes(20),
        );
        repo.seed(
            Some("sess-1"),
            Some("10.0.0.1"),
            "",
            Utc::now() - Duration::hours(2),
        );
        // One recent attempt.
        repo.seed(Some("sess-1"), Some("10.0.0.1"), "", Utc::now());

        let tracker = AttemptTracker::new(repo.clone(), Duration::minutes(15));
        let session = MemorySession::new("sess-1");

        assert_eq!(tracker.attempt_count(&session, &identity()).await.unwrap(), 1);
        // The stale rows are still in the log.
        assert_eq!(repo.attempts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_count_survives_session_loss_via_ip() {
        let repo = Arc::new(MockAttemptRepository::new());
        repo.seed(Some("old-sess"), Some("10.0.0.1"), "", Utc::now());
        repo.seed(Some("old-sess"), Some("10.0.0.1"), "", Utc::now());

        let tracker = AttemptTracker::new(repo, Duration::minutes(15));
        // Fresh session, same IP: the durable log still counts.
        let session = MemorySession::new("new-sess");
        let identity =
            ClientIdentity::new(Some(SessionId::new("new-sess")), Some("10.0.0.1".to_string()));

        assert_eq!(tracker.attempt_count(&session, &identity).await.unwrap(), 2);
    }
}
