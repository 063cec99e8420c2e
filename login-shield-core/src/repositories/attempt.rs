//! Repository trait for the durable failed-login-attempt log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    storage::{ClientIdentity, LoginAttempt},
};

/// Durable, append-only log of failed login attempts.
///
/// Implementations must survive process and session loss. Rows are never
/// edited or deleted; expiry is enforced at read time through the `since`
/// cutoff, so no pruning job is required.
///
/// Backend failures must surface as [`Error::TrackerUnavailable`], never as
/// an empty result: callers apply their own fail-open or fail-closed policy
/// and the store must not make that choice for them.
#[async_trait]
pub trait AttemptRepository: Send + Sync + 'static {
    /// Append one failed login attempt with the current timestamp.
    ///
    /// `reason` is stored verbatim and may be empty; no validation is
    /// performed on its content.
    async fn record_attempt(
        &self,
        identity: &ClientIdentity,
        reason: &str,
    ) -> Result<LoginAttempt, Error>;

    /// Fetch attempts with `attempted_at >= since` matching either identity
    /// component (same session id or same source IP). Read-only.
    async fn attempts_since(
        &self,
        identity: &ClientIdentity,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, Error>;
}
