//! In-memory doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    Error, StorageError,
    repositories::AttemptRepository,
    session::{SessionHandle, SessionId},
    storage::{ClientIdentity, LoginAttempt},
};

/// Attempt repository backed by a `Vec`, with a failure toggle for
/// exercising the unavailable path.
pub(crate) struct MockAttemptRepository {
    pub attempts: Mutex<Vec<LoginAttempt>>,
    pub fail: AtomicBool,
    next_id: AtomicI64,
}

impl MockAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Insert an attempt with an explicit timestamp, for window tests.
    pub fn seed(
        &self,
        session_id: Option<&str>,
        ip_address: Option<&str>,
        reason: &str,
        attempted_at: DateTime<Utc>,
    ) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.attempts.lock().unwrap().push(LoginAttempt {
            id,
            session_id: session_id.map(str::to_string),
            ip_address: ip_address.map(str::to_string),
            reason: reason.to_string(),
            attempted_at: truncate_to_seconds(attempted_at),
        });
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("attempt backend offline".to_string()).into());
        }
        Ok(())
    }
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap()
}

#[async_trait]
impl AttemptRepository for MockAttemptRepository {
    async fn record_attempt(
        &self,
        identity: &ClientIdentity,
        reason: &str,
    ) -> Result<LoginAttempt, Error> {
        self.check_available()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let attempt = LoginAttempt {
            id,
            session_id: identity.session_id.as_ref().map(|s| s.as_str().to_string()),
            ip_address: identity.ip_address.clone(),
            reason: reason.to_string(),
            attempted_at: truncate_to_seconds(Utc::now()),
        };
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(attempt)
    }

    async fn attempts_since(
        &self,
        identity: &ClientIdentity,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, Error> {
        self.check_available()?;

        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.attempted_at >= since && identity.matches_attempt(a))
            .cloned()
            .collect())
    }
}

/// Session handle backed by a `HashMap`.
pub(crate) struct MemorySession {
    id: Option<SessionId>,
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(SessionId::new(id)),
            values: Mutex::new(HashMap::new()),
        }
    }

    /// A session that has not been established yet.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl SessionHandle for MemorySession {
    fn id(&self) -> Option<SessionId> {
        self.id.clone()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }
}
