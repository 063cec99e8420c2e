//! SQLite implementation of the durable attempt log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use login_shield_core::{
    Error, StorageError,
    repositories::AttemptRepository,
    storage::{ClientIdentity, LoginAttempt},
};
use sqlx::SqlitePool;

/// Run the embedded schema migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to migrate login_attempts schema");
        StorageError::Migration(e.to_string())
    })?;
    Ok(())
}

/// SQLite repository for the failed login attempt log.
pub struct SqliteAttemptRepository {
    pool: SqlitePool,
}

impl SqliteAttemptRepository {
    /// Create a new SQLite attempt repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    id: i64,
    session_id: Option<String>,
    ip_address: Option<String>,
    reason: String,
    attempted_at: i64,
}

impl From<SqliteLoginAttempt> for LoginAttempt {
    fn from(row: SqliteLoginAttempt) -> Self {
        LoginAttempt {
            id: row.id,
            session_id: row.session_id,
            ip_address: row.ip_address,
            reason: row.reason,
            attempted_at: DateTime::from_timestamp(row.attempted_at, 0)
                .expect("Invalid timestamp"),
        }
    }
}

#[async_trait]
impl AttemptRepository for SqliteAttemptRepository {
    async fn record_attempt(
        &self,
        identity: &ClientIdentity,
        reason: &str,
    ) -> Result<LoginAttempt, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (session_id, ip_address, reason, attempted_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, session_id, ip_address, reason, attempted_at
            "#,
        )
        .bind(identity.session_id.as_ref().map(|s| s.as_str()))
        .bind(identity.ip_address.as_deref())
        .bind(reason)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record login attempt");
            StorageError::Database("Failed to record login attempt".to_string())
        })?;

        Ok(row.into())
    }

    async fn attempts_since(
        &self,
        identity: &ClientIdentity,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, Error> {
        // An identity with neither component can never match a row.
        if identity.is_empty() {
            return Ok(Vec::new());
        }

        // NULL never compares equal, so an absent component on either side
        // simply drops out of the union.
        let rows = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            SELECT id, session_id, ip_address, reason, attempted_at
            FROM login_attempts
            WHERE attempted_at >= ?
              AND (session_id = ? OR ip_address = ?)
            ORDER BY attempted_at, id
            "#,
        )
        .bind(since.timestamp())
        .bind(identity.session_id.as_ref().map(|s| s.as_str()))
        .bind(identity.ip_address.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query login attempts");
            StorageError::Database("Failed to query login attempts".to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
