use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The durable attempt backend failed to read or write.
    ///
    /// This is never collapsed into an empty count: integrators decide
    /// whether to fail open or fail closed via
    /// [`UnavailablePolicy`](crate::config::UnavailablePolicy).
    #[error("Attempt tracker unavailable: {0}")]
    TrackerUnavailable(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl Error {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::TrackerUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::TrackerUnavailable(StorageError::Connection("refused".to_string()));
        assert_eq!(
            error.to_string(),
            "Attempt tracker unavailable: Connection error: refused"
        );

        let error: Error = StorageError::Database("locked".to_string()).into();
        assert!(error.is_unavailable());
    }
}
