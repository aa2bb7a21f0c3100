/// Storage-specific errors
use encore_core::EncoreError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// `SQLite` primary result codes that mean "someone else holds the lock"
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// `SQLite` extended result code for a UNIQUE index violation
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row violates an invariant the schema cannot express
    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl StorageError {
    /// Create a corrupt row error
    pub fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            table,
            reason: reason.into(),
        }
    }

    /// Lock-wait timeouts and busy/locked database results
    pub fn is_contention(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::PoolTimedOut) => true,
            StorageError::Database(sqlx::Error::Database(db)) => db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
            _ => false,
        }
    }

    /// A UNIQUE index rejected the write
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(db)) => {
                db.is_unique_violation() || db.code().as_deref() == Some(SQLITE_CONSTRAINT_UNIQUE)
            }
            _ => false,
        }
    }
}

impl From<StorageError> for EncoreError {
    fn from(err: StorageError) -> Self {
        if err.is_contention() {
            EncoreError::Concurrency(err.to_string())
        } else {
            EncoreError::Storage(err.to_string())
        }
    }
}
