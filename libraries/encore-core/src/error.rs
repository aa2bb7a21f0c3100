/// Core error types for Encore
use thiserror::Error;

/// Result type alias using `EncoreError`
pub type Result<T> = std::result::Result<T, EncoreError>;

/// Core error type for Encore
///
/// Mirrors the failure taxonomy of the membership engine: callers map these
/// onto user-facing responses, the engine itself never formats them.
#[derive(Error, Debug)]
pub enum EncoreError {
    /// Malformed or inconsistent request (e.g. a reorder list that is not a
    /// permutation of the container's members)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        /// Keys that are not members of the container
        invalid: Vec<String>,
        /// Members of the container absent from the request
        missing: Vec<String>,
        /// Keys that appear more than once in the request
        duplicates: Vec<String>,
    },

    /// Container or membership row absent
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Member already present in a unique-membership container
    #[error("{member} is already in {container}")]
    DuplicateMember { container: String, member: String },

    /// Lock-wait timeout or deadlock; the caller may retry
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Underlying persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Caller may not mutate or view the container
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl EncoreError {
    /// Create a validation error without key details
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            invalid: Vec::new(),
            missing: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a duplicate member error
    pub fn duplicate_member(container: impl Into<String>, member: impl ToString) -> Self {
        Self::DuplicateMember {
            container: container.into(),
            member: member.to_string(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Concurrency(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concurrency_errors_are_retryable() {
        assert!(EncoreError::Concurrency("lock wait".into()).is_retryable());
        assert!(!EncoreError::storage("disk full").is_retryable());
        assert!(!EncoreError::validation("bad order").is_retryable());
        assert!(!EncoreError::not_found("Playlist", 4).is_retryable());
    }

    #[test]
    fn messages_name_the_entity() {
        let err = EncoreError::not_found("Playlist", 42);
        assert_eq!(err.to_string(), "Playlist not found: 42");

        let err = EncoreError::duplicate_member("playlist 3", 9);
        assert_eq!(err.to_string(), "9 is already in playlist 3");
    }
}
