//! Error types for housekeeping operations

use thiserror::Error;

/// Service error codes the operations branch on
pub const NO_SUCH_LIFECYCLE_CONFIGURATION: &str = "NoSuchLifecycleConfiguration";
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
pub const CONFLICT: &str = "ConflictException";

/// A failed call against a cloud control-plane API.
///
/// Adapters normalise SDK errors into this shape so the operations can branch
/// on the service error code without depending on any SDK crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {}", self.describe())]
pub struct ServiceError {
    pub operation: &'static str,
    pub code: Option<String>,
    pub message: String,
}

impl ServiceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(
        operation: &'static str,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// True when the service reported exactly this error code
    pub fn is_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    /// Case-insensitive substring match over code and message
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.message.to_ascii_lowercase().contains(&needle)
            || self
                .code
                .as_deref()
                .is_some_and(|code| code.to_ascii_lowercase().contains(&needle))
    }

    fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("{}: {}", code, self.message),
            None => self.message.clone(),
        }
    }
}

/// Errors surfaced by housekeeping operations
#[derive(Debug, Error)]
pub enum HousekeepingError {
    /// The cloud API rejected or failed the call
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The caller supplied something the API would reject anyway
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The event payload did not have the expected shape
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

impl HousekeepingError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = HousekeepingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = ServiceError::with_code("DeleteScheduledAction", CONFLICT, "busy");
        assert_eq!(
            err.to_string(),
            "DeleteScheduledAction failed: ConflictException: busy"
        );

        let err = ServiceError::new("ListBuckets", "dispatch failure");
        assert_eq!(err.to_string(), "ListBuckets failed: dispatch failure");
    }

    #[test]
    fn test_code_matching() {
        let err = ServiceError::with_code(
            "RestoreFromSnapshot",
            RESOURCE_NOT_FOUND,
            "Snapshot nightly-1 not found",
        );
        assert!(err.is_code(RESOURCE_NOT_FOUND));
        assert!(!err.is_code(CONFLICT));
        assert!(err.mentions("snapshot"));
        assert!(!err.mentions("workgroup"));
    }

    #[test]
    fn test_service_error_converts() {
        let err: HousekeepingError = ServiceError::new("GetNamespace", "timeout").into();
        assert!(matches!(err, HousekeepingError::Service(_)));
        assert_eq!(err.to_string(), "GetNamespace failed: timeout");
    }
}
