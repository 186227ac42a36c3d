use thiserror::Error;

/// Store operation that failed, used to tag persistence failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Read path failure.
    Fetch,
    /// Single relation insert failure.
    Assign,
    /// Bulk relation insert failure.
    AssignMultiple,
    /// Single relation delete failure.
    Revoke,
    /// Bulk relation delete failure.
    RevokeMultiple,
    /// Transactional relation replacement failure.
    Replace,
    /// Entity creation failure.
    Create,
    /// Entity update failure.
    Update,
    /// Entity soft-delete failure.
    Delete,
}

impl StoreOperation {
    /// Returns a stable identifier for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Assign => "assign",
            Self::AssignMultiple => "assign_multiple",
            Self::Revoke => "revoke",
            Self::RevokeMultiple => "revoke_multiple",
            Self::Replace => "replace",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource or relation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation would duplicate an existing entity or relation.
    #[error("already exists: {0}")]
    Conflict(String),

    /// Delete refused because dependent relations still exist.
    #[error("delete blocked: {0}")]
    DeleteBlocked(String),

    /// Persistence operation failed.
    #[error("{operation} failed: {message}")]
    Store {
        /// Operation that failed.
        operation: StoreOperation,
        /// Failure detail.
        message: String,
    },

    /// Sibling service call failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Caller is not authenticated for this API.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Re-tags raw adapter failures with the store operation that produced them.
    ///
    /// Taxonomy errors (not-found, conflict, validation, ...) pass through unchanged.
    #[must_use]
    pub fn into_store_failure(self, operation: StoreOperation) -> Self {
        match self {
            Self::Internal(message) => Self::Store { operation, message },
            other => other,
        }
    }

    /// Returns a stable machine-readable code for the error category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "already_exists",
            Self::DeleteBlocked(_) => "delete_blocked",
            Self::Store { operation, .. } => match operation {
                StoreOperation::Fetch => "fetch_error",
                StoreOperation::Assign => "assign_error",
                StoreOperation::AssignMultiple => "assign_multiple_error",
                StoreOperation::Revoke => "revoke_error",
                StoreOperation::RevokeMultiple => "revoke_multiple_error",
                StoreOperation::Replace => "replace_error",
                StoreOperation::Create => "create_error",
                StoreOperation::Update => "update_error",
                StoreOperation::Delete => "delete_error",
            },
            Self::Upstream(_) => "upstream_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::Internal(_) => "internal",
        }
    }
}
