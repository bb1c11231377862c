// ABOUTME: Unified error taxonomy for the repository toolkit
// ABOUTME: Maps each error kind to the HTTP status class the controller boundary should emit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use thiserror::Error;

/// Errors surfaced by repository operations.
///
/// The taxonomy is deliberately small: everything a caller can act on is one
/// of validation, not-found-or-forbidden, conflict, or a storage failure.
/// Bad sort/filter input is *not* an error anywhere in this crate — it
/// silently degrades to safe defaults.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Missing required field or malformed input (unknown audit action,
    /// missing `cart_id`, ...). Never retried.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// A tenant-scoped lookup or mutation touched zero rows.
    ///
    /// Deliberately conflates "does not exist" and "belongs to another
    /// tenant" so that existence of foreign rows never leaks across tenants.
    #[error("{entity} {id} not found for this tenant")]
    NotFoundOrForbidden { entity: String, id: i64 },

    /// Duplicate relation or uniqueness violation detected before a write.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Write-side field encryption failed. Read-side decrypt failures are
    /// not errors; they substitute `null` in the returned row.
    #[error("field encryption failed: {context}")]
    Encryption { context: String },

    /// Any underlying driver failure. Always surfaced, never swallowed;
    /// inside explicit transactions it triggers rollback and rethrow.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl RepositoryError {
    /// HTTP status class a controller boundary should map this error to.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFoundOrForbidden { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Encryption { .. } | Self::Storage(_) => 500,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFoundOrForbidden {
            entity: entity.to_string(),
            id,
        }
    }
}

/// Result type alias used throughout the toolkit.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::RepositoryError;

    #[test]
    fn status_mapping_distinguishes_caller_errors_from_storage() {
        assert_eq!(
            RepositoryError::validation("cart_id is required").http_status(),
            400
        );
        assert_eq!(
            RepositoryError::not_found("cart_items", 10).http_status(),
            404
        );
        assert_eq!(
            RepositoryError::Conflict {
                message: "duplicate relation".into()
            }
            .http_status(),
            409
        );
        assert_eq!(
            RepositoryError::Storage(sqlx::Error::RowNotFound).http_status(),
            500
        );
    }

    #[test]
    fn not_found_message_conflates_missing_and_foreign() {
        let err = RepositoryError::not_found("certificates_requests", 42);
        assert_eq!(
            err.to_string(),
            "certificates_requests 42 not found for this tenant"
        );
    }
}
