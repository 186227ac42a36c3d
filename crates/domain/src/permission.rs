use rolegate_core::{AppError, AppResult, NonEmptyString, normalize_optional_text};
use serde::{Deserialize, Serialize};

use crate::{PermissionId, ServiceId};

/// Permission granting one action inside its owning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    action: NonEmptyString,
    description: Option<String>,
    service_id: ServiceId,
}

impl Permission {
    /// Creates a validated permission.
    ///
    /// Actions are opaque identifiers such as `user:create`; they are compared
    /// exactly and must not contain whitespace.
    pub fn new(
        id: PermissionId,
        action: impl Into<String>,
        description: Option<String>,
        service_id: ServiceId,
    ) -> AppResult<Self> {
        let action = NonEmptyString::new(action)?;
        if action.as_str().chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "permission action '{}' must not contain whitespace",
                action.as_str()
            )));
        }

        Ok(Self {
            id,
            action,
            description: normalize_optional_text(description),
            service_id,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the action string, unique within its service.
    #[must_use]
    pub fn action(&self) -> &NonEmptyString {
        &self.action
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning service.
    #[must_use]
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }
}
