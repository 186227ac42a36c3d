use rolegate_core::{AppError, AppResult, NonEmptyString, normalize_optional_text};
use serde::{Deserialize, Serialize};

use crate::{RoleId, ServiceId};

/// Role priority where `1` is the highest privilege.
///
/// Priority is stored and used for ordering only; no decision consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RolePriority(u8);

impl RolePriority {
    /// Highest privilege value.
    pub const HIGHEST: u8 = 1;
    /// Lowest privilege value.
    pub const LOWEST: u8 = 10;
    /// Default priority for roles created without one.
    pub const DEFAULT: u8 = 5;

    /// Creates a validated priority.
    pub fn new(value: u8) -> AppResult<Self> {
        if !(Self::HIGHEST..=Self::LOWEST).contains(&value) {
            return Err(AppError::Validation(format!(
                "role priority must be between {} and {}, got {value}",
                Self::HIGHEST,
                Self::LOWEST
            )));
        }

        Ok(Self(value))
    }

    /// Returns the numeric priority.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for RolePriority {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u8> for RolePriority {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RolePriority> for u8 {
    fn from(value: RolePriority) -> Self {
        value.0
    }
}

/// Role owned by exactly one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: Option<String>,
    priority: RolePriority,
    service_id: ServiceId,
}

impl Role {
    /// Creates a validated role.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: Option<String>,
        priority: RolePriority,
        service_id: ServiceId,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description: normalize_optional_text(description),
            priority,
            service_id,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name, unique within its service.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional role description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the role priority.
    #[must_use]
    pub fn priority(&self) -> RolePriority {
        self.priority
    }

    /// Returns the owning service.
    #[must_use]
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// Returns whether the role name matches ignoring case.
    #[must_use]
    pub fn name_matches(&self, candidate: &str) -> bool {
        self.name.as_str().to_lowercase() == candidate.trim().to_lowercase()
    }
}
