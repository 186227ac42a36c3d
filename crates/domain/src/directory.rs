//! Read models for records owned by sibling services.

use serde::{Deserialize, Serialize};

use crate::{ServiceId, UserId};

/// Service record as published by the portal service directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryService {
    /// Service identifier.
    pub id: ServiceId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Globally visible services are available to every user.
    #[serde(default)]
    pub is_public: bool,
}

/// User record as published by the identity service directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// User identifier.
    pub id: UserId,
    /// Login or display name.
    pub username: String,
    /// Optional email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// Owning-service details attached to role and permission search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    /// Service identifier, empty when the directory could not be reached.
    pub id: String,
    /// Service name.
    pub name: String,
}

impl ServiceSummary {
    /// Placeholder used when the service directory lookup fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            id: String::new(),
            name: "Service unavailable".to_owned(),
        }
    }
}

impl From<&DirectoryService> for ServiceSummary {
    fn from(value: &DirectoryService) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
        }
    }
}
