use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use rolegate_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// UUID-backed identifier usable as either side of a relation.
pub trait EntityId:
    Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static
{
    /// Human-readable entity label used in messages and logs.
    const LABEL: &'static str;

    /// Wraps an existing UUID value.
    fn from_uuid(value: Uuid) -> Self;

    /// Returns the underlying UUID value.
    fn as_uuid(&self) -> Uuid;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses a transport value into an identifier.
            pub fn from_transport(value: &str) -> Result<Self, AppError> {
                Self::from_str(value)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl EntityId for $name {
            const LABEL: &'static str = $label;

            fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!("invalid {} id '{value}': {error}", $label))
                })
            }
        }
    };
}

entity_id!(
    /// Identifier of a user owned by the identity service.
    UserId,
    "user"
);
entity_id!(
    /// Identifier of a role.
    RoleId,
    "role"
);
entity_id!(
    /// Identifier of a permission.
    PermissionId,
    "permission"
);
entity_id!(
    /// Identifier of a service owned by the portal service.
    ServiceId,
    "service"
);
