use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account role, stored on the profile row.
///
/// This is the single tagged capability every gate in the service matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can submit reports and track their own
    Citizen,
    /// Responder organization; can triage reports assigned to its agency
    Agency,
    /// Manages categories, agencies, users and any report
    Admin,
    /// Admin that can also grant or revoke admin access
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Agency => "agency",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    /// Admin-level access (admin or superadmin)
    pub fn has_admin_access(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "agency" => Ok(Role::Agency),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Database model for a user profile. `id` is the identity provider's subject.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub agency_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new profile
#[derive(Debug, Clone)]
pub struct CreateUserProfile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub agency_id: Option<Uuid>,
}
