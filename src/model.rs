//! Records read from the remote backend and the roster view built from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Authorization label attached to a profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Reads a role column. A missing or unrecognised value is a plain user.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from_column(Some(value.as_str()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level record extending an identity with a role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Account record as known by the auth subsystem.
///
/// Field names follow the identity listing procedure's result columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(rename = "user_id")]
    pub id: String,
    #[serde(rename = "user_email")]
    pub email: String,
    #[serde(
        rename = "user_email_confirmed_at",
        with = "time::serde::rfc3339::option",
        default
    )]
    pub email_confirmed_at: Option<OffsetDateTime>,
}

/// The part of a profile embedded in a roster entry. Empty when the
/// identity has no profile row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub role: Option<Role>,
}

/// Merged view of an identity record and its (possibly absent) profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub id: String,
    pub email: String,
    pub email_confirmed_at: Option<OffsetDateTime>,
    pub profile: ProfileSummary,
}

impl RosterEntry {
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// Role shown in the roster table; identities without a profile show as users.
    pub fn display_role(&self) -> Role {
        self.profile.role.unwrap_or_default()
    }
}

/// Read-only reference data shown to administrators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
}
