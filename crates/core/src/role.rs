//! Dashboard roles.
//!
//! Roles are a closed set: every role-dependent decision below is an
//! exhaustive match, so adding a role forces a review of each policy table.

use serde::{Deserialize, Serialize};

/// Role of the signed-in dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Enterprise administrator: full dashboard, subject to re-authentication.
    #[serde(rename = "admin")]
    Admin,
    /// Service manager: scoped to the services they manage.
    #[serde(rename = "gerant")]
    Gerant,
    /// Platform operator: bypasses the re-authentication challenge entirely.
    #[serde(rename = "superAdmin")]
    SuperAdmin,
}

impl Role {
    /// Whether this role skips the password re-authentication challenge.
    ///
    /// The challenge modal must never be shown to a bypassing role, even when
    /// it navigates directly to a protected path.
    pub fn bypasses_reauth(&self) -> bool {
        match self {
            Role::Admin => false,
            Role::Gerant => false,
            Role::SuperAdmin => true,
        }
    }

    /// Landing page for this role after login or forced logout.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/dashboard/Agents",
            Role::Gerant => "/dashboard/services",
            Role::SuperAdmin => "/dashboard/entreprise",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Gerant => "gerant",
            Role::SuperAdmin => "superAdmin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
