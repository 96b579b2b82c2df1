use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization role tag
///
/// Variant order is the iteration order of a role set, which keeps the
/// granted-authority view stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Base role every self-registered or federated account receives
    #[default]
    User,
    Moderator,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Prefix applied when a role is exposed as a granted authority
    pub const AUTHORITY_PREFIX: &'static str = "ROLE_";

    #[inline]
    pub const fn name(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "USER",
            Moderator => "MODERATOR",
            Admin => "ADMIN",
            SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Granted-authority form, e.g. `ROLE_ADMIN`
    #[inline]
    pub fn authority(&self) -> String {
        format!("{}{}", Self::AUTHORITY_PREFIX, self.name())
    }

    #[inline]
    pub const fn is_moderator_or_higher(&self) -> bool {
        use UserRole::*;
        matches!(self, Moderator | Admin | SuperAdmin)
    }

    #[inline]
    pub const fn is_admin_or_higher(&self) -> bool {
        use UserRole::*;
        matches!(self, Admin | SuperAdmin)
    }

    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        use UserRole::*;
        match name {
            "USER" => Some(User),
            "MODERATOR" => Some(Moderator),
            "ADMIN" => Some(Admin),
            "SUPER_ADMIN" => Some(SuperAdmin),
            _ => {
                tracing::error!("Invalid UserRole name: {}", name);
                None
            }
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
