//! Principal Views
//!
//! Read-only capability views an authentication or federation layer needs
//! from a user, independent of how that layer is built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;
use crate::domain::value_object::{attributes::Attributes, user_role::UserRole};

/// Authority string granted to a principal, e.g. `ROLE_ADMIN`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantedAuthority(String);

impl GrantedAuthority {
    pub fn new(authority: impl Into<String>) -> Self {
        Self(authority.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&UserRole> for GrantedAuthority {
    fn from(role: &UserRole) -> Self {
        Self(role.authority())
    }
}

impl From<UserRole> for GrantedAuthority {
    fn from(role: UserRole) -> Self {
        Self(role.authority())
    }
}

impl fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credential-holder view used by password and bearer authentication
pub trait Principal {
    /// Login name
    fn username(&self) -> &str;

    fn password_hash(&self) -> Option<&str>;

    fn authorities(&self) -> Vec<GrantedAuthority>;

    fn is_enabled(&self) -> bool;

    fn is_account_non_locked(&self) -> bool {
        true
    }

    fn is_account_non_expired(&self) -> bool {
        true
    }

    fn is_credentials_non_expired(&self) -> bool {
        true
    }

    /// All four account checks pass
    fn is_usable(&self) -> bool {
        self.is_enabled()
            && self.is_account_non_locked()
            && self.is_account_non_expired()
            && self.is_credentials_non_expired()
    }
}

/// Federated-identity view
pub trait OAuth2Principal {
    fn name(&self) -> &str;

    fn attributes(&self) -> &Attributes;

    fn authorities(&self) -> Vec<GrantedAuthority>;
}

impl Principal for User {
    fn username(&self) -> &str {
        self.email().as_str()
    }

    fn password_hash(&self) -> Option<&str> {
        self.password().map(|p| p.as_str())
    }

    fn authorities(&self) -> Vec<GrantedAuthority> {
        self.granted_authorities()
    }

    fn is_enabled(&self) -> bool {
        User::is_enabled(self)
    }

    /// A disabled account also reports as locked
    fn is_account_non_locked(&self) -> bool {
        User::is_enabled(self)
    }

    fn is_credentials_non_expired(&self) -> bool {
        User::is_enabled(self)
    }
}

impl OAuth2Principal for User {
    fn name(&self) -> &str {
        self.email().as_str()
    }

    fn attributes(&self) -> &Attributes {
        User::attributes(self)
    }

    fn authorities(&self) -> Vec<GrantedAuthority> {
        self.granted_authorities()
    }
}
