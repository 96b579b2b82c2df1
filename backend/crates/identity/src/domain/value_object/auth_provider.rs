//! Auth Provider Registry
//!
//! Closed set of identity origins. `Local` accounts sign in with a password
//! held by this service; the others are federated through OAuth2.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IdentityError, IdentityResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Local,
    Google,
    Github,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 3] = [
        AuthProvider::Local,
        AuthProvider::Google,
        AuthProvider::Github,
    ];

    /// Canonical lowercase name
    #[inline]
    pub const fn name(&self) -> &'static str {
        use AuthProvider::*;
        match self {
            Local => "local",
            Google => "google",
            Github => "github",
        }
    }

    #[inline]
    pub const fn is_federated(&self) -> bool {
        !matches!(self, AuthProvider::Local)
    }

    /// Case-insensitive lookup by canonical name
    ///
    /// Fails with [`IdentityError::UnknownProvider`] carrying the raw input.
    pub fn parse(name: &str) -> IdentityResult<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| IdentityError::UnknownProvider(name.to_string()))
    }
}

impl FromStr for AuthProvider {
    type Err = IdentityError;

    fn from_str(s: &str) -> IdentityResult<Self> {
        AuthProvider::parse(s)
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(AuthProvider::parse("GOOGLE").unwrap(), AuthProvider::Google);
        assert_eq!(AuthProvider::parse("google").unwrap(), AuthProvider::Google);
        assert_eq!(AuthProvider::parse("Google").unwrap(), AuthProvider::Google);
        assert_eq!(AuthProvider::parse("GitHub").unwrap(), AuthProvider::Github);
        assert_eq!(AuthProvider::parse("LOCAL").unwrap(), AuthProvider::Local);
    }

    #[test]
    fn test_parse_unknown_keeps_raw_input() {
        match AuthProvider::parse("facebook") {
            Err(IdentityError::UnknownProvider(raw)) => assert_eq!(raw, "facebook"),
            other => panic!("expected UnknownProvider, got {:?}", other),
        }
        assert!(AuthProvider::parse("").is_err());
        assert!(AuthProvider::parse(" google").is_err());
    }

    #[test]
    fn test_display_is_canonical_name() {
        for provider in AuthProvider::ALL {
            assert_eq!(provider.to_string(), provider.name());
            assert_eq!(provider.name().parse::<AuthProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_is_federated() {
        assert!(!AuthProvider::Local.is_federated());
        assert!(AuthProvider::Google.is_federated());
        assert!(AuthProvider::Github.is_federated());
    }

    #[test]
    fn test_default_is_local() {
        assert_eq!(AuthProvider::default(), AuthProvider::Local);
    }
}
