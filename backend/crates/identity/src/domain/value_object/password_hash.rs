//! Password Hash Value Object
//!
//! Holds an already-hashed password produced by the external hashing
//! collaborator. This crate never hashes or verifies passwords itself.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{IdentityError, IdentityResult};

#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(Zeroizing<String>);

impl PasswordHash {
    /// Wrap a non-blank hash
    pub fn new(hash: impl Into<String>) -> IdentityResult<Self> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(IdentityError::Validation("Password hash cannot be blank".into()));
        }
        Ok(Self(Zeroizing::new(hash)))
    }

    /// Optional hash where an empty string means "no password"
    ///
    /// Federated accounts carry no password; providers often hand over an
    /// empty string rather than nothing.
    pub fn optional(hash: Option<&str>) -> Option<Self> {
        hash.filter(|h| !h.trim().is_empty())
            .map(|h| Self(Zeroizing::new(h.to_string())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_hash_rejected() {
        assert!(PasswordHash::new("").is_err());
        assert!(PasswordHash::new("  ").is_err());
        assert_eq!(PasswordHash::new("$argon2id$x").unwrap().as_str(), "$argon2id$x");
    }

    #[test]
    fn test_optional_treats_empty_as_absent() {
        assert!(PasswordHash::optional(None).is_none());
        assert!(PasswordHash::optional(Some("")).is_none());
        assert!(PasswordHash::optional(Some("hash")).is_some());
    }

    #[test]
    fn test_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$secret").unwrap();
        assert!(!format!("{:?}", hash).contains("secret"));
    }
}
