//! Token Value Object
//!
//! The literal bearer string of an issued token. It is a secret, so `Debug`
//! only ever shows a fingerprint and there is no `Display`.

use std::fmt;

use platform::crypto;

use crate::error::{IdentityError, IdentityResult};

/// Smallest amount of entropy accepted for generated values
pub const MIN_TOKEN_BYTES: usize = 16;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenValue(String);

impl TokenValue {
    /// Wrap a caller-supplied bearer value (e.g. a signed JWT)
    pub fn new(value: impl Into<String>) -> IdentityResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentityError::Validation("Token value cannot be blank".into()));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(IdentityError::Validation(
                "Token value cannot contain whitespace".into(),
            ));
        }
        Ok(Self(value))
    }

    /// Generate an opaque random value from `bytes` bytes of OS entropy
    pub fn generate(bytes: usize) -> Self {
        Self(crypto::random_token(bytes.max(MIN_TOKEN_BYTES)))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-reversible short form, safe for log lines
    pub fn fingerprint(&self) -> String {
        crypto::fingerprint(&self.0)
    }
}

impl fmt::Debug for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenValue({})", self.fingerprint())
    }
}

impl AsRef<str> for TokenValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
