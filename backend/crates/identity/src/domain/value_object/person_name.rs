//! Person Name Value Object
//!
//! First and last names are required display fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IdentityError, IdentityResult};

const PERSON_NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonName(String);

impl PersonName {
    /// Trimmed, non-blank, at most 100 characters
    pub fn new(field: &'static str, name: impl Into<String>) -> IdentityResult<Self> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::Validation(format!("{} is required", field)));
        }
        if name.chars().count() > PERSON_NAME_MAX_CHARS {
            return Err(IdentityError::Validation(format!(
                "{} must be at most {} characters",
                field, PERSON_NAME_MAX_CHARS
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
