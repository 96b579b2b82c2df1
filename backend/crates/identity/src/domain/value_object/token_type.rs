//! Token Type
//!
//! Access and refresh tokens share one shape; the type only decides the
//! expected lifetime and how callers may use the bearer value.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Short-lived bearer credential
    #[display("ACCESS")]
    Access,
    /// Long-lived credential used to obtain new access tokens
    #[display("REFRESH")]
    Refresh,
}

impl TokenType {
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Access => "ACCESS",
            Self::Refresh => "REFRESH",
        }
    }

    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ACCESS" => Some(Self::Access),
            "REFRESH" => Some(Self::Refresh),
            _ => None,
        }
    }
}
