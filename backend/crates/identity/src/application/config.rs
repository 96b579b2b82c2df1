//! Application Configuration
//!
//! Configuration for the identity application layer.

use std::time::Duration;

use crate::domain::value_object::token_value::MIN_TOKEN_BYTES;
use crate::error::{IdentityError, IdentityResult};

pub const ENV_ACCESS_TOKEN_TTL: &str = "IDENTITY_ACCESS_TOKEN_TTL_SECS";
pub const ENV_REFRESH_TOKEN_TTL: &str = "IDENTITY_REFRESH_TOKEN_TTL_SECS";
pub const ENV_TOKEN_BYTES: &str = "IDENTITY_TOKEN_BYTES";

/// Upper bound for either token lifetime (10 years)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (30 days)
    pub refresh_token_ttl: Duration,
    /// Random bytes per generated token value
    pub token_bytes: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            token_bytes: 32,
        }
    }
}

impl IdentityConfig {
    /// Longer access tokens for local development
    pub fn development() -> Self {
        Self {
            access_token_ttl: Duration::from_secs(12 * 3600),
            ..Default::default()
        }
    }

    /// Defaults overridden by `IDENTITY_*` environment variables
    pub fn from_env() -> IdentityResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> IdentityResult<Self> {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_ACCESS_TOKEN_TTL)? {
            config.access_token_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_REFRESH_TOKEN_TTL)? {
            config.refresh_token_ttl = Duration::from_secs(secs);
        }
        if let Some(bytes) = parse_var::<usize>(&lookup, ENV_TOKEN_BYTES)? {
            config.token_bytes = bytes;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IdentityResult<()> {
        if self.access_token_ttl.is_zero() || self.refresh_token_ttl.is_zero() {
            return Err(IdentityError::Validation(
                "Token lifetimes must be positive".into(),
            ));
        }
        if self.access_token_ttl > MAX_TOKEN_TTL || self.refresh_token_ttl > MAX_TOKEN_TTL {
            return Err(IdentityError::Validation(format!(
                "Token lifetimes must not exceed {} seconds",
                MAX_TOKEN_TTL.as_secs()
            )));
        }
        if self.token_bytes < MIN_TOKEN_BYTES {
            return Err(IdentityError::Validation(format!(
                "{} must be at least {}",
                ENV_TOKEN_BYTES, MIN_TOKEN_BYTES
            )));
        }
        Ok(())
    }

    /// Access token lifetime as a chrono duration
    pub fn access_ttl(&self) -> IdentityResult<chrono::Duration> {
        to_chrono(self.access_token_ttl)
    }

    /// Refresh token lifetime as a chrono duration
    pub fn refresh_ttl(&self) -> IdentityResult<chrono::Duration> {
        to_chrono(self.refresh_token_ttl)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> IdentityResult<Option<T>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| IdentityError::Validation(format!("{key} is not a valid number: {raw}"))),
        None => Ok(None),
    }
}

fn to_chrono(ttl: Duration) -> IdentityResult<chrono::Duration> {
    chrono::Duration::from_std(ttl)
        .map_err(|e| IdentityError::Internal(format!("Invalid token TTL: {e}")))
}
