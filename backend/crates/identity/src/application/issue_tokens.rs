//! Issue Tokens Use Case
//!
//! Mints an access/refresh pair for an enabled user. Stale tokens are
//! purged from the aggregate before the new pair is attached.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::IdentityConfig;
use crate::domain::entity::token::Token;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, token_value::TokenValue};
use crate::error::{IdentityError, IdentityResult};

/// Issued token pair
///
/// Holds bearer secrets; hand them to the client and drop.
pub struct IssuedTokens {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issue tokens use case
pub struct IssueTokensUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    config: Arc<IdentityConfig>,
}

impl<R> IssueTokensUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, config: Arc<IdentityConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<IssuedTokens> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if !user.is_enabled() {
            let err = IdentityError::AccountDisabled;
            err.log();
            return Err(err);
        }

        let now = Utc::now();
        let access_expires_at = expiry(now, self.config.access_ttl()?)?;
        let refresh_expires_at = expiry(now, self.config.refresh_ttl()?)?;
        let purged = user.purge_invalid_tokens(now);

        let access = TokenValue::generate(self.config.token_bytes);
        let refresh = TokenValue::generate(self.config.token_bytes);
        let access_token = access.as_str().to_string();
        let refresh_token = refresh.as_str().to_string();

        Token::create_access_token(&mut user, access, access_expires_at)?;
        Token::create_refresh_token(&mut user, refresh, refresh_expires_at)?;

        self.user_repo.update(&mut user).await?;

        tracing::info!(
            user_id = %user.id(),
            tokens_purged = purged.len(),
            "Issued token pair"
        );

        Ok(IssuedTokens {
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }
}

/// `now + ttl`, rejecting lifetimes past the representable calendar
fn expiry(now: DateTime<Utc>, ttl: chrono::Duration) -> IdentityResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| IdentityError::Validation("Token lifetime is out of range".into()))
}
