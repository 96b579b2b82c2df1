//! Authenticate Token Use Case
//!
//! Resolves a presented bearer value to the principal it was issued for.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::principal::GrantedAuthority;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, token_type::TokenType, token_value::TokenValue};
use crate::error::{IdentityError, IdentityResult};

/// Authenticated principal snapshot
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub user_id: UserId,
    pub email: String,
    pub authorities: Vec<GrantedAuthority>,
    pub token_type: TokenType,
}

impl AuthenticatedPrincipal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == authority)
    }
}

/// Authenticate token use case
pub struct AuthenticateTokenUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> AuthenticateTokenUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, bearer: &str) -> IdentityResult<AuthenticatedPrincipal> {
        let value = TokenValue::new(bearer).map_err(|_| IdentityError::TokenNotFound)?;

        let user = self
            .user_repo
            .find_by_token(value.as_str())
            .await?
            .ok_or(IdentityError::TokenNotFound)?;

        if !user.is_enabled() {
            tracing::warn!(user_id = %user.id(), "Token presented for disabled account");
            return Err(IdentityError::AccountDisabled);
        }

        let token = user
            .token(value.as_str())
            .ok_or(IdentityError::TokenNotFound)?;
        if !token.is_valid_at(Utc::now()) {
            tracing::warn!(
                user_id = %user.id(),
                token = %value.fingerprint(),
                state = %token.state(),
                "Rejected token"
            );
            return Err(IdentityError::TokenInvalid);
        }

        tracing::debug!(user_id = %user.id(), token_type = %token.token_type(), "Token authenticated");

        Ok(AuthenticatedPrincipal {
            user_id: user.id(),
            email: user.email().to_string(),
            authorities: user.granted_authorities(),
            token_type: token.token_type(),
        })
    }
}
