//! Revoke Token Use Case

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::error::{IdentityError, IdentityResult};

/// Revoke token use case
pub struct RevokeTokenUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> RevokeTokenUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    /// Revoke one token; returns `false` if it was already revoked
    pub async fn execute(&self, bearer: &str) -> IdentityResult<bool> {
        let mut user = self
            .user_repo
            .find_by_token(bearer)
            .await?
            .ok_or(IdentityError::TokenNotFound)?;

        let changed = user.revoke_token(bearer)?;
        if changed {
            self.user_repo.update(&mut user).await?;
            tracing::info!(user_id = %user.id(), "Token revoked");
        }

        Ok(changed)
    }
}
