//! Deactivate Account Use Case
//!
//! Disables an account and persists the revocation of every token it owns.

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::{IdentityError, IdentityResult};

/// Deactivate account use case
pub struct DeactivateAccountUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> DeactivateAccountUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    /// Returns the number of tokens revoked by this call
    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<usize> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let revoked = user.deactivate_account();
        self.user_repo.update(&mut user).await?;

        Ok(revoked)
    }
}
