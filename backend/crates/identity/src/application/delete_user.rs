//! Delete User Use Case

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::{IdentityError, IdentityResult};

/// Delete user use case
pub struct DeleteUserUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> DeleteUserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    /// Remove the user and, with it, every token it owns
    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<()> {
        self.user_repo.delete(user_id).await.map_err(|e| match e {
            IdentityError::NotFound(_) => IdentityError::UserNotFound,
            other => other,
        })?;

        tracing::info!(user_id = %user_id, "User deleted");
        Ok(())
    }
}
