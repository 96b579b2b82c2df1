//! Register Local User Use Case
//!
//! Creates a self-registered account with a local password hash.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, email::Email};
use crate::error::{IdentityError, IdentityResult};

/// Register input
///
/// `password_hash` is already hashed by the caller.
pub struct RegisterLocalUserInput {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Register output
pub struct RegisterLocalUserOutput {
    pub user_id: UserId,
    pub email: String,
}

/// Register local user use case
pub struct RegisterLocalUserUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> RegisterLocalUserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(
        &self,
        input: RegisterLocalUserInput,
    ) -> IdentityResult<RegisterLocalUserOutput> {
        let email = Email::new(&input.email)?;
        if self.user_repo.exists_by_email(&email).await? {
            return Err(IdentityError::EmailTaken);
        }

        let user = User::create_local_user(
            email.as_str(),
            &input.password_hash,
            &input.first_name,
            &input.last_name,
        )?;
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.id(),
            email = %user.email(),
            "Local user registered"
        );

        Ok(RegisterLocalUserOutput {
            user_id: user.id(),
            email: user.email().to_string(),
        })
    }
}
