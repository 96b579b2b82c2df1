//! Provision User Use Case
//!
//! Administrative account creation with an explicit role set.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    UserId, auth_provider::AuthProvider, email::Email, user_role::UserRole,
};
use crate::error::{IdentityError, IdentityResult};

/// Provision input
pub struct ProvisionUserInput {
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub provider: AuthProvider,
    pub roles: Vec<UserRole>,
}

/// Provision user use case
pub struct ProvisionUserUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> ProvisionUserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, input: ProvisionUserInput) -> IdentityResult<UserId> {
        let email = Email::new(&input.email)?;
        if self.user_repo.exists_by_email(&email).await? {
            return Err(IdentityError::EmailTaken);
        }

        let user = User::create_user_with_roles(
            email.as_str(),
            input.password_hash.as_deref(),
            &input.first_name,
            &input.last_name,
            input.provider,
            input.roles,
        )?;
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.id(),
            provider = %user.auth_provider(),
            roles = user.roles().len(),
            "User provisioned"
        );

        Ok(user.id())
    }
}
