//! Federated Sign-In Use Case
//!
//! Resolves an OAuth2 callback to a local account, creating it on first
//! sign-in and refreshing the stored provider claims afterwards.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    UserId, attributes::Attributes, auth_provider::AuthProvider, email::Email,
};
use crate::error::{IdentityError, IdentityResult};

/// Claims returned by the provider
pub struct FederatedSignInInput {
    /// Provider registration name as received, e.g. `google`
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub attributes: Attributes,
}

/// Sign-in output
pub struct FederatedSignInOutput {
    pub user_id: UserId,
    /// Whether this sign-in created the account
    pub created: bool,
}

/// Federated sign-in use case
pub struct FederatedSignInUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
}

impl<R> FederatedSignInUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, input: FederatedSignInInput) -> IdentityResult<FederatedSignInOutput> {
        let provider = AuthProvider::parse(&input.provider).inspect_err(IdentityError::log)?;
        if !provider.is_federated() {
            return Err(IdentityError::Validation(format!(
                "{} is not a federated provider",
                provider
            )));
        }

        if let Some(mut user) = self
            .user_repo
            .find_by_provider(provider, &input.provider_id)
            .await?
        {
            if !user.is_enabled() {
                let err = IdentityError::AccountDisabled;
                err.log();
                return Err(err);
            }

            user.merge_attributes(input.attributes);
            self.user_repo.update(&mut user).await?;

            tracing::info!(user_id = %user.id(), provider = %provider, "Federated sign-in");
            return Ok(FederatedSignInOutput {
                user_id: user.id(),
                created: false,
            });
        }

        let email = Email::new(&input.email)?;
        if self.user_repo.exists_by_email(&email).await? {
            tracing::warn!(
                provider = %provider,
                email = %email,
                "Federated sign-in for an email owned by another account"
            );
            return Err(IdentityError::EmailTaken);
        }

        let mut user = User::create_oauth2_user(
            email.as_str(),
            None,
            &input.first_name,
            &input.last_name,
            provider,
            &input.provider_id,
        )?;
        user.replace_attributes(input.attributes);
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.id(),
            provider = %provider,
            "Federated account created"
        );

        Ok(FederatedSignInOutput {
            user_id: user.id(),
            created: true,
        })
    }
}
