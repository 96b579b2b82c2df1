//! Repository Traits
//!
//! Persistence port for the user aggregate. Tokens are stored and loaded
//! together with their owner. Implementations live in the infra layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{UserId, auth_provider::AuthProvider, email::Email};
use crate::error::IdentityResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new aggregate
    ///
    /// Fails with `Conflict` when the email or any token value is taken.
    async fn create(&self, user: &User) -> IdentityResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>>;

    /// Find the owner of a bearer value
    async fn find_by_token(&self, value: &str) -> IdentityResult<Option<User>>;

    /// Find a federated account
    async fn find_by_provider(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> IdentityResult<Option<User>>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool>;

    /// Persist the aggregate, replacing its stored token set
    ///
    /// `user.version()` must match the stored version; on success the
    /// version is advanced in place.
    async fn update(&self, user: &mut User) -> IdentityResult<()>;

    /// Remove the user together with every token it owns
    async fn delete(&self, user_id: &UserId) -> IdentityResult<()>;
}
