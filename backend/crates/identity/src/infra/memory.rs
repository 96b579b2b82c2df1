//! In-Memory Repository
//!
//! Process-local implementation of the user port. One write lock guards the
//! whole store, so uniqueness checks and the version check run atomically
//! with the write they protect.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, auth_provider::AuthProvider, email::Email};
use crate::error::{IdentityError, IdentityResult};

/// In-memory user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Reject an email, federated identity or token value that another
/// aggregate already holds
fn check_unique(store: &HashMap<UserId, User>, user: &User) -> IdentityResult<()> {
    for other in store.values().filter(|u| u.id() != user.id()) {
        if other.email() == user.email() {
            return Err(IdentityError::Conflict("Email already exists".into()));
        }
        if user.provider_id().is_some()
            && other.auth_provider() == user.auth_provider()
            && other.provider_id() == user.provider_id()
        {
            return Err(IdentityError::Conflict(
                "Provider identity already linked to another user".into(),
            ));
        }
        if let Some(token) = user
            .tokens()
            .iter()
            .find(|t| other.token(t.value().as_str()).is_some())
        {
            tracing::warn!(
                user_id = %user.id(),
                token = %token.value().fingerprint(),
                "Token value already owned by another user"
            );
            return Err(IdentityError::Conflict("Token value already exists".into()));
        }
    }
    Ok(())
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        let mut store = self.users.write().await;
        if store.contains_key(&user.id()) {
            return Err(IdentityError::Conflict("User already exists".into()));
        }
        check_unique(&store, user)?;
        store.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>> {
        let store = self.users.read().await;
        Ok(store.values().find(|u| u.email() == email).cloned())
    }

    async fn find_by_token(&self, value: &str) -> IdentityResult<Option<User>> {
        let store = self.users.read().await;
        Ok(store.values().find(|u| u.token(value).is_some()).cloned())
    }

    async fn find_by_provider(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> IdentityResult<Option<User>> {
        let store = self.users.read().await;
        Ok(store
            .values()
            .find(|u| u.auth_provider() == provider && u.provider_id() == Some(provider_id))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        let store = self.users.read().await;
        Ok(store.values().any(|u| u.email() == email))
    }

    async fn update(&self, user: &mut User) -> IdentityResult<()> {
        let mut store = self.users.write().await;
        let stored_version = store
            .get(&user.id())
            .map(User::version)
            .ok_or_else(|| IdentityError::NotFound(format!("user {}", user.id())))?;

        if stored_version != user.version() {
            tracing::warn!(
                user_id = %user.id(),
                stored_version,
                given_version = user.version(),
                "Rejected stale user update"
            );
            return Err(IdentityError::Conflict("User was modified concurrently".into()));
        }
        check_unique(&store, user)?;

        user.set_version(stored_version + 1);
        store.insert(user.id(), user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> IdentityResult<()> {
        self.users
            .write()
            .await
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| IdentityError::NotFound(format!("user {}", user_id)))
    }
}
