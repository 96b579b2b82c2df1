//! Token Entity
//!
//! One issued credential (access or refresh) owned by exactly one User.
//! Stored state is only `revoked` plus a fixed expiry; whether a token is
//! active, expired or revoked is derived at query time.

use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    TokenId, UserId, token_type::TokenType, token_value::TokenValue,
};
use crate::error::{IdentityError, IdentityResult};

/// Derived token state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenState {
    #[display("active")]
    Active,
    #[display("expired")]
    Expired,
    #[display("revoked")]
    Revoked,
}

/// Token entity
#[derive(Debug, Clone)]
pub struct Token {
    id: TokenId,
    /// Non-owning back-reference, only written by `User::add_token` / `User::remove_token`
    user_id: Option<UserId>,
    value: TokenValue,
    token_type: TokenType,
    revoked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Token {
    /// Issue an access token and register it with `user`
    ///
    /// `expires_at` must lie strictly in the future.
    pub fn create_access_token(
        user: &mut User,
        value: TokenValue,
        expires_at: DateTime<Utc>,
    ) -> IdentityResult<&Token> {
        Self::issue(user, value, TokenType::Access, expires_at)
    }

    /// Issue a refresh token and register it with `user`
    ///
    /// `expires_at` must lie strictly in the future.
    pub fn create_refresh_token(
        user: &mut User,
        value: TokenValue,
        expires_at: DateTime<Utc>,
    ) -> IdentityResult<&Token> {
        Self::issue(user, value, TokenType::Refresh, expires_at)
    }

    fn issue(
        user: &mut User,
        value: TokenValue,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> IdentityResult<&Token> {
        let now = Utc::now();
        if expires_at <= now {
            return Err(IdentityError::Validation(
                "Token expiry must be in the future".into(),
            ));
        }

        let token = Self {
            id: TokenId::new(),
            user_id: None,
            value,
            token_type,
            revoked: false,
            expires_at,
            created_at: now,
        };
        user.add_token(token)
    }

    /// Rebuild a detached token from storage
    ///
    /// No creation-time checks run here: stored tokens may well be expired.
    /// Attach it with [`User::restore`] or [`User::add_token`].
    pub fn restore(
        id: TokenId,
        value: TokenValue,
        token_type: TokenType,
        revoked: bool,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: None,
            value,
            token_type,
            revoked,
            expires_at,
            created_at,
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Owning user, `None` once detached
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// One-way transition to revoked
    ///
    /// Returns `true` if this call changed the state; revoking an already
    /// revoked token is a no-op.
    pub fn revoke(&mut self) -> bool {
        let changed = !self.revoked;
        self.revoked = true;
        changed
    }

    /// `!revoked && now < expires_at`, evaluated against the current clock
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }

    /// Revocation takes precedence over expiry
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked {
            TokenState::Revoked
        } else if now >= self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    pub fn state(&self) -> TokenState {
        self.state_at(Utc::now())
    }

    pub(crate) fn attach(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }

    pub(crate) fn detach(&mut self) {
        self.user_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User::create_local_user("a@b.com", "hash", "A", "B").unwrap()
    }

    fn value(s: &str) -> TokenValue {
        TokenValue::new(s).unwrap()
    }

    #[test]
    fn test_factories_set_type_and_initial_state() {
        let mut user = user();
        let expiry = Utc::now() + Duration::hours(1);

        let access = Token::create_access_token(&mut user, value("acc"), expiry).unwrap();
        assert_eq!(access.token_type(), TokenType::Access);
        assert!(!access.is_revoked());
        assert_eq!(access.expires_at(), expiry);
        assert!(access.is_valid());

        let refresh =
            Token::create_refresh_token(&mut user, value("ref"), Utc::now() + Duration::days(30))
                .unwrap();
        assert_eq!(refresh.token_type(), TokenType::Refresh);
        assert_eq!(refresh.state(), TokenState::Active);
    }

    #[test]
    fn test_factories_bind_token_to_owner() {
        let mut user = user();
        let user_id = user.id();
        let token =
            Token::create_access_token(&mut user, value("acc"), Utc::now() + Duration::hours(1))
                .unwrap();
        assert_eq!(token.user_id(), Some(user_id));
        assert_eq!(user.tokens().len(), 1);
        assert!(user.token("acc").is_some());
    }

    #[test]
    fn test_factories_reject_past_expiry() {
        let mut user = user();
        let err = Token::create_access_token(&mut user, value("acc"), Utc::now() - Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(err, IdentityError::Validation(_)));
        assert!(user.tokens().is_empty());
    }

    #[test]
    fn test_validity_is_pure_function_of_time() {
        let t1 = Utc::now() + Duration::hours(1);
        let token = Token::restore(
            TokenId::new(),
            value("acc"),
            TokenType::Access,
            false,
            t1,
            Utc::now(),
        );

        assert!(token.is_valid_at(t1 - Duration::days(365)));
        assert!(token.is_valid_at(t1 - Duration::milliseconds(1)));
        assert!(!token.is_valid_at(t1));
        assert!(!token.is_valid_at(t1 + Duration::milliseconds(1)));
        assert_eq!(token.state_at(t1), TokenState::Expired);
    }

    #[test]
    fn test_revoked_is_invalid_at_all_times() {
        let t1 = Utc::now() + Duration::hours(1);
        let mut token = Token::restore(
            TokenId::new(),
            value("acc"),
            TokenType::Refresh,
            false,
            t1,
            Utc::now(),
        );
        token.revoke();

        assert!(!token.is_valid_at(t1 - Duration::days(1)));
        assert!(!token.is_valid_at(t1 + Duration::days(1)));
        assert_eq!(token.state_at(t1 - Duration::days(1)), TokenState::Revoked);
        assert_eq!(token.state_at(t1 + Duration::days(1)), TokenState::Revoked);
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut once = Token::restore(
            TokenId::new(),
            value("acc"),
            TokenType::Access,
            false,
            Utc::now() + Duration::hours(1),
            Utc::now(),
        );
        let mut twice = once.clone();

        assert!(once.revoke());
        assert!(twice.revoke());
        assert!(!twice.revoke());

        assert_eq!(once.is_revoked(), twice.is_revoked());
        assert_eq!(once.expires_at(), twice.expires_at());
        assert_eq!(once.state(), twice.state());
    }

    #[test]
    fn test_restore_is_detached() {
        let token = Token::restore(
            TokenId::new(),
            value("acc"),
            TokenType::Access,
            true,
            Utc::now() - Duration::days(1),
            Utc::now() - Duration::days(2),
        );
        assert!(token.user_id().is_none());
        assert_eq!(token.state(), TokenState::Revoked);
    }
}
