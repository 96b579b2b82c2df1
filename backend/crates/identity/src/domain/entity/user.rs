//! User Entity
//!
//! Aggregate root of the identity model. A user owns its tokens: ownership
//! is only established through [`User::add_token`] and only dissolved by
//! detachment, so the token's back-reference and the user's collection can
//! never drift apart. Fields are private for the same reason.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::entity::token::Token;
use crate::domain::principal::GrantedAuthority;
use crate::domain::value_object::{
    UserId, attributes::Attributes, auth_provider::AuthProvider, email::Email,
    password_hash::PasswordHash, person_name::PersonName, token_type::TokenType,
    user_role::UserRole,
};
use crate::error::{IdentityError, IdentityResult};

/// User aggregate
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    email: Email,
    password: Option<PasswordHash>,
    first_name: PersonName,
    last_name: PersonName,
    auth_provider: AuthProvider,
    provider_id: Option<String>,
    enabled: bool,
    email_verified: bool,
    roles: BTreeSet<UserRole>,
    tokens: Vec<Token>,
    attributes: Attributes,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Stored user columns, used by persistence adapters to rebuild a [`User`]
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub email: Email,
    pub password: Option<PasswordHash>,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub auth_provider: AuthProvider,
    pub provider_id: Option<String>,
    pub enabled: bool,
    pub email_verified: bool,
    pub roles: BTreeSet<UserRole>,
    pub attributes: Attributes,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    // ========================================================================
    // Factories
    // ========================================================================

    /// Self-registered account with a local password
    ///
    /// Starts enabled, unverified, with the base role only.
    pub fn create_local_user(
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> IdentityResult<Self> {
        let password = PasswordHash::new(password_hash)?;
        let mut user = Self::base(email, Some(password), first_name, last_name, AuthProvider::Local)?;
        user.email_verified = false;
        user.roles.insert(UserRole::User);
        Ok(user)
    }

    /// Administrative provisioning with an explicit role set
    ///
    /// Starts enabled and verified. Roles are taken verbatim and may be
    /// empty; this path does not add the base role.
    pub fn create_user_with_roles(
        email: &str,
        password_hash: Option<&str>,
        first_name: &str,
        last_name: &str,
        provider: AuthProvider,
        roles: impl IntoIterator<Item = UserRole>,
    ) -> IdentityResult<Self> {
        let password = PasswordHash::optional(password_hash);
        let mut user = Self::base(email, password, first_name, last_name, provider)?;
        user.enabled = true;
        user.email_verified = true;
        user.roles.extend(roles);

        if user.roles.is_empty() {
            tracing::warn!(user_id = %user.id, "User provisioned without any role");
        }
        Ok(user)
    }

    /// Federated account created on first OAuth2 sign-in
    ///
    /// The provider already verified the address, so the account starts
    /// verified. Usually carries no password.
    pub fn create_oauth2_user(
        email: &str,
        password_hash: Option<&str>,
        first_name: &str,
        last_name: &str,
        provider: AuthProvider,
        provider_id: &str,
    ) -> IdentityResult<Self> {
        if !provider.is_federated() {
            return Err(IdentityError::Validation(
                "OAuth2 users require a federated provider".into(),
            ));
        }
        let provider_id = provider_id.trim();
        if provider_id.is_empty() {
            return Err(IdentityError::Validation("Provider id is required".into()));
        }

        let password = PasswordHash::optional(password_hash);
        let mut user = Self::base(email, password, first_name, last_name, provider)?;
        user.provider_id = Some(provider_id.to_string());
        user.email_verified = true;
        user.roles.insert(UserRole::User);
        Ok(user)
    }

    /// Shared defaults; each factory overrides what differs
    fn base(
        email: &str,
        password: Option<PasswordHash>,
        first_name: &str,
        last_name: &str,
        auth_provider: AuthProvider,
    ) -> IdentityResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            email: Email::new(email)?,
            password,
            first_name: PersonName::new("First name", first_name)?,
            last_name: PersonName::new("Last name", last_name)?,
            auth_provider,
            provider_id: None,
            enabled: true,
            email_verified: false,
            roles: BTreeSet::new(),
            tokens: Vec::new(),
            attributes: Attributes::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild an aggregate from storage, attaching its tokens
    pub fn restore(record: UserRecord, tokens: Vec<Token>) -> Self {
        let mut user = Self {
            id: record.id,
            email: record.email,
            password: record.password,
            first_name: record.first_name,
            last_name: record.last_name,
            auth_provider: record.auth_provider,
            provider_id: record.provider_id,
            enabled: record.enabled,
            email_verified: record.email_verified,
            roles: record.roles,
            tokens: Vec::with_capacity(tokens.len()),
            attributes: record.attributes,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        for mut token in tokens {
            token.attach(user.id);
            user.tokens.push(token);
        }
        user
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> Option<&PasswordHash> {
        self.password.as_ref()
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    pub fn auth_provider(&self) -> AuthProvider {
        self.auth_provider
    }

    /// External provider identifier, only set for federated accounts
    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn roles(&self) -> &BTreeSet<UserRole> {
        &self.roles
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Owned token with the given bearer value
    pub fn token(&self, value: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.value().as_str() == value)
    }

    pub fn valid_tokens(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.is_valid_at(now))
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Optimistic concurrency counter, advanced by the repository on update
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub fn add_role(&mut self, role: UserRole) {
        if self.roles.insert(role) {
            self.touch();
        }
    }

    pub fn remove_role(&mut self, role: UserRole) {
        if self.roles.remove(&role) {
            self.touch();
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    /// Roles as `ROLE_<NAME>` authorities, in role order
    pub fn granted_authorities(&self) -> Vec<GrantedAuthority> {
        self.roles.iter().map(GrantedAuthority::from).collect()
    }

    // ========================================================================
    // Token association
    // ========================================================================

    /// Take ownership of `token` and point its back-reference at this user
    ///
    /// Rejects a token owned by another user, and a second token carrying a
    /// bearer value this user already holds.
    pub fn add_token(&mut self, mut token: Token) -> IdentityResult<&Token> {
        match token.user_id() {
            Some(owner) if owner != self.id => {
                return Err(IdentityError::Conflict(
                    "Token is owned by another user".into(),
                ));
            }
            _ => {}
        }
        if self.token(token.value().as_str()).is_some() {
            return Err(IdentityError::Conflict(
                "Token value already registered for this user".into(),
            ));
        }

        token.attach(self.id);
        let index = self.tokens.len();
        self.tokens.push(token);
        self.touch();
        Ok(&self.tokens[index])
    }

    /// Detach the token with the given value, clearing its back-reference
    pub(crate) fn remove_token(&mut self, value: &str) -> Option<Token> {
        let index = self.tokens.iter().position(|t| t.value().as_str() == value)?;
        let mut token = self.tokens.remove(index);
        token.detach();
        self.touch();
        Some(token)
    }

    /// Revoke a single owned token
    ///
    /// Returns whether the state changed.
    pub fn revoke_token(&mut self, value: &str) -> IdentityResult<bool> {
        let token = self
            .tokens
            .iter_mut()
            .find(|t| t.value().as_str() == value)
            .ok_or(IdentityError::TokenNotFound)?;
        let changed = token.revoke();
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    /// Revoke every token not yet revoked, returning how many changed
    pub fn revoke_all_tokens(&mut self) -> usize {
        self.revoke_where(|_| true)
    }

    /// Revoke every token of one type, returning how many changed
    pub fn revoke_tokens_of_type(&mut self, token_type: TokenType) -> usize {
        self.revoke_where(|t| t.token_type() == token_type)
    }

    fn revoke_where(&mut self, predicate: impl Fn(&Token) -> bool) -> usize {
        let revoked = self
            .tokens
            .iter_mut()
            .filter(|t| predicate(t))
            .map(Token::revoke)
            .filter(|changed| *changed)
            .count();
        if revoked > 0 {
            self.touch();
        }
        revoked
    }

    /// Detach every token that is revoked or expired at `now`
    pub fn purge_invalid_tokens(&mut self, now: DateTime<Utc>) -> Vec<Token> {
        let stale: Vec<String> = self
            .tokens
            .iter()
            .filter(|t| !t.is_valid_at(now))
            .map(|t| t.value().as_str().to_string())
            .collect();

        stale
            .iter()
            .filter_map(|value| self.remove_token(value))
            .collect()
    }

    // ========================================================================
    // Account lifecycle
    // ========================================================================

    /// Disable the account and revoke every owned token
    ///
    /// Returns the number of tokens this call revoked.
    pub fn deactivate_account(&mut self) -> usize {
        self.enabled = false;
        let revoked = self
            .tokens
            .iter_mut()
            .map(Token::revoke)
            .filter(|changed| *changed)
            .count();
        self.touch();

        tracing::info!(
            user_id = %self.id,
            tokens_revoked = revoked,
            "Account deactivated"
        );
        revoked
    }

    /// Re-enable the account. Tokens revoked earlier stay revoked.
    pub fn reactivate_account(&mut self) {
        if !self.enabled {
            self.enabled = true;
            self.touch();
        }
    }

    pub fn verify_email(&mut self) {
        if !self.email_verified {
            self.email_verified = true;
            self.touch();
        }
    }

    /// Replace display names; roles and tokens are untouched
    pub fn update_profile(&mut self, first_name: &str, last_name: &str) -> IdentityResult<()> {
        let first_name = PersonName::new("First name", first_name)?;
        let last_name = PersonName::new("Last name", last_name)?;
        self.first_name = first_name;
        self.last_name = last_name;
        self.touch();
        Ok(())
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Merge fresh provider claims over the stored ones
    pub fn merge_attributes(&mut self, attributes: Attributes) {
        self.attributes.merge(attributes);
        self.touch();
    }

    pub fn replace_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
        self.touch();
    }

    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
