//! PostgreSQL Repository Implementation
//!
//! Schema lives in `migrations/0001_identity.sql`. An aggregate spans three
//! tables: `users`, `user_roles` and `user_tokens`. The attributes column
//! holds the [`AttributeCodec`] text form.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    token::Token,
    user::{User, UserRecord},
};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    TokenId, UserId, auth_provider::AuthProvider, email::Email, password_hash::PasswordHash,
    person_name::PersonName, token_type::TokenType, token_value::TokenValue, user_role::UserRole,
};
use crate::error::{IdentityError, IdentityResult};
use crate::infra::attribute_codec::AttributeCodec;

const USER_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    first_name,
    last_name,
    auth_provider,
    provider_id,
    enabled,
    email_verified,
    attributes,
    version,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete tokens that expired before `cutoff`
    pub async fn cleanup_expired_tokens(&self, cutoff: DateTime<Utc>) -> IdentityResult<u64> {
        let deleted = sqlx::query("DELETE FROM user_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired tokens");

        Ok(deleted)
    }

    async fn find_one(&self, filter: &str, bind: QueryBind<'_>) -> IdentityResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter}");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match bind {
            QueryBind::Uuid(id) => query.bind(id),
            QueryBind::Text(text) => query.bind(text),
            QueryBind::Provider(provider, provider_id) => query.bind(provider).bind(provider_id),
        };

        match query.fetch_optional(&self.pool).await? {
            Some(row) => self.load(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Attach roles and tokens to a fetched user row
    async fn load(&self, row: UserRow) -> IdentityResult<User> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let tokens = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, token_value, token_type, revoked, expires_at, created_at
            FROM user_tokens
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let tokens = tokens
            .into_iter()
            .map(TokenRow::into_token)
            .collect::<IdentityResult<Vec<_>>>()?;

        Ok(User::restore(row.into_record(roles)?, tokens))
    }

    async fn write_children(tx: &mut Transaction<'_, Postgres>, user: &User) -> IdentityResult<()> {
        for role in user.roles() {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(user.id().as_uuid())
                .bind(role.name())
                .execute(&mut **tx)
                .await?;
        }

        for token in user.tokens() {
            sqlx::query(
                r#"
                INSERT INTO user_tokens (
                    id,
                    user_id,
                    token_value,
                    token_type,
                    revoked,
                    expires_at,
                    created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(token.id().as_uuid())
            .bind(user.id().as_uuid())
            .bind(token.value().as_str())
            .bind(token.token_type().name())
            .bind(token.is_revoked())
            .bind(token.expires_at())
            .bind(token.created_at())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

enum QueryBind<'a> {
    Uuid(Uuid),
    Text(&'a str),
    Provider(&'a str, &'a str),
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        let attributes = AttributeCodec::encode(Some(user.attributes()))?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                password_hash,
                first_name,
                last_name,
                auth_provider,
                provider_id,
                enabled,
                email_verified,
                attributes,
                version,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.password().map(PasswordHash::as_str))
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.auth_provider().name())
        .bind(user.provider_id())
        .bind(user.is_enabled())
        .bind(user.is_email_verified())
        .bind(&attributes)
        .bind(user.version())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&mut *tx)
        .await?;

        Self::write_children(&mut tx, user).await?;
        tx.commit().await?;

        tracing::debug!(user_id = %user.id(), "User row inserted");
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        self.find_one("id = $1", QueryBind::Uuid(user_id.into_uuid()))
            .await
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>> {
        self.find_one("email = $1", QueryBind::Text(email.as_str()))
            .await
    }

    async fn find_by_token(&self, value: &str) -> IdentityResult<Option<User>> {
        self.find_one(
            "id = (SELECT user_id FROM user_tokens WHERE token_value = $1)",
            QueryBind::Text(value),
        )
        .await
    }

    async fn find_by_provider(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> IdentityResult<Option<User>> {
        self.find_one(
            "auth_provider = $1 AND provider_id = $2",
            QueryBind::Provider(provider.name(), provider_id),
        )
        .await
    }

    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &mut User) -> IdentityResult<()> {
        let attributes = AttributeCodec::encode(Some(user.attributes()))?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE users SET
                email = $3,
                password_hash = $4,
                first_name = $5,
                last_name = $6,
                auth_provider = $7,
                provider_id = $8,
                enabled = $9,
                email_verified = $10,
                attributes = $11,
                updated_at = $12,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.version())
        .bind(user.email().as_str())
        .bind(user.password().map(PasswordHash::as_str))
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.auth_provider().name())
        .bind(user.provider_id())
        .bind(user.is_enabled())
        .bind(user.is_email_verified())
        .bind(&attributes)
        .bind(user.updated_at())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(user.id().as_uuid())
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(if exists {
                tracing::warn!(user_id = %user.id(), version = user.version(), "Rejected stale user update");
                IdentityError::Conflict("User was modified concurrently".into())
            } else {
                IdentityError::NotFound(format!("user {}", user.id()))
            });
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user.id().as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
            .bind(user.id().as_uuid())
            .execute(&mut *tx)
            .await?;
        Self::write_children(&mut tx, user).await?;
        tx.commit().await?;

        user.set_version(user.version() + 1);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> IdentityResult<()> {
        // Roles and tokens go with the user via ON DELETE CASCADE
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(IdentityError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    first_name: String,
    last_name: String,
    auth_provider: String,
    provider_id: Option<String>,
    enabled: bool,
    email_verified: bool,
    attributes: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self, roles: Vec<String>) -> IdentityResult<UserRecord> {
        let roles = roles
            .iter()
            .map(|name| {
                UserRole::from_name(name)
                    .ok_or_else(|| IdentityError::Internal(format!("Invalid role: {}", name)))
            })
            .collect::<IdentityResult<BTreeSet<_>>>()?;

        let auth_provider = AuthProvider::parse(&self.auth_provider)
            .map_err(|e| IdentityError::Internal(format!("Invalid auth_provider: {}", e)))?;

        Ok(UserRecord {
            id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            password: PasswordHash::optional(self.password_hash.as_deref()),
            first_name: PersonName::from_db(self.first_name),
            last_name: PersonName::from_db(self.last_name),
            auth_provider,
            provider_id: self.provider_id,
            enabled: self.enabled,
            email_verified: self.email_verified,
            roles,
            attributes: AttributeCodec::decode(self.attributes.as_deref())?,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    token_value: String,
    token_type: String,
    revoked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TokenRow {
    fn into_token(self) -> IdentityResult<Token> {
        let token_type = TokenType::from_name(&self.token_type).ok_or_else(|| {
            IdentityError::Internal(format!("Invalid token_type: {}", self.token_type))
        })?;

        Ok(Token::restore(
            TokenId::from_uuid(self.id),
            TokenValue::from_db(self.token_value),
            token_type,
            self.revoked,
            self.expires_at,
            self.created_at,
        ))
    }
}
