//! Identity Core
//!
//! Clean Architecture structure:
//! - `domain/` - User aggregate, tokens, value objects, repository port
//! - `application/` - Use cases and configuration
//! - `infra/` - Attribute codec and repository implementations
//!
//! ## Features
//! - Local, provisioned and federated (Google, GitHub) accounts
//! - Opaque access/refresh tokens owned by their user
//! - Account deactivation revokes every token in one step
//! - Role-based authorities (`ROLE_USER`, `ROLE_ADMIN`, ...)
//!
//! ## Cargo features
//! - `postgres` - sqlx-backed [`PgUserRepository`]

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use domain::{Token, TokenState, User, UserRepository};
pub use error::{IdentityError, IdentityResult};
pub use infra::{AttributeCodec, InMemoryUserRepository};
#[cfg(feature = "postgres")]
pub use infra::PgUserRepository;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::principal::*;
    pub use crate::domain::value_object::*;
}

#[cfg(test)]
mod tests;
