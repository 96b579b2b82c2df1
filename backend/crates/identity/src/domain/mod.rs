//! Domain Layer
//!
//! Contains the user aggregate, value objects, principal views and the
//! repository port.

pub mod entity;
pub mod principal;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    token::{Token, TokenState},
    user::{User, UserRecord},
};
pub use principal::{GrantedAuthority, OAuth2Principal, Principal};
pub use repository::UserRepository;
