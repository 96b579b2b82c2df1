//! Value Object Module

pub mod attributes;
pub mod auth_provider;
pub mod email;
pub mod password_hash;
pub mod person_name;
pub mod token_type;
pub mod token_value;
pub mod user_role;

pub use kernel::id::{TokenId, UserId};
