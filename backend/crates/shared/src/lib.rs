//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! identity service crates:
//! - Common error types and result aliases
//! - Typed identifiers for the User aggregate and its Tokens
//!
//! Only things that are hard to change and mean the same thing in every
//! crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
