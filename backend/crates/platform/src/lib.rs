//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the identity service:
//! - OS-backed random bytes and opaque bearer token generation
//! - SHA-256 fingerprints for logging credentials without exposing them

pub mod crypto;
