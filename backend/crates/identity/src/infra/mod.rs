//! Infrastructure Layer
//!
//! Repository implementations and the attribute column codec.

pub mod attribute_codec;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use attribute_codec::AttributeCodec;
pub use memory::InMemoryUserRepository;
#[cfg(feature = "postgres")]
pub use postgres::PgUserRepository;
