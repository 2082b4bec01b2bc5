//! Repository traits and implementations.

pub mod memory;
pub mod token;

pub use memory::MemoryTokenStore;
pub use token::{PgTokenStore, TokenRecord, TokenRow, TokenStore};
