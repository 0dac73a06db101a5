//! Persistence ports and their adapters.
//!
//! Application services only see the traits in [`ports`]. The PostgreSQL
//! adapter is the production backend; the in-memory adapter backs ephemeral
//! demo runs and tests.

pub mod infrastructure;
pub mod ports;

#[cfg(feature = "database")]
pub mod postgres;

#[cfg(feature = "database")]
pub use postgres::PostgresDatabase;

pub use infrastructure::memory::InMemoryStore;
