//! Core of the MiniMovies watch-progress tracker and review aggregator.
//!
//! - [`player`] validates and decodes messages from the embedded player.
//! - [`watch`] turns those messages into at most one "started watching"
//!   write per movie page and owns the best-effort history writer.
//! - [`reviews`] loads a movie's reviews with author names and the mean
//!   rating, formats them for display and accepts new ones.
//! - [`database`] holds the persistence ports and their PostgreSQL and
//!   in-memory adapters; [`application`] wires them into services.

pub mod application;
pub mod database;
pub mod error;
pub mod player;
pub mod reviews;
pub mod watch;

pub use application::{AppServices, AppUnitOfWork};
pub use error::{CoreError, Result};

/// Embedded schema migrations.
#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
