//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::movies::PostgresMovieRepository;
pub use repositories::profiles::PostgresProfileRepository;
pub use repositories::reviews::PostgresReviewRepository;
pub use repositories::sessions::PostgresSessionAuthenticator;
pub use repositories::watch_history::PostgresWatchHistoryRepository;
