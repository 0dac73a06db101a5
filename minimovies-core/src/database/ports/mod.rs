//! Repository traits for the external persistence and auth collaborators.

pub mod movies;
pub mod profiles;
pub mod reviews;
pub mod sessions;
pub mod watch_history;

pub use movies::MovieRepository;
pub use profiles::ProfileRepository;
pub use reviews::ReviewRepository;
pub use sessions::SessionAuthenticator;
pub use watch_history::WatchHistoryRepository;
