pub mod movies;
pub mod profiles;
pub mod reviews;
pub mod sessions;
pub mod watch_history;
