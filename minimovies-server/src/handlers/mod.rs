pub mod health;
pub mod reviews;
pub mod viewing_sessions;
pub mod watch_history;
