pub mod app_state;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod responses;
pub mod viewing_sessions;
