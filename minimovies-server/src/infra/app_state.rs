use std::{fmt, sync::Arc};

use minimovies_core::{AppServices, AppUnitOfWork};

use crate::infra::{
    config::Config, viewing_sessions::ViewingSessionRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub services: Arc<AppServices>,
    pub config: Arc<Config>,
    pub viewing_sessions: Arc<ViewingSessionRegistry>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("unit_of_work", &self.unit_of_work)
            .field("viewing_sessions", &self.viewing_sessions.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(unit_of_work: AppUnitOfWork, config: Config) -> Self {
        let services = unit_of_work.services();
        let viewing_sessions = ViewingSessionRegistry::new(
            config.trusted_origin(),
            config.viewing_sessions.idle_ttl,
        );
        Self {
            unit_of_work: Arc::new(unit_of_work),
            services: Arc::new(services),
            config: Arc::new(config),
            viewing_sessions: Arc::new(viewing_sessions),
        }
    }

    pub fn unit_of_work(&self) -> &AppUnitOfWork {
        &self.unit_of_work
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
