use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::InMemoryStore;
#[cfg(feature = "database")]
use crate::database::PostgresDatabase;
use crate::database::ports::{
    MovieRepository, ProfileRepository, ReviewRepository,
    SessionAuthenticator, WatchHistoryRepository,
};
use crate::reviews::{ReviewAggregator, ReviewSubmitter};
use crate::watch::WatchHistoryService;

/// Aggregates the repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub watch_history: Arc<dyn WatchHistoryRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub movies: Arc<dyn MovieRepository>,
    pub sessions: Arc<dyn SessionAuthenticator>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field(
                "watch_history",
                &type_name_of_val(self.watch_history.as_ref()),
            )
            .field("reviews", &type_name_of_val(self.reviews.as_ref()))
            .field("profiles", &type_name_of_val(self.profiles.as_ref()))
            .field("movies", &type_name_of_val(self.movies.as_ref()))
            .field("sessions", &type_name_of_val(self.sessions.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    #[cfg(feature = "database")]
    pub fn from_postgres(db: &PostgresDatabase) -> Self {
        Self {
            watch_history: db.watch_history(),
            reviews: db.reviews(),
            profiles: db.profiles(),
            movies: db.movies(),
            sessions: db.sessions(),
        }
    }

    /// Every port backed by the same in-memory store.
    pub fn from_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            watch_history: store.clone(),
            reviews: store.clone(),
            profiles: store.clone(),
            movies: store.clone(),
            sessions: store,
        }
    }

    pub fn services(&self) -> AppServices {
        AppServices {
            watch_history: WatchHistoryService::new(self.watch_history.clone()),
            review_aggregator: ReviewAggregator::new(
                self.reviews.clone(),
                self.profiles.clone(),
            ),
            review_submitter: ReviewSubmitter::new(
                self.reviews.clone(),
                self.movies.clone(),
            ),
        }
    }
}

/// Application services wired over one [`AppUnitOfWork`].
#[derive(Debug, Clone)]
pub struct AppServices {
    pub watch_history: WatchHistoryService,
    pub review_aggregator: ReviewAggregator,
    pub review_submitter: ReviewSubmitter,
}

#[cfg(test)]
mod tests {
    use minimovies_model::ProgressSeconds;

    use super::*;
    use crate::watch::AddOutcome;

    #[tokio::test]
    async fn memory_ports_share_one_store() {
        let (store, seed) = InMemoryStore::with_demo_data().await;
        let store = Arc::new(store);
        let uow = AppUnitOfWork::from_memory(store.clone());
        let services = uow.services();

        let viewer = uow.sessions.resolve(&seed.session_token).await.unwrap();
        assert_eq!(viewer, Some(seed.user_id));

        let outcome = services
            .watch_history
            .add_to_history(viewer, seed.movie_id, ProgressSeconds::ZERO)
            .await;
        assert_eq!(outcome, AddOutcome::Recorded);

        let history = services.watch_history.list(viewer).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].movie.as_ref().map(|m| m.title.as_str()),
            Some("Big Buck Bunny")
        );

        let debug = format!("{uow:?}");
        assert!(debug.starts_with("AppUnitOfWork"));
        assert!(debug.contains("WatchHistoryRepository"));
    }
}
