#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum_test::TestServer;
use minimovies_core::{
    AppUnitOfWork, Result,
    database::{
        InMemoryStore,
        infrastructure::memory::DemoSeed,
        ports::{ReviewRepository, WatchHistoryRepository},
    },
};
use minimovies_model::{
    MovieDetails, MovieId, NewReview, Review, UserId, WatchHistoryEntry,
    WatchProgress,
};
use minimovies_server::{AppState, create_app, infra::config::Config};

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Counts upserts that reached the in-memory store.
#[derive(Debug)]
pub struct CountingHistory {
    inner: Arc<InMemoryStore>,
    upserts: AtomicUsize,
}

impl CountingHistory {
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WatchHistoryRepository for CountingHistory {
    async fn upsert_progress(&self, progress: &WatchProgress) -> Result<()> {
        let result = self.inner.upsert_progress(progress).await;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchHistoryEntry>> {
        self.inner.list_for_user(user_id).await
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Result<Option<WatchProgress>> {
        self.inner.get_progress(user_id, movie_id).await
    }
}

/// Review store that takes its time answering.
#[derive(Debug)]
pub struct SlowReviews {
    pub inner: Arc<InMemoryStore>,
    pub delay: Duration,
}

#[async_trait]
impl ReviewRepository for SlowReviews {
    async fn list_for_movie(&self, movie_id: MovieId) -> Result<Vec<Review>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_for_movie(movie_id).await
    }

    async fn insert(&self, review: NewReview) -> Result<Review> {
        self.inner.insert(review).await
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub history: Arc<CountingHistory>,
    pub seed: DemoSeed,
}

impl TestApp {
    pub fn token(&self) -> String {
        bearer(&self.seed.session_token)
    }

    pub async fn add_movie(&self, title: &str, video_url: &str) -> MovieId {
        let id = MovieId::new();
        self.store
            .insert_movie(MovieDetails {
                id,
                title: title.to_string(),
                description: String::new(),
                video_url: video_url.to_string(),
                thumbnail_url: format!("https://img.example/{id}.jpg"),
            })
            .await;
        id
    }

    /// Wait for background history writes to land.
    pub async fn wait_for_upserts(&self, expected: usize) {
        for _ in 0..100 {
            if self.history.upserts() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {expected} upserts, saw {}",
            self.history.upserts()
        );
    }

    /// Give spawned writes a chance to run before asserting none did.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_, _| {}).await
}

/// Build the app over a demo in-memory store. `customize` may swap ports
/// before the state is assembled.
pub async fn spawn_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut AppUnitOfWork, &Arc<InMemoryStore>),
{
    spawn_app_configured(Config::default(), customize).await
}

pub async fn spawn_app_configured<F>(config: Config, customize: F) -> TestApp
where
    F: FnOnce(&mut AppUnitOfWork, &Arc<InMemoryStore>),
{
    let (store, seed) = InMemoryStore::with_demo_data().await;
    let store = Arc::new(store);
    let history = Arc::new(CountingHistory {
        inner: Arc::clone(&store),
        upserts: AtomicUsize::new(0),
    });

    let mut unit_of_work = AppUnitOfWork::from_memory(Arc::clone(&store));
    unit_of_work.watch_history =
        history.clone() as Arc<dyn WatchHistoryRepository>;
    customize(&mut unit_of_work, &store);

    let state = AppState::new(unit_of_work, config);
    let server = TestServer::new(create_app(state.clone())).unwrap();

    TestApp {
        server,
        state,
        store,
        history,
        seed,
    }
}
