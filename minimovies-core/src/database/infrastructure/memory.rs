use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use minimovies_model::{
    MovieDetails, MovieId, NewReview, Review, ReviewId, UserId,
    WatchHistoryEntry, WatchProgress,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    database::ports::{
        MovieRepository, ProfileRepository, ReviewRepository,
        SessionAuthenticator, WatchHistoryRepository,
        sessions::hash_session_token,
    },
    error::Result,
};

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Process-local implementation of every port.
///
/// Mirrors the PostgreSQL adapter's semantics: upserts keyed by
/// `(user, movie)`, newest-first listings, profile names omitted when blank.
#[derive(Default)]
pub struct InMemoryStore {
    movies: RwLock<HashMap<MovieId, MovieDetails>>,
    profiles: RwLock<HashMap<UserId, Option<String>>>,
    watch_history: RwLock<HashMap<(UserId, MovieId), WatchProgress>>,
    reviews: RwLock<Vec<Review>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

/// Identifiers created by [`InMemoryStore::with_demo_data`].
#[derive(Debug, Clone)]
pub struct DemoSeed {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub session_token: String,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with one movie, one named viewer and a live session for them.
    pub async fn with_demo_data() -> (Self, DemoSeed) {
        let store = Self::new();
        let user_id = UserId::new();
        let movie_id = MovieId::new();

        store
            .insert_movie(MovieDetails {
                id: movie_id,
                title: "Big Buck Bunny".to_string(),
                description: "A giant rabbit takes on three bullies."
                    .to_string(),
                video_url: "https://www.youtube.com/watch?v=aqz-KE-bpKQ"
                    .to_string(),
                thumbnail_url: "https://i.ytimg.com/vi/aqz-KE-bpKQ/hqdefault.jpg"
                    .to_string(),
            })
            .await;
        store
            .upsert_profile(user_id, Some("Demo Viewer".to_string()))
            .await;
        let session_token =
            store.issue_session(user_id, Duration::days(7)).await;

        (
            store,
            DemoSeed {
                user_id,
                movie_id,
                session_token,
            },
        )
    }

    pub async fn insert_movie(&self, movie: MovieDetails) {
        self.movies.write().await.insert(movie.id, movie);
    }

    pub async fn upsert_profile(
        &self,
        user_id: UserId,
        full_name: Option<String>,
    ) {
        self.profiles.write().await.insert(user_id, full_name);
    }

    /// Create a session and return the raw bearer token.
    pub async fn issue_session(&self, user_id: UserId, ttl: Duration) -> String {
        let token = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        self.sessions.write().await.insert(
            hash_session_token(&token),
            SessionRecord {
                user_id,
                expires_at: Utc::now() + ttl,
            },
        );
        token
    }

    /// Store a review with an explicit timestamp.
    pub async fn insert_review_at(
        &self,
        review: NewReview,
        created_at: DateTime<Utc>,
    ) -> Review {
        let stored = Review {
            id: ReviewId::new(),
            user_id: review.user_id,
            movie_id: review.movie_id,
            rating: review.rating,
            comment: review.comment,
            created_at,
        };
        self.reviews.write().await.push(stored.clone());
        stored
    }

    pub async fn watch_history_len(&self) -> usize {
        self.watch_history.read().await.len()
    }
}

#[async_trait]
impl WatchHistoryRepository for InMemoryStore {
    async fn upsert_progress(&self, progress: &WatchProgress) -> Result<()> {
        self.watch_history
            .write()
            .await
            .insert(progress.key(), progress.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchHistoryEntry>> {
        let history = self.watch_history.read().await;
        let movies = self.movies.read().await;

        let mut entries: Vec<WatchHistoryEntry> = history
            .values()
            .filter(|progress| progress.user_id == user_id)
            .map(|progress| WatchHistoryEntry {
                movie_id: progress.movie_id,
                watched_at: progress.watched_at,
                progress_seconds: progress.progress_seconds,
                movie: movies.get(&progress.movie_id).map(MovieDetails::summary),
            })
            .collect();
        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        Ok(entries)
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Result<Option<WatchProgress>> {
        Ok(self
            .watch_history
            .read()
            .await
            .get(&(user_id, movie_id))
            .cloned())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn list_for_movie(&self, movie_id: MovieId) -> Result<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .reviews
            .read()
            .await
            .iter()
            .filter(|review| review.movie_id == movie_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        Ok(reviews)
    }

    async fn insert(&self, review: NewReview) -> Result<Review> {
        Ok(self.insert_review_at(review, Utc::now()).await)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn display_names(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, String>> {
        let profiles = self.profiles.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| {
                let name = profiles.get(id)?.as_deref()?.trim();
                (!name.is_empty()).then(|| (*id, name.to_string()))
            })
            .collect())
    }
}

#[async_trait]
impl MovieRepository for InMemoryStore {
    async fn get_details(
        &self,
        movie_id: MovieId,
    ) -> Result<Option<MovieDetails>> {
        Ok(self.movies.read().await.get(&movie_id).cloned())
    }
}

#[async_trait]
impl SessionAuthenticator for InMemoryStore {
    async fn resolve(&self, token: &str) -> Result<Option<UserId>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&hash_session_token(token))
            .filter(|record| record.expires_at > Utc::now())
            .map(|record| record.user_id))
    }
}
