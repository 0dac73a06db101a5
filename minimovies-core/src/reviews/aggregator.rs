use std::{collections::HashMap, fmt, sync::Arc};

use minimovies_model::{
    MovieId, Review, ReviewSummary, ReviewWithAuthor, UserId,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    database::ports::{ProfileRepository, ReviewRepository},
    error::{CoreError, Result},
};

const FALLBACK_PREFIX: &str = "User ";
const FALLBACK_ID_CHARS: usize = 6;

/// Label used for an author whose profile has no name.
pub fn fallback_author_name(user_id: &UserId) -> String {
    let prefix: String =
        user_id.to_string().chars().take(FALLBACK_ID_CHARS).collect();
    format!("{FALLBACK_PREFIX}{prefix}")
}

/// Builds [`ReviewSummary`] values from the review and profile stores.
#[derive(Clone)]
pub struct ReviewAggregator {
    reviews: Arc<dyn ReviewRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl fmt::Debug for ReviewAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewAggregator")
            .field("reviews", &std::any::type_name_of_val(self.reviews.as_ref()))
            .field(
                "profiles",
                &std::any::type_name_of_val(self.profiles.as_ref()),
            )
            .finish()
    }
}

impl ReviewAggregator {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self { reviews, profiles }
    }

    /// Load every review for `movie_id`, newest first, with author names
    /// and the mean rating.
    ///
    /// A failed review fetch fails the load. A failed profile lookup only
    /// costs the names: every author gets the fallback label instead.
    pub async fn load_reviews(&self, movie_id: MovieId) -> Result<ReviewSummary> {
        let reviews = self.reviews.list_for_movie(movie_id).await?;

        let mut authors: Vec<UserId> =
            reviews.iter().map(|review| review.user_id).collect();
        authors.sort_unstable();
        authors.dedup();

        let names = if authors.is_empty() {
            HashMap::new()
        } else {
            match self.profiles.display_names(&authors).await {
                Ok(names) => names,
                Err(error) => {
                    warn!(
                        %movie_id,
                        authors = authors.len(),
                        %error,
                        "profile lookup failed, using fallback author names"
                    );
                    HashMap::new()
                }
            }
        };

        let average_rating = average_rating(&reviews);
        let reviews = reviews
            .into_iter()
            .map(|review| annotate(review, &names))
            .collect();

        Ok(ReviewSummary {
            movie_id,
            reviews,
            average_rating,
        })
    }

    /// [`Self::load_reviews`], abandoned as soon as `cancel` fires.
    ///
    /// A cancelled load returns [`CoreError::Cancelled`] and its partial
    /// results are dropped.
    pub async fn load_reviews_until_cancelled(
        &self,
        movie_id: MovieId,
        cancel: &CancellationToken,
    ) -> Result<ReviewSummary> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%movie_id, "review load cancelled");
                Err(CoreError::Cancelled(format!("review load for movie {movie_id}")))
            }
            summary = self.load_reviews(movie_id) => summary,
        }
    }
}

fn annotate(review: Review, names: &HashMap<UserId, String>) -> ReviewWithAuthor {
    let profile_name = names.get(&review.user_id).cloned();
    let author_name = profile_name
        .clone()
        .unwrap_or_else(|| fallback_author_name(&review.user_id));
    ReviewWithAuthor {
        review,
        profile_name,
        author_name,
    }
}

fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u64 = reviews
        .iter()
        .map(|review| u64::from(review.rating.value()))
        .sum();
    total as f64 / reviews.len() as f64
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use minimovies_model::{NewReview, Rating};
    use uuid::Uuid;

    use super::*;
    use crate::database::{
        InMemoryStore,
        ports::{profiles::MockProfileRepository, reviews::MockReviewRepository},
    };

    async fn seed(
        store: &InMemoryStore,
        movie: MovieId,
        author: UserId,
        rating: i64,
        minute: u32,
    ) {
        store
            .insert_review_at(
                NewReview {
                    user_id: author,
                    movie_id: movie,
                    rating: Rating::new(rating).unwrap(),
                    comment: None,
                },
                Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap(),
            )
            .await;
    }

    fn aggregator_over(store: &Arc<InMemoryStore>) -> ReviewAggregator {
        ReviewAggregator::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn averages_ratings_and_keeps_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let movie = MovieId::new();
        let alice = UserId::new();
        let bob = UserId::new();
        store.upsert_profile(alice, Some("Alice".into())).await;

        seed(&store, movie, alice, 5, 1).await;
        seed(&store, movie, bob, 3, 2).await;
        seed(&store, movie, alice, 4, 3).await;
        seed(&store, MovieId::new(), bob, 1, 4).await;

        let summary = aggregator_over(&store).load_reviews(movie).await.unwrap();

        assert_eq!(summary.average_rating, 4.0);
        let ratings: Vec<u8> = summary
            .reviews
            .iter()
            .map(|r| r.review.rating.value())
            .collect();
        assert_eq!(ratings, vec![4, 3, 5]);
        assert_eq!(summary.reviews[0].author_name, "Alice");
        assert_eq!(summary.reviews[1].profile_name, None);
        assert_eq!(summary.reviews[1].author_name, fallback_author_name(&bob));
    }

    #[tokio::test]
    async fn empty_movie_averages_to_zero_without_profile_lookup() {
        let mut reviews = MockReviewRepository::new();
        reviews.expect_list_for_movie().returning(|_| Ok(Vec::new()));
        let mut profiles = MockProfileRepository::new();
        profiles.expect_display_names().never();

        let aggregator =
            ReviewAggregator::new(Arc::new(reviews), Arc::new(profiles));
        let summary = aggregator.load_reviews(MovieId::new()).await.unwrap();

        assert!(summary.is_empty());
        assert_eq!(summary.average_rating, 0.0);
    }

    #[tokio::test]
    async fn profile_lookup_is_batched_over_distinct_authors() {
        let store = Arc::new(InMemoryStore::new());
        let movie = MovieId::new();
        let author = UserId::new();
        for minute in 0..3 {
            seed(&store, movie, author, 5, minute).await;
        }
        let listed = ReviewRepository::list_for_movie(store.as_ref(), movie)
            .await
            .unwrap();

        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_list_for_movie()
            .returning(move |_| Ok(listed.clone()));
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_display_names()
            .times(1)
            .withf(move |ids| ids.len() == 1 && ids[0] == author)
            .returning(move |_| Ok(HashMap::from([(author, "Solo".to_string())])));

        let aggregator =
            ReviewAggregator::new(Arc::new(reviews), Arc::new(profiles));
        let summary = aggregator.load_reviews(movie).await.unwrap();

        assert_eq!(summary.review_count(), 3);
        assert!(summary.reviews.iter().all(|r| r.author_name == "Solo"));
    }

    #[tokio::test]
    async fn profile_failure_degrades_to_fallback_names() {
        let store = Arc::new(InMemoryStore::new());
        let movie = MovieId::new();
        let author = UserId(Uuid::parse_str("3f2a9c1e-0000-7000-8000-000000000000").unwrap());
        store.upsert_profile(author, Some("Named".into())).await;
        seed(&store, movie, author, 2, 0).await;

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_display_names()
            .returning(|_| Err(CoreError::Database("profiles offline".into())));

        let aggregator = ReviewAggregator::new(store.clone(), Arc::new(profiles));
        let summary = aggregator.load_reviews(movie).await.unwrap();

        assert_eq!(summary.reviews[0].author_name, "User 3f2a9c");
        assert_eq!(summary.average_rating, 2.0);
    }

    #[tokio::test]
    async fn review_fetch_failure_aborts_the_load() {
        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_list_for_movie()
            .returning(|_| Err(CoreError::Database("timeout".into())));
        let aggregator = ReviewAggregator::new(
            Arc::new(reviews),
            Arc::new(MockProfileRepository::new()),
        );

        let err = aggregator.load_reviews(MovieId::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::Database(_)));
    }

    #[tokio::test]
    async fn cancelled_load_reports_cancellation() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator_over(&store);
        let token = CancellationToken::new();
        token.cancel();

        let err = aggregator
            .load_reviews_until_cancelled(MovieId::new(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled(_)));
    }

    #[tokio::test]
    async fn cancellation_during_a_slow_load_wins() {
        let mut reviews = MockReviewRepository::new();
        reviews.expect_list_for_movie().returning(|_| Ok(Vec::new()));
        let slow = SlowReviews(Arc::new(reviews));
        let aggregator = ReviewAggregator::new(
            Arc::new(slow),
            Arc::new(MockProfileRepository::new()),
        );
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = aggregator
            .load_reviews_until_cancelled(MovieId::new(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled(_)));
    }

    struct SlowReviews(Arc<MockReviewRepository>);

    #[async_trait::async_trait]
    impl ReviewRepository for SlowReviews {
        async fn list_for_movie(&self, movie_id: MovieId) -> Result<Vec<Review>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.0.list_for_movie(movie_id).await
        }

        async fn insert(&self, review: NewReview) -> Result<Review> {
            self.0.insert(review).await
        }
    }
}
