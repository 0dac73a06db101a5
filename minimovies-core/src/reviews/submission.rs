use std::{fmt, sync::Arc};

use minimovies_model::{MovieId, NewReview, Rating, Review, UserId};
use tracing::info;

use crate::{
    database::ports::{MovieRepository, ReviewRepository},
    error::{CoreError, Result},
};

/// Accepts new reviews from signed-in viewers.
#[derive(Clone)]
pub struct ReviewSubmitter {
    reviews: Arc<dyn ReviewRepository>,
    movies: Arc<dyn MovieRepository>,
}

impl fmt::Debug for ReviewSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewSubmitter")
            .field("reviews", &std::any::type_name_of_val(self.reviews.as_ref()))
            .field("movies", &std::any::type_name_of_val(self.movies.as_ref()))
            .finish()
    }
}

impl ReviewSubmitter {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        movies: Arc<dyn MovieRepository>,
    ) -> Self {
        Self { reviews, movies }
    }

    /// Store a review. `rating` is the raw form value, so an unselected
    /// rating of `0` is rejected here like any other out-of-range value.
    pub async fn submit(
        &self,
        viewer: Option<UserId>,
        movie_id: MovieId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review> {
        let user_id = viewer.ok_or(CoreError::Unauthenticated)?;
        let rating = Rating::new(rating)?;

        if self.movies.get_details(movie_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("movie {movie_id}")));
        }

        let comment = comment
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        let review = self
            .reviews
            .insert(NewReview {
                user_id,
                movie_id,
                rating,
                comment,
            })
            .await?;

        info!(
            review_id = %review.id,
            %movie_id,
            %user_id,
            rating = review.rating.value(),
            "review submitted"
        );
        Ok(review)
    }
}
