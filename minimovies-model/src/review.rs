use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, Result},
    ids::{MovieId, ReviewId, UserId},
};

/// Star rating, always an integer in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "i64", into = "u8")
)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ModelError::RatingOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A stored review. Reviews are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: Rating,
    /// Free text; `None` and blank strings both mean "no comment".
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// The comment, if it carries any non-whitespace text.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Input for a review submission, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: Rating,
    pub comment: Option<String>,
}

/// A review annotated with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReviewWithAuthor {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub review: Review,
    /// Name from the author's profile, when one resolved.
    pub profile_name: Option<String>,
    /// `profile_name`, or the synthesized fallback label.
    pub author_name: String,
}

/// Display-ready review list for a movie plus its aggregate rating.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReviewSummary {
    pub movie_id: MovieId,
    /// Newest first.
    pub reviews: Vec<ReviewWithAuthor>,
    /// Arithmetic mean of all ratings; `0.0` when there are none.
    pub average_rating: f64,
}

impl ReviewSummary {
    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}
