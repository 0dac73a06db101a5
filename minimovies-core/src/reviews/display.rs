use std::fmt;

use minimovies_model::{MovieId, ReviewId, ReviewSummary, ReviewWithAuthor};
use serde::Serialize;

pub const NO_REVIEWS_LABEL: &str = "No reviews yet";
pub const EMPTY_LIST_MESSAGE: &str =
    "No reviews yet. Be the first to review this movie!";
pub const NO_COMMENT_MARKER: &str = "No review provided";

const STAR_COUNT: u8 = 5;

/// Heading text for the aggregate rating.
///
/// An empty list never renders as "0 out of 5".
pub fn rating_label(average: f64, count: usize) -> String {
    if count == 0 {
        return NO_REVIEWS_LABEL.to_string();
    }
    let noun = if count == 1 { "review" } else { "reviews" };
    format!("{average:.1} out of 5 ({count} {noun})")
}

/// Number of stars lit for an aggregate rating.
pub fn filled_stars(average: f64) -> u8 {
    (0..STAR_COUNT).filter(|i| f64::from(*i) < average).count() as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum CommentDisplay {
    Text(String),
    NotProvided,
}

impl CommentDisplay {
    pub fn for_review(review: &ReviewWithAuthor) -> Self {
        match review.review.comment_text() {
            Some(text) => CommentDisplay::Text(text.to_string()),
            None => CommentDisplay::NotProvided,
        }
    }
}

impl fmt::Display for CommentDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentDisplay::Text(text) => write!(f, "\"{text}\""),
            CommentDisplay::NotProvided => f.write_str(NO_COMMENT_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCard {
    pub review_id: ReviewId,
    pub author_name: String,
    /// `YYYY-MM-DD`, UTC.
    pub posted_on: String,
    pub rating: u8,
    pub comment: CommentDisplay,
    pub comment_label: String,
}

impl From<&ReviewWithAuthor> for ReviewCard {
    fn from(review: &ReviewWithAuthor) -> Self {
        let comment = CommentDisplay::for_review(review);
        Self {
            review_id: review.review.id,
            author_name: review.author_name.clone(),
            posted_on: review.review.created_at.format("%Y-%m-%d").to_string(),
            rating: review.review.rating.value(),
            comment_label: comment.to_string(),
            comment,
        }
    }
}

/// Presentation model of the reviews section of a movie page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPanel {
    pub movie_id: MovieId,
    pub rating_label: String,
    pub average_rating: f64,
    pub filled_stars: u8,
    pub review_count: usize,
    /// Set only when there are no reviews.
    pub empty_message: Option<String>,
    pub cards: Vec<ReviewCard>,
}

impl From<&ReviewSummary> for ReviewPanel {
    fn from(summary: &ReviewSummary) -> Self {
        let count = summary.review_count();
        Self {
            movie_id: summary.movie_id,
            rating_label: rating_label(summary.average_rating, count),
            average_rating: summary.average_rating,
            filled_stars: filled_stars(summary.average_rating),
            review_count: count,
            empty_message: summary
                .is_empty()
                .then(|| EMPTY_LIST_MESSAGE.to_string()),
            cards: summary.reviews.iter().map(ReviewCard::from).collect(),
        }
    }
}
