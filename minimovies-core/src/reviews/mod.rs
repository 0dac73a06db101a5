//! Review loading, aggregation, display formatting and submission.

pub mod aggregator;
pub mod display;
pub mod submission;

pub use aggregator::{ReviewAggregator, fallback_author_name};
pub use display::{
    CommentDisplay, ReviewCard, ReviewPanel, filled_stars, rating_label,
};
pub use submission::ReviewSubmitter;
