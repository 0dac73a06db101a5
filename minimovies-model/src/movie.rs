#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::MovieId;

/// The slice of a catalog movie shown next to a watch-history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieSummary {
    pub title: String,
    pub thumbnail_url: String,
}

/// Catalog fields the movie page needs to embed the player.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
}

impl MovieDetails {
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            title: self.title.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
        }
    }
}
