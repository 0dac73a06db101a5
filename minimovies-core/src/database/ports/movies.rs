use async_trait::async_trait;
use minimovies_model::{MovieDetails, MovieId};

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn get_details(
        &self,
        movie_id: MovieId,
    ) -> Result<Option<MovieDetails>>;
}
