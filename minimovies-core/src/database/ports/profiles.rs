use std::collections::HashMap;

use async_trait::async_trait;
use minimovies_model::UserId;

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Batched display-name lookup.
    ///
    /// Ids without a profile, or whose profile has no usable name, are
    /// absent from the returned map.
    async fn display_names(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, String>>;
}
