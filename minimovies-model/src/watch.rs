use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, Result},
    ids::{MovieId, UserId},
    movie::MovieSummary,
};

/// Elapsed playback in whole seconds. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ProgressSeconds(u32);

impl ProgressSeconds {
    pub const ZERO: ProgressSeconds = ProgressSeconds(0);

    pub fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Convert a player-reported playback position into whole seconds.
    ///
    /// The position is floored; negative, NaN and infinite values are
    /// rejected rather than clamped.
    pub fn from_playback_time(current_time: f64) -> Result<Self> {
        if !current_time.is_finite() {
            return Err(ModelError::InvalidProgress(format!(
                "playback time must be finite, got {current_time}"
            )));
        }
        if current_time < 0.0 {
            return Err(ModelError::InvalidProgress(format!(
                "playback time cannot be negative, got {current_time}"
            )));
        }
        let floored = current_time.floor();
        if floored > f64::from(u32::MAX) {
            return Err(ModelError::InvalidProgress(format!(
                "playback time {current_time} is out of range"
            )));
        }
        Ok(Self(floored as u32))
    }

    /// Accept a stored column value, refusing negative numbers.
    pub fn from_db(value: i64) -> Result<Self> {
        u32::try_from(value).map(Self).map_err(|_| {
            ModelError::InvalidProgress(format!(
                "stored progress {value} is out of range"
            ))
        })
    }

    pub fn as_secs(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ProgressSeconds {
    fn from(seconds: u32) -> Self {
        Self(seconds)
    }
}

/// Persisted progress marker for one (user, movie) pair.
///
/// At most one record exists per pair; writes replace `watched_at` and
/// `progress_seconds` in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchProgress {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub watched_at: DateTime<Utc>,
    pub progress_seconds: ProgressSeconds,
}

impl WatchProgress {
    pub fn now(
        user_id: UserId,
        movie_id: MovieId,
        progress_seconds: ProgressSeconds,
    ) -> Self {
        Self {
            user_id,
            movie_id,
            watched_at: Utc::now(),
            progress_seconds,
        }
    }

    pub fn key(&self) -> (UserId, MovieId) {
        (self.user_id, self.movie_id)
    }
}

/// One row of a user's watch history, newest first when listed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchHistoryEntry {
    pub movie_id: MovieId,
    pub watched_at: DateTime<Utc>,
    pub progress_seconds: ProgressSeconds,
    /// Catalog details, absent when the movie row no longer exists.
    pub movie: Option<MovieSummary>,
}
