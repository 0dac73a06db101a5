use minimovies_model::{MovieId, UserId};
use serde::Serialize;
use tracing::debug;

use crate::player::{
    DecodeError, InboundMessage, PlayerEvent, PlayerState, TrustedOrigin,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// No playback observed for the current movie.
    Idle,
    /// The first "playing" event has been acted on.
    Started,
}

/// The side effect requested when playback first starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartWatching {
    pub user_id: UserId,
    pub movie_id: MovieId,
}

/// One-shot start detector for a mounted movie page.
///
/// Feeds on raw player messages and yields at most one [`StartWatching`]
/// per movie. Changing the movie rearms it.
#[derive(Debug, Clone)]
pub struct WatchProgressTracker {
    trusted: TrustedOrigin,
    movie_id: MovieId,
    state: TrackerState,
}

impl WatchProgressTracker {
    pub fn new(trusted: TrustedOrigin, movie_id: MovieId) -> Self {
        Self {
            trusted,
            movie_id,
            state: TrackerState::Idle,
        }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie_id
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn has_started(&self) -> bool {
        self.state == TrackerState::Started
    }

    /// Point the tracker at `movie_id`; a different movie resets to idle.
    pub fn set_movie(&mut self, movie_id: MovieId) {
        if self.movie_id != movie_id {
            debug!(from = %self.movie_id, to = %movie_id, "tracker reset for new movie");
            self.movie_id = movie_id;
            self.state = TrackerState::Idle;
        }
    }

    /// Feed one inbound message.
    ///
    /// Returns `Some` exactly when this message moves the tracker from
    /// idle to started. Untrusted, malformed and irrelevant messages leave
    /// the state untouched.
    pub fn handle_message(
        &mut self,
        message: &InboundMessage,
        viewer: Option<UserId>,
    ) -> Option<StartWatching> {
        let event = match message.decode(&self.trusted) {
            Ok(event) => event,
            Err(err) => {
                log_ignored(&err);
                return None;
            }
        };

        if event != PlayerEvent::StateChange(PlayerState::Playing) {
            debug!(?event, "ignoring player event");
            return None;
        }

        let Some(user_id) = viewer else {
            debug!(movie_id = %self.movie_id, "playback started without a signed-in viewer");
            return None;
        };

        if self.state == TrackerState::Started {
            return None;
        }

        self.state = TrackerState::Started;
        Some(StartWatching {
            user_id,
            movie_id: self.movie_id,
        })
    }
}

fn log_ignored(err: &DecodeError) {
    debug!(reason = %err, "ignoring player message");
}
