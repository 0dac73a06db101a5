//! Server-side stand-in for a mounted movie page.
//!
//! A viewing session owns the page's start tracker and a cancellation token
//! for its in-flight loads. Closing the session or moving it to another
//! movie cancels that token, so late results are dropped instead of being
//! delivered to a page that no longer shows them.
//!
//! Pages that vanish without closing are evicted once they have been idle
//! for the configured TTL; see [`ViewingSessionRegistry::spawn_idle_sweeper`].

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::one::RefMut};
use minimovies_core::{
    player::{InboundMessage, TrustedOrigin},
    watch::{StartWatching, TrackerState, WatchProgressTracker},
};
use minimovies_model::{MovieId, UserId};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug)]
struct ViewingSession {
    /// `None` until a signed-in request claims the page.
    viewer: Option<UserId>,
    tracker: WatchProgressTracker,
    cancel: CancellationToken,
    last_seen: Instant,
}

impl ViewingSession {
    fn admits(&self, viewer: Option<UserId>) -> bool {
        self.viewer.is_none() || self.viewer == viewer
    }
}

/// Copy of the parts of a session a request needs after the map guard is
/// released.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub viewer: Option<UserId>,
    pub movie_id: MovieId,
    pub state: TrackerState,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
pub struct ViewingSessionRegistry {
    sessions: DashMap<Uuid, ViewingSession>,
    trusted: TrustedOrigin,
    idle_ttl: Duration,
}

impl ViewingSessionRegistry {
    pub fn new(trusted: TrustedOrigin, idle_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            trusted,
            idle_ttl,
        }
    }

    pub fn open(&self, viewer: Option<UserId>, movie_id: MovieId) -> Uuid {
        let session_id = Uuid::now_v7();
        self.sessions.insert(
            session_id,
            ViewingSession {
                viewer,
                tracker: WatchProgressTracker::new(
                    self.trusted.clone(),
                    movie_id,
                ),
                cancel: CancellationToken::new(),
                last_seen: Instant::now(),
            },
        );
        info!(%session_id, %movie_id, signed_in = viewer.is_some(), "viewing session opened");
        session_id
    }

    /// Look up a session on behalf of `viewer` and mark it as seen.
    ///
    /// An anonymous session is claimed by the first signed-in viewer to touch
    /// it. A claimed session is invisible to everyone else.
    fn access(
        &self,
        session_id: Uuid,
        viewer: Option<UserId>,
    ) -> Option<RefMut<'_, Uuid, ViewingSession>> {
        let mut session = self.sessions.get_mut(&session_id)?;
        if !session.admits(viewer) {
            return None;
        }
        if session.viewer.is_none()
            && let Some(user_id) = viewer
        {
            session.viewer = Some(user_id);
            info!(%session_id, %user_id, "viewing session claimed by signed-in viewer");
        }
        session.last_seen = Instant::now();
        Some(session)
    }

    pub fn context(
        &self,
        session_id: Uuid,
        viewer: Option<UserId>,
    ) -> Option<SessionContext> {
        let session = self.access(session_id, viewer)?;
        Some(SessionContext {
            viewer: session.viewer,
            movie_id: session.tracker.movie_id(),
            state: session.tracker.state(),
            cancel: session.cancel.clone(),
        })
    }

    /// Feed a player message to the session's tracker.
    ///
    /// Returns the tracker state after the message, and the start event if
    /// this message triggered it.
    pub fn relay(
        &self,
        session_id: Uuid,
        viewer: Option<UserId>,
        message: &InboundMessage,
    ) -> Option<(TrackerState, Option<StartWatching>)> {
        let mut session = self.access(session_id, viewer)?;
        let started = session.tracker.handle_message(message, viewer);
        Some((session.tracker.state(), started))
    }

    /// Move the session to `movie_id`. A real change rearms the tracker and
    /// cancels loads started for the previous movie.
    pub fn change_movie(
        &self,
        session_id: Uuid,
        viewer: Option<UserId>,
        movie_id: MovieId,
    ) -> Option<TrackerState> {
        let mut session = self.access(session_id, viewer)?;
        if session.tracker.movie_id() != movie_id {
            session.cancel.cancel();
            session.cancel = CancellationToken::new();
            session.tracker.set_movie(movie_id);
            debug!(%session_id, %movie_id, "viewing session moved to new movie");
        }
        Some(session.tracker.state())
    }

    /// Unmount: drop the tracker and cancel everything still in flight.
    pub fn close(&self, session_id: Uuid, viewer: Option<UserId>) -> bool {
        let removed = self
            .sessions
            .remove_if(&session_id, |_, session| session.admits(viewer));
        match removed {
            Some((_, session)) => {
                session.cancel.cancel();
                info!(%session_id, "viewing session closed");
                true
            }
            None => false,
        }
    }

    /// Drop every session idle for at least the TTL, cancelling its loads.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|session_id, session| {
            let live =
                now.saturating_duration_since(session.last_seen) < self.idle_ttl;
            if !live {
                session.cancel.cancel();
                evicted += 1;
                debug!(%session_id, "evicting idle viewing session");
            }
            live
        });
        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "evicted idle viewing sessions");
        }
        evicted
    }

    /// Run [`evict_idle`](Self::evict_idle) every `every` until `shutdown`
    /// fires. `every` must be non-zero.
    pub fn spawn_idle_sweeper(
        self: Arc<Self>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        self.evict_idle();
                    }
                }
            }
            debug!("viewing session sweeper stopped");
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
