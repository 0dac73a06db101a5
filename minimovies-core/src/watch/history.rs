use std::{
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;
use minimovies_model::{
    MovieId, ProgressSeconds, UserId, WatchHistoryEntry, WatchProgress,
};
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, warn};

use crate::{database::ports::WatchHistoryRepository, error::Result};

/// What happened to one `add_to_history` call.
///
/// The caller never sees an error: failures are logged and reported here
/// only so tests and callers that care can observe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Recorded,
    /// No signed-in viewer; nothing was written.
    SkippedAnonymous,
    /// A report emitted later for the same movie already landed.
    Superseded,
    Failed,
}

type ProgressKey = (UserId, MovieId);

/// Orders progress writes per (user, movie) by emission.
///
/// Each report takes a ticket when it is emitted. Writes for a key run one
/// at a time, and a write whose ticket is older than the last committed
/// one is dropped.
#[derive(Default)]
struct ProgressSequencer {
    next_ticket: AtomicU64,
    slots: DashMap<ProgressKey, Arc<Mutex<u64>>>,
}

impl ProgressSequencer {
    fn reserve(self: &Arc<Self>, key: ProgressKey) -> Reservation {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let slot = Arc::clone(
            &self
                .slots
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(0))),
        );
        Reservation {
            ticket,
            key,
            slot: Some(slot),
            sequencer: Arc::clone(self),
        }
    }
}

/// A ticket plus a hold on its key's slot; the slot is released on drop.
struct Reservation {
    ticket: u64,
    key: ProgressKey,
    slot: Option<Arc<Mutex<u64>>>,
    sequencer: Arc<ProgressSequencer>,
}

impl Reservation {
    async fn commit<F>(self, write: F) -> AddOutcome
    where
        F: Future<Output = Result<()>>,
    {
        let Some(slot) = self.slot.as_ref() else {
            return AddOutcome::Failed;
        };
        let mut committed = slot.lock().await;
        let (user_id, movie_id) = self.key;

        if self.ticket < *committed {
            debug!(
                %user_id,
                %movie_id,
                ticket = self.ticket,
                committed = *committed,
                "dropping stale progress report"
            );
            return AddOutcome::Superseded;
        }

        match write.await {
            Ok(()) => {
                *committed = self.ticket;
                AddOutcome::Recorded
            }
            Err(error) => {
                warn!(%user_id, %movie_id, %error, "failed to record watch progress");
                AddOutcome::Failed
            }
        }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        drop(self.slot.take());
        self.sequencer
            .slots
            .remove_if(&self.key, |_, slot| Arc::strong_count(slot) == 1);
    }
}

/// Best-effort watch-history writer and reader.
#[derive(Clone)]
pub struct WatchHistoryService {
    repo: Arc<dyn WatchHistoryRepository>,
    sequencer: Arc<ProgressSequencer>,
}

impl fmt::Debug for WatchHistoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHistoryService")
            .field("repo", &std::any::type_name_of_val(self.repo.as_ref()))
            .field("pending_keys", &self.sequencer.slots.len())
            .finish()
    }
}

impl WatchHistoryService {
    pub fn new(repo: Arc<dyn WatchHistoryRepository>) -> Self {
        Self {
            repo,
            sequencer: Arc::new(ProgressSequencer::default()),
        }
    }

    /// Record that `viewer` is at `progress` in `movie_id`.
    ///
    /// Ordering is fixed when this is called, not when the returned future
    /// is first polled. The future never fails; anonymous viewers resolve
    /// to [`AddOutcome::SkippedAnonymous`] without touching storage.
    pub fn add_to_history(
        &self,
        viewer: Option<UserId>,
        movie_id: MovieId,
        progress: ProgressSeconds,
    ) -> impl Future<Output = AddOutcome> + Send + use<> {
        let pending = viewer.map(|user_id| {
            let record = WatchProgress::now(user_id, movie_id, progress);
            let reservation = self.sequencer.reserve(record.key());
            (record, reservation)
        });
        let repo = Arc::clone(&self.repo);

        async move {
            let Some((record, reservation)) = pending else {
                debug!(%movie_id, "no signed-in viewer, skipping watch history");
                return AddOutcome::SkippedAnonymous;
            };
            reservation.commit(repo.upsert_progress(&record)).await
        }
    }

    /// Fire-and-forget variant of [`Self::add_to_history`].
    pub fn spawn_add_to_history(
        &self,
        viewer: Option<UserId>,
        movie_id: MovieId,
        progress: ProgressSeconds,
    ) -> JoinHandle<AddOutcome> {
        tokio::spawn(self.add_to_history(viewer, movie_id, progress))
    }

    /// Convert a raw player position and record it.
    ///
    /// Only the conversion can fail; the write itself is best-effort.
    pub fn report_progress(
        &self,
        viewer: Option<UserId>,
        movie_id: MovieId,
        current_time: f64,
    ) -> Result<JoinHandle<AddOutcome>> {
        let progress = ProgressSeconds::from_playback_time(current_time)?;
        Ok(self.spawn_add_to_history(viewer, movie_id, progress))
    }

    /// The viewer's history, newest first. Anonymous viewers have none.
    pub async fn list(
        &self,
        viewer: Option<UserId>,
    ) -> Result<Vec<WatchHistoryEntry>> {
        match viewer {
            Some(user_id) => self.repo.list_for_user(user_id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn progress_for(
        &self,
        viewer: Option<UserId>,
        movie_id: MovieId,
    ) -> Result<Option<WatchProgress>> {
        match viewer {
            Some(user_id) => self.repo.get_progress(user_id, movie_id).await,
            None => Ok(None),
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.sequencer.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::{InMemoryStore, ports::watch_history::MockWatchHistoryRepository},
        error::CoreError,
    };

    fn service_over(store: &Arc<InMemoryStore>) -> WatchHistoryService {
        WatchHistoryService::new(Arc::clone(store) as Arc<dyn WatchHistoryRepository>)
    }

    #[tokio::test]
    async fn anonymous_calls_are_noops() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);

        let outcome = service
            .add_to_history(None, MovieId::new(), ProgressSeconds::ZERO)
            .await;

        assert_eq!(outcome, AddOutcome::SkippedAnonymous);
        assert_eq!(store.watch_history_len().await, 0);
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_calls_keep_one_record() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let user = UserId::new();
        let movie = MovieId::new();

        for secs in [0, 12, 30] {
            let outcome = service
                .add_to_history(Some(user), movie, ProgressSeconds::new(secs))
                .await;
            assert_eq!(outcome, AddOutcome::Recorded);
        }

        assert_eq!(store.watch_history_len().await, 1);
        let stored = service.progress_for(Some(user), movie).await.unwrap().unwrap();
        assert_eq!(stored.progress_seconds.as_secs(), 30);
        assert_eq!(service.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn later_report_wins_when_completions_race() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);
        let user = UserId::new();
        let movie = MovieId::new();

        let earlier =
            service.add_to_history(Some(user), movie, ProgressSeconds::new(10));
        let later =
            service.add_to_history(Some(user), movie, ProgressSeconds::new(20));

        assert_eq!(later.await, AddOutcome::Recorded);
        assert_eq!(earlier.await, AddOutcome::Superseded);

        let stored = service.progress_for(Some(user), movie).await.unwrap().unwrap();
        assert_eq!(stored.progress_seconds.as_secs(), 20);
        assert_eq!(service.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn persistence_failures_are_swallowed() {
        let mut repo = MockWatchHistoryRepository::new();
        repo.expect_upsert_progress()
            .times(1)
            .returning(|_| Err(CoreError::Database("connection reset".into())));
        let service = WatchHistoryService::new(Arc::new(repo));

        let outcome = service
            .add_to_history(Some(UserId::new()), MovieId::new(), ProgressSeconds::ZERO)
            .await;

        assert_eq!(outcome, AddOutcome::Failed);
        assert_eq!(service.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn failed_write_does_not_block_older_retry() {
        let mut repo = MockWatchHistoryRepository::new();
        let mut calls = 0;
        repo.expect_upsert_progress().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(CoreError::Database("timeout".into()))
            } else {
                Ok(())
            }
        });
        let service = WatchHistoryService::new(Arc::new(repo));
        let user = Some(UserId::new());
        let movie = MovieId::new();

        let first = service.add_to_history(user, movie, ProgressSeconds::new(5));
        let second = service.add_to_history(user, movie, ProgressSeconds::new(9));

        assert_eq!(second.await, AddOutcome::Failed);
        assert_eq!(first.await, AddOutcome::Recorded);
    }

    #[tokio::test]
    async fn invalid_playback_time_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_over(&store);

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = service
                .report_progress(Some(UserId::new()), MovieId::new(), bad)
                .unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }

        let handle = service
            .report_progress(Some(UserId::new()), MovieId::new(), 61.7)
            .unwrap();
        assert_eq!(handle.await.unwrap(), AddOutcome::Recorded);
        assert_eq!(store.watch_history_len().await, 1);
    }
}
