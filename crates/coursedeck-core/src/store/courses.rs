// ── Course store ──
//
// Owns the authoritative course collection. Loads go through the busy
// signal; saves are optimistic: the edit is published before the request
// is sent and withdrawn if the backend rejects it. Failures are reported
// on the notification bus and propagated to the caller, never into the
// collection channel, so subscriptions survive any number of failures.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use coursedeck_api::CourseClient;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ledger::{Ledger, Settled, same_view};
use super::save::SaveHandle;
use crate::busy::BusySignal;
use crate::convert::collect_courses;
use crate::error::CoreError;
use crate::messages::NotificationBus;
use crate::model::{Category, Course, CourseChanges};
use crate::stream::{CourseFilter, EntityStream, FilteredStream, Snapshot};

/// Headline reported when the collection cannot be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "Could not load courses";
/// Headline reported when a save is rejected.
pub const SAVE_FAILED_MESSAGE: &str = "Could not save course";

/// Reactive store for the course collection.
///
/// Cheaply cloneable via `Arc<StoreInner>`; all clones share one collection.
#[derive(Clone)]
pub struct CoursesStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    client: CourseClient,
    busy: BusySignal,
    messages: NotificationBus,
    /// Confirmed state plus unresolved edits. Every publication to
    /// `courses` happens while this is held, so publications follow
    /// ledger order.
    ledger: Mutex<Ledger>,
    courses: watch::Sender<Snapshot<Course>>,
    last_refreshed: watch::Sender<Option<DateTime<Utc>>>,
}

/// An in-flight refresh. Dropping it unfinished (the refresh future was
/// cancelled) releases its marker without touching the collection.
struct RefreshTicket<'a> {
    store: &'a CoursesStore,
    marker: Option<u64>,
}

impl RefreshTicket<'_> {
    fn complete(mut self, fetched: Vec<Arc<Course>>) {
        if let Some(marker) = self.marker.take() {
            let mut ledger = self.store.ledger();
            ledger.end_refresh(marker, Some(fetched));
            self.store.inner.courses.send_replace(Arc::new(ledger.view()));
        }
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.store.ledger().end_refresh(marker, None);
        }
    }
}

impl CoursesStore {
    /// Create an empty store. Does no I/O -- call [`refresh()`](Self::refresh)
    /// to populate it, or use [`start()`](Self::start).
    pub fn new(client: CourseClient, busy: BusySignal, messages: NotificationBus) -> Self {
        let (courses, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refreshed, _) = watch::channel(None);

        Self {
            inner: Arc::new(StoreInner {
                client,
                busy,
                messages,
                ledger: Mutex::new(Ledger::default()),
                courses,
                last_refreshed,
            }),
        }
    }

    /// Create a store and kick off the initial load in the background.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(client: CourseClient, busy: BusySignal, messages: NotificationBus) -> Self {
        let store = Self::new(client, busy, messages);
        let loader = store.clone();
        tokio::spawn(async move {
            // Failures are already on the notification bus.
            let _ = loader.refresh().await;
        });
        store
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // Ledger updates never panic midway; a poisoned lock still holds
        // consistent state.
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Load ─────────────────────────────────────────────────────────

    /// Fetch the whole collection and replace the in-memory one.
    ///
    /// On success publishes exactly once and returns the course count.
    /// Edits still in flight stay applied on top of the fetched data. On
    /// failure reports on the bus, leaves the collection untouched, and
    /// returns the error.
    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let load = async {
            let ticket = RefreshTicket {
                store: self,
                marker: Some(self.ledger().begin_refresh()),
            };

            let fetched = self
                .inner
                .client
                .list_courses()
                .await
                .map_err(CoreError::from)
                .and_then(collect_courses);

            match fetched {
                Ok(courses) => {
                    let count = courses.len();
                    ticket.complete(courses);
                    self.inner.last_refreshed.send_replace(Some(Utc::now()));
                    info!(count, "courses loaded");
                    Ok(count)
                }
                Err(err) => {
                    drop(ticket);
                    warn!(error = %err, "{LOAD_FAILED_MESSAGE}");
                    self.inner
                        .messages
                        .report([LOAD_FAILED_MESSAGE.to_owned(), err.to_string()]);
                    Err(err)
                }
            }
        };

        self.inner.busy.wrap(load).await
    }

    // ── Save ─────────────────────────────────────────────────────────

    /// Optimistically apply `changes` to course `id` and persist them.
    ///
    /// The edited collection is published before this returns, and before
    /// the request is issued. The returned handle resolves to the backend
    /// acknowledgement; on failure the store has already reported the error
    /// and withdrawn the edit. Only the failed edit is withdrawn: other
    /// saves, whether still in flight or already confirmed, stay visible.
    ///
    /// An unknown `id` is a caller bug and fails immediately with
    /// [`CoreError::CourseNotFound`], publishing nothing.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn save(&self, id: &str, changes: CourseChanges) -> Result<SaveHandle, CoreError> {
        let seq = {
            let mut ledger = self.ledger();
            let Some(seq) = ledger.begin_edit(id, changes.clone()) else {
                return Err(CoreError::CourseNotFound { id: id.to_owned() });
            };
            self.inner.courses.send_replace(Arc::new(ledger.view()));
            seq
        };
        debug!(id, seq, "optimistic update published");

        let store = self.clone();
        let course_id = id.to_owned();
        let request = self.inner.busy.wrap(async move {
            match store.inner.client.update_course(&course_id, &changes).await {
                Ok(ack) => {
                    store.settle(&course_id, seq, true);
                    debug!(id = %course_id, "course saved");
                    Ok(ack)
                }
                Err(err) => {
                    let err = CoreError::from(err);
                    warn!(id = %course_id, error = %err, "{SAVE_FAILED_MESSAGE}");
                    store
                        .inner
                        .messages
                        .report([SAVE_FAILED_MESSAGE.to_owned(), err.to_string()]);
                    store.settle(&course_id, seq, false);
                    Err(err)
                }
            }
        });

        Ok(SaveHandle::spawn(id.to_owned(), request))
    }

    /// Resolve edit `seq` and republish if the visible collection changed.
    fn settle(&self, id: &str, seq: u64, succeeded: bool) {
        let mut ledger = self.ledger();
        let outcome = ledger.settle(seq, succeeded);
        let view = ledger.view();
        self.inner.courses.send_if_modified(|courses| {
            if same_view(courses, &view) {
                false
            } else {
                *courses = Arc::new(view);
                true
            }
        });
        drop(ledger);

        match (outcome, succeeded) {
            (Settled::Orphaned, _) => warn!(id, "course vanished before its save resolved"),
            (Settled::Applied, false) => debug!(id, "optimistic update withdrawn"),
            (Settled::Applied, true) => {}
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current collection (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot<Course> {
        self.inner.courses.borrow().clone()
    }

    /// Look up one course by id.
    pub fn course(&self, id: &str) -> Option<Arc<Course>> {
        self.inner
            .courses
            .borrow()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.courses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.courses.borrow().is_empty()
    }

    /// When the last successful load finished, if ever.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refreshed.borrow()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> EntityStream<Course> {
        EntityStream::new(self.inner.courses.subscribe())
    }

    /// Live view of one category, sorted by `seq_no`.
    pub fn filter_by_category(&self, category: Category) -> FilteredStream {
        self.filter(CourseFilter::ByCategory(category))
    }

    /// Live view of the courses matching `filter`, sorted by `seq_no`.
    pub fn filter(&self, filter: CourseFilter) -> FilteredStream {
        FilteredStream::new(self.subscribe(), filter)
    }
}

impl std::fmt::Debug for CoursesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoursesStore")
            .field("base_url", &self.inner.client.base_url().as_str())
            .field("courses", &self.len())
            .finish_non_exhaustive()
    }
}
