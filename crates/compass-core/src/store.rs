//! Shared, persisted access to the snapshot.
//!
//! `SnapshotStore` is the one owner of the live [`Snapshot`]. Writers are
//! exclusive and persist through the [`CacheController`] before releasing
//! the lock, so the cached blob always reflects the latest mutation.
//! Readers run concurrently and get owned copies back.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::CacheController;
use crate::error::Result;
use crate::feed::{Change, FeedEvent};
use crate::models::{Building, Event, Presenter, Question, Resource, Theme};
use crate::snapshot::Snapshot;

pub struct SnapshotStore {
    snapshot: RwLock<Snapshot>,
    cache: Arc<CacheController>,
}

impl SnapshotStore {
    /// A store holding an empty snapshot stamped now.
    pub fn new(cache: Arc<CacheController>) -> Self {
        Self::with_snapshot(Snapshot::new(), cache)
    }

    pub fn with_snapshot(snapshot: Snapshot, cache: Arc<CacheController>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            cache,
        }
    }

    pub fn cache(&self) -> &CacheController {
        &self.cache
    }

    // The snapshot is plain data, so a panic mid-write cannot leave it in a
    // state worse than a partially applied feed event.
    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.cache.save(snapshot) {
            warn!(error = %e, "Failed to cache snapshot");
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut Snapshot)) {
        let mut snapshot = self.write();
        f(&mut snapshot);
        self.persist(&snapshot);
    }

    // ===== Mutations =====

    pub fn upsert_theme(&self, key: impl Into<String>, theme: Theme) {
        self.mutate(|s| s.upsert_theme(key, theme));
    }

    pub fn remove_theme(&self, key: &str) {
        self.mutate(|s| s.remove_theme(key));
    }

    pub fn upsert_event(&self, event: Event) {
        self.mutate(|s| s.upsert_event(event));
    }

    pub fn remove_event(&self, event: &Event) {
        self.mutate(|s| s.remove_event(event));
    }

    pub fn upsert_resource(&self, resource: Resource) {
        self.mutate(|s| s.upsert_resource(resource));
    }

    pub fn remove_resource(&self, resource: &Resource) {
        self.mutate(|s| s.remove_resource(resource));
    }

    pub fn upsert_question(&self, question: Question) {
        self.mutate(|s| s.upsert_question(question));
    }

    pub fn remove_question(&self, question: &Question) {
        self.mutate(|s| s.remove_question(question));
    }

    pub fn upsert_presenter(&self, presenter: Presenter) {
        self.mutate(|s| s.upsert_presenter(presenter));
    }

    pub fn remove_presenter(&self, presenter: &Presenter) {
        self.mutate(|s| s.remove_presenter(presenter));
    }

    pub fn upsert_building(&self, building: Building) {
        self.mutate(|s| s.upsert_building(building));
    }

    pub fn remove_building(&self, building: &Building) {
        self.mutate(|s| s.remove_building(building));
    }

    /// Apply one feed event and persist. The payload is decoded before the
    /// write lock is taken; a malformed payload leaves the snapshot as is.
    pub fn apply(&self, event: &FeedEvent) -> Result<()> {
        let change = event.decode()?;
        self.mutate(|s| change.apply_to(s));
        Ok(())
    }

    /// Apply feed events in order under one write lock, persisting once at
    /// the end. Malformed events are logged and skipped. Returns the number
    /// applied.
    pub fn apply_batch<'a>(&self, events: impl IntoIterator<Item = &'a FeedEvent>) -> usize {
        let changes: Vec<Change> = events
            .into_iter()
            .filter_map(|event| match event.decode() {
                Ok(change) => Some(change),
                Err(e) => {
                    warn!(collection = %event.collection, op = ?event.op, error = %e, "Skipping feed event");
                    None
                }
            })
            .collect();

        let applied = changes.len();
        self.mutate(|s| {
            for change in changes {
                change.apply_to(s);
            }
        });
        debug!(applied, "Applied feed batch");
        applied
    }

    // ===== Queries =====

    /// An owned copy of the whole snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.read().clone()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.read().timestamp
    }

    pub fn theme(&self, key: &str) -> Option<Theme> {
        self.read().theme(key).cloned()
    }

    pub fn current_theme(&self) -> Option<Theme> {
        self.read().current_theme().cloned()
    }

    pub fn basic_theme(&self) -> Option<Theme> {
        self.read().basic_theme().cloned()
    }

    /// The current theme, or the basic theme when the user opted out of
    /// orientation theming.
    pub fn preferred_theme(&self) -> Option<Theme> {
        if self.cache.use_current_theme() {
            self.current_theme()
        } else {
            self.basic_theme()
        }
    }

    pub fn events_for_month(&self, month: u32, year: i32, group: Option<&str>) -> Vec<Event> {
        self.read().events_for_month(month, year, group)
    }

    pub fn events_for_day(&self, month: u32, day: u32, year: i32, group: Option<&str>) -> Vec<Event> {
        self.read().events_for_day(month, day, year, group)
    }

    pub fn events_for_group(&self, group: &str) -> Vec<Event> {
        self.read().events_for_group(group)
    }

    pub fn active_questions(&self) -> Vec<Question> {
        self.read().active_questions()
    }

    pub fn active_resources(&self) -> Vec<Resource> {
        self.read().active_resources()
    }

    pub fn active_buildings(&self) -> Vec<Building> {
        self.read().active_buildings()
    }

    pub fn presenter_for(&self, event: &Event) -> Option<Presenter> {
        self.read().presenter_for(event).cloned()
    }

    // ===== Cache lifecycle =====

    /// Whether the cache holds a usable snapshot, judged against this
    /// store's timestamp.
    pub fn is_cache_valid(&self) -> bool {
        let now = self.timestamp();
        self.cache.is_cache_valid(now)
    }

    /// Replace the live snapshot with the cached one. Returns `false` and
    /// keeps the live snapshot when nothing usable is cached.
    pub fn restore_from_cache(&self) -> bool {
        let mut snapshot = self.write();
        self.cache.restore_into(&mut snapshot)
    }

    pub fn save(&self) -> Result<()> {
        let snapshot = self.read();
        self.cache.save(&snapshot)
    }
}

// ============================================================================
// Tests
// ============================================================================
