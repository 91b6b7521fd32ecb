use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::{BlobStore, PreferenceStore};
use crate::error::Result;
use crate::snapshot::Snapshot;

/// Blob key holding the serialized snapshot.
pub const SNAPSHOT_KEY: &str = "CompassDataLab";

/// Preference key for "use the current orientation theme".
pub const USE_CURRENT_THEME_PREF: &str = "UseOrientationTheme";

/// Window added to the comparison timestamp when checking cache validity.
const CACHE_WINDOW_MINUTES: i64 = 3;

/// Bumped whenever the persisted snapshot layout changes.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedSnapshot<S> {
    version: u32,
    snapshot: S,
}

pub struct CacheController {
    blobs: Arc<dyn BlobStore>,
    prefs: Arc<dyn PreferenceStore>,
}

impl CacheController {
    pub fn new(blobs: Arc<dyn BlobStore>, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { blobs, prefs }
    }

    /// Use one backend for both the snapshot blob and preferences.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: BlobStore + PreferenceStore + 'static,
    {
        Self {
            blobs: store.clone(),
            prefs: store,
        }
    }

    /// Serialize the whole snapshot under [`SNAPSHOT_KEY`], replacing any
    /// previous blob.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let cached = CachedSnapshot {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
        };
        let bytes = serde_json::to_vec(&cached)?;
        self.blobs.set_blob(SNAPSHOT_KEY, &bytes)?;
        debug!(bytes = bytes.len(), "Saved snapshot to cache");
        Ok(())
    }

    /// Load the cached snapshot. Absent, unreadable, corrupt and
    /// version-mismatched blobs all yield `None`.
    pub fn load(&self) -> Option<Snapshot> {
        let bytes = match self.blobs.get_blob(SNAPSHOT_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No cached snapshot");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cached snapshot");
                return None;
            }
        };

        let cached: CachedSnapshot<Snapshot> = match serde_json::from_slice(&bytes) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "Failed to parse cached snapshot");
                return None;
            }
        };

        if cached.version != SNAPSHOT_FORMAT_VERSION {
            debug!(
                found = cached.version,
                expected = SNAPSHOT_FORMAT_VERSION,
                "Ignoring cached snapshot with a different format version"
            );
            return None;
        }

        Some(cached.snapshot)
    }

    pub fn clear(&self) -> Result<()> {
        self.blobs.clear_blob(SNAPSHOT_KEY)
    }

    /// Check whether a cached snapshot exists and is usable.
    ///
    /// A cached snapshot stamped later than `now + 3 minutes` is treated as
    /// stale: the blob is cleared and `false` is returned.
    pub fn is_cache_valid(&self, now: DateTime<Utc>) -> bool {
        let Some(cached) = self.load() else {
            return false;
        };

        // NOTE: compares the cached stamp against the *future* bound, not the past.
        // A bound past the representable range cannot be exceeded.
        let Some(bound) = now.checked_add_signed(Duration::minutes(CACHE_WINDOW_MINUTES)) else {
            return true;
        };
        if cached.timestamp > bound {
            info!(cached_at = %cached.timestamp, %now, "Clearing stale cached snapshot");
            if let Err(e) = self.clear() {
                warn!(error = %e, "Failed to clear stale cached snapshot");
            }
            return false;
        }

        true
    }

    /// Replace every field of `snapshot` with the cached one, timestamp
    /// included. Leaves `snapshot` untouched and returns `false` when no
    /// usable cache exists.
    pub fn restore_into(&self, snapshot: &mut Snapshot) -> bool {
        match self.load() {
            Some(cached) => {
                *snapshot = cached;
                true
            }
            None => false,
        }
    }

    /// Whether the user prefers the current orientation theme over the basic
    /// one. Defaults to `true` when the preference was never set.
    pub fn use_current_theme(&self) -> bool {
        match self.prefs.get_bool_pref(USE_CURRENT_THEME_PREF) {
            Ok(Some(value)) => value,
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                true
            }
        }
    }

    pub fn set_use_current_theme(&self, value: bool) -> Result<()> {
        self.prefs.set_bool_pref(USE_CURRENT_THEME_PREF, value)
    }

    /// Human-readable age of the cached snapshot, if any.
    pub fn cache_age(&self) -> Option<String> {
        self.load().map(|cached| age_display(cached.timestamp, Utc::now()))
    }
}

/// Format the age of a timestamp: "just now", "5m ago", "2h ago", "3d ago".
pub fn age_display(cached_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - cached_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::models::{Event, Theme, ThemeColors, ThemeLogo};

    fn controller() -> (Arc<MemoryStore>, CacheController) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), CacheController::with_store(store))
    }

    fn populated(timestamp: DateTime<Utc>) -> Snapshot {
        let mut snapshot = Snapshot::empty_at(timestamp);
        snapshot.upsert_theme(
            "FALL",
            Theme::new("FALL", "Champlain", "", false, ThemeLogo::default(), ThemeColors::default()),
        );
        snapshot.upsert_event(Event::new(
            "Welcome",
            "",
            "Main Hall",
            "Jane Doe",
            "2024-06-03 09:00:00 AM",
            "2024-06-03 10:00:00 AM",
            vec!["Students".to_string()],
        ));
        snapshot
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_, cache) = controller();
        let snapshot = populated(Utc::now());
        cache.save(&snapshot).unwrap();
        assert_eq!(cache.load().unwrap(), snapshot);
    }

    #[test]
    fn test_load_without_cache() {
        let (_, cache) = controller();
        assert!(cache.load().is_none());
        assert!(!cache.is_cache_valid(Utc::now()));
    }

    #[test]
    fn test_load_corrupt_blob_is_no_cache() {
        let (store, cache) = controller();
        store.set_blob(SNAPSHOT_KEY, b"not json").unwrap();
        assert!(cache.load().is_none());

        let mut live = populated(Utc::now());
        let before = live.clone();
        assert!(!cache.restore_into(&mut live));
        assert_eq!(live, before);
    }

    #[test]
    fn test_load_other_version_is_no_cache() {
        let (store, cache) = controller();
        let cached = CachedSnapshot {
            version: SNAPSHOT_FORMAT_VERSION + 1,
            snapshot: populated(Utc::now()),
        };
        store
            .set_blob(SNAPSHOT_KEY, &serde_json::to_vec(&cached).unwrap())
            .unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_saved_cache_is_immediately_valid() {
        let (_, cache) = controller();
        let snapshot = populated(Utc::now());
        cache.save(&snapshot).unwrap();
        assert!(cache.is_cache_valid(snapshot.timestamp));
    }

    #[test]
    fn test_old_cache_stays_valid() {
        let (_, cache) = controller();
        let now = Utc::now();
        cache.save(&populated(now - Duration::days(30))).unwrap();
        assert!(cache.is_cache_valid(now));
    }

    #[test]
    fn test_cache_ahead_of_window_is_cleared() {
        let (store, cache) = controller();
        let now = Utc::now();
        cache.save(&populated(now + Duration::minutes(4))).unwrap();
        assert!(!cache.is_cache_valid(now));
        assert!(store.get_blob(SNAPSHOT_KEY).unwrap().is_none());
    }

    #[test]
    fn test_cache_at_window_edge_is_valid() {
        let (_, cache) = controller();
        let now = Utc::now();
        cache.save(&populated(now + Duration::minutes(3))).unwrap();
        assert!(cache.is_cache_valid(now));
    }

    #[test]
    fn test_cache_at_max_timestamp_is_valid() {
        let (_, cache) = controller();
        let snapshot = Snapshot::empty_at(DateTime::<Utc>::MAX_UTC);
        cache.save(&snapshot).unwrap();
        assert!(cache.load().is_some());
        assert!(cache.is_cache_valid(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_restore_into_overwrites_everything() {
        let (_, cache) = controller();
        let cached = populated(Utc::now() - Duration::hours(2));
        cache.save(&cached).unwrap();

        let mut live = Snapshot::new();
        assert!(cache.restore_into(&mut live));
        assert_eq!(live, cached);
        assert_eq!(live.timestamp, cached.timestamp);
    }

    #[test]
    fn test_use_current_theme_defaults_to_true() {
        let (_, cache) = controller();
        assert!(cache.use_current_theme());
        cache.set_use_current_theme(false).unwrap();
        assert!(!cache.use_current_theme());
        cache.set_use_current_theme(true).unwrap();
        assert!(cache.use_current_theme());
    }

    #[test]
    fn test_cache_age() {
        let (_, cache) = controller();
        assert!(cache.cache_age().is_none());
        cache.save(&populated(Utc::now())).unwrap();
        assert_eq!(cache.cache_age().unwrap(), "just now");
    }

    #[test]
    fn test_age_display() {
        let now = Utc::now();
        assert_eq!(age_display(now + Duration::minutes(5), now), "just now");
        assert_eq!(age_display(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(age_display(now - Duration::minutes(90), now), "2h ago");
        assert_eq!(age_display(now - Duration::minutes(70), now), "1h ago");
        assert_eq!(age_display(now - Duration::hours(36), now), "2d ago");
        assert_eq!(age_display(now - Duration::hours(26), now), "1d ago");
    }
}
