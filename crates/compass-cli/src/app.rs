//! Application state for the Compass CLI.
//!
//! Owns the configuration and the one `SnapshotStore` the commands read
//! from, and implements the startup flow: render from the cache when it is
//! valid, otherwise ask for a sync.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use compass_core::{
    events_from_export, spawn_feed_worker, CacheController, Collection, Config, FileStore,
    SnapshotStore,
};
use tracing::{debug, info, warn};

pub struct App {
    pub config: Config,
    pub store: Arc<SnapshotStore>,
    cache_dir: PathBuf,
}

/// What a sync brought in, per collection.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub received: usize,
    pub applied: usize,
    pub counts: BTreeMap<String, usize>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");
        Self::with_cache_dir(config, cache_dir)
    }

    pub fn with_cache_dir(config: Config, cache_dir: PathBuf) -> Result<Self> {
        let backend = Arc::new(
            FileStore::new(cache_dir.clone())
                .with_context(|| format!("Failed to open cache at {}", cache_dir.display()))?,
        );
        let cache = Arc::new(CacheController::with_store(backend));
        let store = Arc::new(SnapshotStore::new(cache));
        Ok(Self {
            config,
            store,
            cache_dir,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Load the cached snapshot if it is still valid. Returns `false` when the
    /// caller has to sync first.
    pub fn load_from_cache(&self) -> bool {
        if self.store.is_cache_valid() && self.store.restore_from_cache() {
            debug!(cached_at = %self.store.timestamp(), "Loaded snapshot from cache");
            true
        } else {
            info!("No usable cached snapshot");
            false
        }
    }

    /// Replay a realtime database export through the feed worker. Every
    /// applied event is persisted as it lands.
    pub async fn sync(&self, export_path: &Path) -> Result<SyncSummary> {
        let contents = std::fs::read_to_string(export_path)
            .with_context(|| format!("Failed to read export: {}", export_path.display()))?;
        let root: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse export: {}", export_path.display()))?;

        let events = events_from_export(&root);
        let received = events.len();
        info!(received, "Replaying export");

        let (tx, worker) = spawn_feed_worker(self.store.clone());
        for event in events {
            tx.send(event)
                .await
                .context("Feed worker stopped before the export was replayed")?;
        }
        drop(tx);
        let applied = worker.await.context("Feed worker panicked")?;

        let snapshot = self.store.snapshot();
        let mut counts = BTreeMap::new();
        for collection in Collection::ALL {
            let count = match collection {
                Collection::Themes => snapshot.themes.len(),
                Collection::Events => snapshot.events.len(),
                Collection::Questions => snapshot.questions.len(),
                Collection::Resources => snapshot.resources.len(),
                Collection::Presenters => snapshot.presenters.len(),
                Collection::Buildings => snapshot.buildings.len(),
            };
            counts.insert(collection.to_string(), count);
        }

        // An empty export never triggers a mutation, so persist explicitly
        self.store.save().context("Failed to cache snapshot")?;

        Ok(SyncSummary {
            received,
            applied,
            counts,
        })
    }

    /// The group the schedule filters by when none is given.
    pub fn default_group(&self) -> Option<&str> {
        self.config.default_group.as_deref()
    }

    /// Change the default schedule group and write the config file.
    pub fn set_default_group(&mut self, group: Option<String>) -> Result<()> {
        self.config.default_group = group;
        self.config.save().context("Failed to save config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export() -> serde_json::Value {
        json!({
            "Orientation": {
                "FALL": {
                    "Semester": "FALL",
                    "Theme_Name": "Champlain",
                    "Description": "",
                    "Is_Current": false
                }
            },
            "Events": {
                "-Na": {
                    "Name": "Welcome",
                    "Description": "",
                    "Location": "Alumni Auditorium",
                    "Presenter": "Jane Doe",
                    "Start_Time": "2024-06-03 09:00:00 AM",
                    "End_Time": "2024-06-03 10:00:00 AM",
                    "Groups": ["Students"]
                },
                "-Nb": { "Name": "Broken" }
            },
            "Presenters": [
                { "Name": "Jane Doe", "Job_Title": "Dean", "Bio": "" }
            ]
        })
    }

    #[tokio::test]
    async fn test_sync_then_reload_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let export_path = dir.path().join("export.json");
        std::fs::write(&export_path, export().to_string()).unwrap();

        let app = App::with_cache_dir(Config::default(), dir.path().join("cache")).unwrap();
        assert!(!app.load_from_cache());

        let summary = app.sync(&export_path).await.unwrap();
        assert_eq!(summary.received, 4);
        assert_eq!(summary.applied, 3);
        assert_eq!(summary.counts["events"], 1);
        assert_eq!(summary.counts["presenters"], 1);

        let reopened = App::with_cache_dir(Config::default(), dir.path().join("cache")).unwrap();
        assert!(reopened.load_from_cache());
        assert_eq!(reopened.store.snapshot(), app.store.snapshot());
    }

    #[tokio::test]
    async fn test_sync_missing_export() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::with_cache_dir(Config::default(), dir.path().join("cache")).unwrap();
        assert!(app.sync(&dir.path().join("nope.json")).await.is_err());
    }
}
