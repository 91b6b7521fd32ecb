//! Adapting realtime database change events into snapshot mutations.
//!
//! Each collection in the database delivers `added`, `changed` and
//! `removed` events carrying the child's JSON value. Themes are keyed by
//! their child key; every other collection is matched structurally.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{CompassError, Result};
use crate::models::{Building, Event, FeedRecord, Presenter, Question, Resource, Theme};
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;

/// Buffered feed events before senders wait on the worker
const FEED_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Themes,
    Events,
    Questions,
    Resources,
    Presenters,
    Buildings,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Themes,
        Collection::Events,
        Collection::Questions,
        Collection::Resources,
        Collection::Presenters,
        Collection::Buildings,
    ];

    /// Child path of the collection under the database root.
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Themes => "Orientation",
            Collection::Events => "Events",
            Collection::Questions => "Frequently_Asked_Questions",
            Collection::Resources => "Resources",
            Collection::Presenters => "Presenters",
            Collection::Buildings => "Building",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.path() == path)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Themes => write!(f, "themes"),
            Collection::Events => write!(f, "events"),
            Collection::Questions => write!(f, "questions"),
            Collection::Resources => write!(f, "resources"),
            Collection::Presenters => write!(f, "presenters"),
            Collection::Buildings => write!(f, "buildings"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOp {
    Added,
    Changed,
    Removed,
}

/// One change delivered by the realtime database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub collection: Collection,
    pub op: FeedOp,
    /// Child key; only meaningful for themes
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

impl FeedEvent {
    pub fn new(collection: Collection, op: FeedOp, key: Option<String>, payload: Value) -> Self {
        Self {
            collection,
            op,
            key,
            payload,
        }
    }

    pub fn added(collection: Collection, payload: Value) -> Self {
        Self::new(collection, FeedOp::Added, None, payload)
    }

    pub fn theme(op: FeedOp, key: impl Into<String>, payload: Value) -> Self {
        Self::new(Collection::Themes, op, Some(key.into()), payload)
    }

    /// Decode the payload into the mutation it describes.
    pub fn decode(&self) -> Result<Change> {
        let upsert = self.op != FeedOp::Removed;
        let change = match self.collection {
            Collection::Themes => {
                let key = self
                    .key
                    .clone()
                    .ok_or(CompassError::MissingKey(Theme::RECORD))?;
                if upsert {
                    Change::UpsertTheme(key, Theme::from_payload(&self.payload)?)
                } else {
                    // Removal only needs the key; the payload may be stale
                    Change::RemoveTheme(key)
                }
            }
            Collection::Events => {
                let event = Event::from_payload(&self.payload)?;
                if upsert {
                    Change::UpsertEvent(event)
                } else {
                    Change::RemoveEvent(event)
                }
            }
            Collection::Questions => {
                let question = Question::from_payload(&self.payload)?;
                if upsert {
                    Change::UpsertQuestion(question)
                } else {
                    Change::RemoveQuestion(question)
                }
            }
            Collection::Resources => {
                let resource = Resource::from_payload(&self.payload)?;
                if upsert {
                    Change::UpsertResource(resource)
                } else {
                    Change::RemoveResource(resource)
                }
            }
            Collection::Presenters => {
                let presenter = Presenter::from_payload(&self.payload)?;
                if upsert {
                    Change::UpsertPresenter(presenter)
                } else {
                    Change::RemovePresenter(presenter)
                }
            }
            Collection::Buildings => {
                let building = Building::from_payload(&self.payload)?;
                if upsert {
                    Change::UpsertBuilding(building)
                } else {
                    Change::RemoveBuilding(building)
                }
            }
        };
        Ok(change)
    }
}

/// A decoded feed event, ready to apply to a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    UpsertTheme(String, Theme),
    RemoveTheme(String),
    UpsertEvent(Event),
    RemoveEvent(Event),
    UpsertQuestion(Question),
    RemoveQuestion(Question),
    UpsertResource(Resource),
    RemoveResource(Resource),
    UpsertPresenter(Presenter),
    RemovePresenter(Presenter),
    UpsertBuilding(Building),
    RemoveBuilding(Building),
}

impl Change {
    pub fn apply_to(self, snapshot: &mut Snapshot) {
        match self {
            Change::UpsertTheme(key, theme) => snapshot.upsert_theme(key, theme),
            Change::RemoveTheme(key) => snapshot.remove_theme(&key),
            Change::UpsertEvent(event) => snapshot.upsert_event(event),
            Change::RemoveEvent(event) => snapshot.remove_event(&event),
            Change::UpsertQuestion(question) => snapshot.upsert_question(question),
            Change::RemoveQuestion(question) => snapshot.remove_question(&question),
            Change::UpsertResource(resource) => snapshot.upsert_resource(resource),
            Change::RemoveResource(resource) => snapshot.remove_resource(&resource),
            Change::UpsertPresenter(presenter) => snapshot.upsert_presenter(presenter),
            Change::RemovePresenter(presenter) => snapshot.remove_presenter(&presenter),
            Change::UpsertBuilding(building) => snapshot.upsert_building(building),
            Change::RemoveBuilding(building) => snapshot.remove_building(&building),
        }
    }
}

/// Turn a JSON export of the database root into `added` events.
///
/// Collections are emitted in [`Collection::ALL`] order, children in key
/// order. Children may be objects keyed by push id, or arrays (the database
/// exports integer-keyed children that way) whose `null` holes are skipped.
pub fn events_from_export(root: &Value) -> Vec<FeedEvent> {
    let Some(root) = root.as_object() else {
        warn!("Export root is not an object");
        return Vec::new();
    };

    for path in root.keys() {
        if Collection::from_path(path).is_none() {
            debug!(path = %path, "Ignoring unknown export child");
        }
    }

    let mut events = Vec::new();
    for collection in Collection::ALL {
        let children: Vec<(String, &Value)> = match root.get(collection.path()) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Some(_) => {
                warn!(collection = %collection, "Export child is neither an object nor an array");
                continue;
            }
        };

        debug!(collection = %collection, count = children.len(), "Read export collection");
        for (key, payload) in children {
            let key = (collection == Collection::Themes).then_some(key);
            events.push(FeedEvent::new(collection, FeedOp::Added, key, payload.clone()));
        }
    }
    events
}

/// Start a task that applies feed events to `store` one at a time.
///
/// Dropping every sender stops the task; its handle yields the number of
/// events applied. Malformed events are logged and skipped.
pub fn spawn_feed_worker(store: Arc<SnapshotStore>) -> (mpsc::Sender<FeedEvent>, JoinHandle<usize>) {
    let (tx, mut rx) = mpsc::channel::<FeedEvent>(FEED_CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut applied = 0usize;
        while let Some(event) = rx.recv().await {
            match store.apply(&event) {
                Ok(()) => applied += 1,
                Err(e) => warn!(
                    collection = %event.collection,
                    op = ?event.op,
                    error = %e,
                    "Skipping feed event"
                ),
            }
        }
        debug!(applied, "Feed worker stopped");
        applied
    });
    (tx, handle)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheController, MemoryStore};
    use serde_json::json;

    fn event_payload(name: &str, start: &str) -> Value {
        json!({
            "Name": name,
            "Description": "",
            "Location": "Main Hall",
            "Presenter": "Jane Doe",
            "Start_Time": start,
            "End_Time": start,
            "Groups": ["Students"]
        })
    }

    fn theme_payload(semester: &str, current: bool) -> Value {
        json!({
            "Semester": semester,
            "Theme_Name": "Compass",
            "Description": "",
            "Is_Current": current
        })
    }

    fn store() -> Arc<SnapshotStore> {
        let cache = CacheController::with_store(Arc::new(MemoryStore::new()));
        Arc::new(SnapshotStore::new(Arc::new(cache)))
    }

    #[test]
    fn test_collection_paths_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_path(collection.path()), Some(collection));
        }
        assert_eq!(Collection::from_path("Building"), Some(Collection::Buildings));
        assert_eq!(Collection::from_path("Buildings"), None);
    }

    #[test]
    fn test_decode_theme_requires_key() {
        let event = FeedEvent::added(Collection::Themes, theme_payload("Fall2024", true));
        assert!(matches!(event.decode(), Err(CompassError::MissingKey("Theme"))));
    }

    #[test]
    fn test_decode_theme_removal_ignores_payload() {
        let event = FeedEvent::theme(FeedOp::Removed, "Fall2024", Value::Null);
        assert_eq!(event.decode().unwrap(), Change::RemoveTheme("Fall2024".to_string()));
    }

    #[test]
    fn test_decode_changed_is_upsert() {
        let event = FeedEvent::new(
            Collection::Events,
            FeedOp::Changed,
            None,
            event_payload("Welcome", "2024-06-03 09:00:00 AM"),
        );
        assert!(matches!(event.decode().unwrap(), Change::UpsertEvent(_)));
    }

    #[test]
    fn test_decode_malformed_record() {
        let event = FeedEvent::added(Collection::Buildings, json!({ "Name": "Perry Hall" }));
        assert!(matches!(
            event.decode(),
            Err(CompassError::MalformedRecord { record: "Building", .. })
        ));
    }

    #[test]
    fn test_feed_event_json_shape() {
        let event: FeedEvent = serde_json::from_value(json!({
            "collection": "questions",
            "op": "removed",
            "payload": { "Question": "Q", "Answer": "A", "Is_Active": true }
        }))
        .unwrap();
        assert_eq!(event.collection, Collection::Questions);
        assert_eq!(event.op, FeedOp::Removed);
        assert!(event.key.is_none());
    }

    #[test]
    fn test_events_from_export() {
        let export = json!({
            "Orientation": {
                "FALL": theme_payload("FALL", false),
                "Spring2025": theme_payload("Spring2025", true)
            },
            "Events": {
                "-Nb": event_payload("Second", "2024-06-03 10:00:00 AM"),
                "-Na": event_payload("First", "2024-06-03 09:00:00 AM")
            },
            "Building": [
                null,
                { "Name": "Perry Hall", "Address": "163 S Willard St", "Is_Active": true }
            ],
            "Frequently_Asked_Questions": null,
            "Analytics": { "ignored": true }
        });

        let events = events_from_export(&export);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.op == FeedOp::Added));

        assert_eq!(events[0].collection, Collection::Themes);
        assert_eq!(events[0].key.as_deref(), Some("FALL"));
        assert_eq!(events[1].key.as_deref(), Some("Spring2025"));

        assert_eq!(events[2].payload["Name"], "First");
        assert_eq!(events[3].payload["Name"], "Second");
        assert!(events[2].key.is_none());

        assert_eq!(events[4].collection, Collection::Buildings);
    }

    #[test]
    fn test_events_from_non_object_export() {
        assert!(events_from_export(&json!([1, 2, 3])).is_empty());
    }

    #[tokio::test]
    async fn test_feed_worker_applies_in_order_and_skips_malformed() {
        let store = store();
        let (tx, handle) = spawn_feed_worker(store.clone());

        let first = event_payload("Welcome", "2024-06-03 09:00:00 AM");
        tx.send(FeedEvent::added(Collection::Events, first.clone())).await.unwrap();
        tx.send(FeedEvent::added(Collection::Events, json!({ "Name": 1 }))).await.unwrap();
        tx.send(FeedEvent::added(
            Collection::Events,
            event_payload("Lunch", "2024-06-03 12:00:00 PM"),
        ))
        .await
        .unwrap();
        tx.send(FeedEvent::new(Collection::Events, FeedOp::Removed, None, first))
            .await
            .unwrap();
        tx.send(FeedEvent::theme(FeedOp::Added, "Fall2024", theme_payload("Fall2024", true)))
            .await
            .unwrap();
        drop(tx);

        let applied = handle.await.unwrap();
        assert_eq!(applied, 4);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.events[0].name, "Lunch");
        assert_eq!(store.current_theme().unwrap().semester, "Fall2024");
    }
}
