//! Champlain Compass core - the offline data lab behind the orientation guide.
//!
//! This crate mirrors the realtime database into an in-memory [`Snapshot`],
//! answers the schedule/resource/FAQ/map queries the UI needs, and keeps a
//! serialized copy in a local cache so the app can start without a
//! connection.
//!
//! - [`models`]: Records decoded from the database's JSON payloads
//! - [`snapshot`]: The aggregate and its queries
//! - [`store`]: Locked, persisted access to the live snapshot
//! - [`cache`]: Cache validity, load/save, theme preference
//! - [`feed`]: Change events, export import and the feed worker

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod snapshot;
pub mod store;

pub use cache::{CacheController, FileStore, MemoryStore};
pub use config::Config;
pub use error::{CompassError, Result};
pub use feed::{events_from_export, spawn_feed_worker, Collection, FeedEvent, FeedOp};
pub use snapshot::Snapshot;
pub use store::SnapshotStore;
