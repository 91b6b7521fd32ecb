//! Local caching module for offline data access.
//!
//! This module provides the `CacheController` for persisting the whole
//! snapshot as a single JSON blob, so the app can render before (or
//! without) a connection to the realtime database.
//!
//! Persistence goes through two small capabilities:
//! - `BlobStore`: get/set/clear of an opaque blob by key
//! - `PreferenceStore`: the "use current theme" user preference
//!
//! `FileStore` implements both on top of a cache directory and
//! `MemoryStore` keeps everything in process.

pub mod backend;
pub mod manager;

pub use backend::{BlobStore, FileStore, MemoryStore, PreferenceStore};
pub use manager::{age_display, CacheController, SNAPSHOT_KEY, USE_CURRENT_THEME_PREF};
