//! Data models for the orientation guide.
//!
//! This module contains the records mirrored from the realtime database:
//!
//! - `Theme`, `ThemeLogo`, `ThemeColors`: Per-semester orientation branding
//! - `Event`: Schedule entries with group membership
//! - `Resource`, `Question`: Downloadable resources and the FAQ
//! - `Presenter`, `Building`: People and places referenced by events
//!
//! Every record compares structurally and decodes from the database's
//! loosely-typed JSON payload through [`FeedRecord::from_payload`].

pub mod building;
pub mod event;
pub mod presenter;
pub mod question;
pub mod resource;
pub mod theme;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CompassError, Result};

pub use building::Building;
pub use event::{parse_feed_datetime, Event, FEED_DATETIME_FORMAT};
pub use presenter::Presenter;
pub use question::Question;
pub use resource::Resource;
pub use theme::{Theme, ThemeColors, ThemeLogo};

/// A record that arrives through the feed as a loose JSON object.
pub trait FeedRecord: Sized + Clone + PartialEq + DeserializeOwned {
    /// Record name used in error messages and logs.
    const RECORD: &'static str;

    /// Decode a record from a feed payload.
    ///
    /// Fails with [`CompassError::MalformedRecord`] when a required field is
    /// missing or has the wrong type. The caller should skip the record.
    fn from_payload(payload: &Value) -> Result<Self> {
        <Self as Deserialize>::deserialize(payload)
            .map_err(|e| CompassError::malformed(Self::RECORD, e.to_string()))
    }
}

impl FeedRecord for Theme {
    const RECORD: &'static str = "Theme";
}

impl FeedRecord for Event {
    const RECORD: &'static str = "Event";
}

impl FeedRecord for Resource {
    const RECORD: &'static str = "Resource";
}

impl FeedRecord for Question {
    const RECORD: &'static str = "Question";
}

impl FeedRecord for Presenter {
    const RECORD: &'static str = "Presenter";
}

impl FeedRecord for Building {
    const RECORD: &'static str = "Building";
}
