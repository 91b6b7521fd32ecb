use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of `Start_Time`/`End_Time` in the database: "2024-06-03 09:00:00 AM"
pub const FEED_DATETIME_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

/// Parse a feed date-time string, returning `None` when it does not match
/// [`FEED_DATETIME_FORMAT`].
pub fn parse_feed_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), FEED_DATETIME_FORMAT).ok()
}

/// A scheduled orientation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Location")]
    pub location: String,
    /// Matches a `Presenter::name`, or is empty
    #[serde(rename = "Presenter")]
    pub presenter: String,
    #[serde(rename = "Start_Time")]
    pub start_time: String,
    #[serde(rename = "End_Time")]
    pub end_time: String,
    #[serde(rename = "Groups")]
    pub groups: Vec<String>,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        presenter: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        groups: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location: location.into(),
            presenter: presenter.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            groups,
        }
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        parse_feed_datetime(&self.start_time)
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        parse_feed_datetime(&self.end_time)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Month and day: "June 3"
    pub fn date_string(&self) -> String {
        self.start()
            .map(|dt| dt.format("%B %-d").to_string())
            .unwrap_or_default()
    }

    /// Month, day and year: "June 3, 2024"
    pub fn full_date_string(&self) -> String {
        self.start()
            .map(|dt| dt.format("%B %-d, %Y").to_string())
            .unwrap_or_default()
    }

    /// Start clock time: "9:00 AM"
    pub fn start_time_string(&self) -> String {
        self.start().map(format_clock).unwrap_or_default()
    }

    /// End clock time: "10:30 AM"
    pub fn end_time_string(&self) -> String {
        self.end().map(format_clock).unwrap_or_default()
    }

    /// Time range: "9:00 AM - 10:30 AM". Empty unless both ends parse.
    pub fn time_string(&self) -> String {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => format!("{} - {}", format_clock(start), format_clock(end)),
            _ => String::new(),
        }
    }
}

fn format_clock(dt: NaiveDateTime) -> String {
    dt.format("%-I:%M %p").to_string()
}
