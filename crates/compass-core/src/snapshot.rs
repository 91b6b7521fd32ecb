//! The in-memory copy of every collection in the realtime database.
//!
//! A [`Snapshot`] is plain data: the mutation and query methods here do no
//! locking and no persistence. [`crate::store::SnapshotStore`] wraps it with
//! both.
//!
//! Sequence collections carry no stable identifier, so updates and removals
//! locate the first structurally-equal record. Two real-world records with
//! identical fields cannot be told apart.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Building, Event, Presenter, Question, Resource, Theme};

/// Map key of the college's basic (non-orientation) theme.
pub const BASIC_THEME_KEY: &str = "FALL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub themes: BTreeMap<String, Theme>,
    pub events: Vec<Event>,
    pub resources: Vec<Resource>,
    pub questions: Vec<Question>,
    pub presenters: Vec<Presenter>,
    pub buildings: Vec<Building>,
    pub timestamp: DateTime<Utc>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// An empty snapshot stamped with the current time.
    pub fn new() -> Self {
        Self::empty_at(Utc::now())
    }

    pub fn empty_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            themes: BTreeMap::new(),
            events: Vec::new(),
            resources: Vec::new(),
            questions: Vec::new(),
            presenters: Vec::new(),
            buildings: Vec::new(),
            timestamp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
            && self.events.is_empty()
            && self.resources.is_empty()
            && self.questions.is_empty()
            && self.presenters.is_empty()
            && self.buildings.is_empty()
    }

    // ===== Mutations =====

    pub fn upsert_theme(&mut self, key: impl Into<String>, theme: Theme) {
        self.themes.insert(key.into(), theme);
    }

    pub fn remove_theme(&mut self, key: &str) {
        self.themes.remove(key);
    }

    pub fn upsert_event(&mut self, event: Event) {
        upsert_record(&mut self.events, event);
    }

    pub fn remove_event(&mut self, event: &Event) {
        remove_record(&mut self.events, event);
    }

    pub fn upsert_resource(&mut self, resource: Resource) {
        upsert_record(&mut self.resources, resource);
    }

    pub fn remove_resource(&mut self, resource: &Resource) {
        remove_record(&mut self.resources, resource);
    }

    pub fn upsert_question(&mut self, question: Question) {
        upsert_record(&mut self.questions, question);
    }

    pub fn remove_question(&mut self, question: &Question) {
        remove_record(&mut self.questions, question);
    }

    pub fn upsert_presenter(&mut self, presenter: Presenter) {
        upsert_record(&mut self.presenters, presenter);
    }

    pub fn remove_presenter(&mut self, presenter: &Presenter) {
        remove_record(&mut self.presenters, presenter);
    }

    pub fn upsert_building(&mut self, building: Building) {
        upsert_record(&mut self.buildings, building);
    }

    pub fn remove_building(&mut self, building: &Building) {
        remove_record(&mut self.buildings, building);
    }

    // ===== Themes =====

    pub fn theme(&self, key: &str) -> Option<&Theme> {
        self.themes.get(key)
    }

    /// The current orientation theme. When several are flagged current the
    /// greatest semester string wins.
    pub fn current_theme(&self) -> Option<&Theme> {
        self.themes
            .values()
            .filter(|t| t.is_current)
            .max_by(|a, b| a.semester.cmp(&b.semester))
    }

    pub fn basic_theme(&self) -> Option<&Theme> {
        self.themes.get(BASIC_THEME_KEY)
    }

    // ===== Events =====

    /// Events whose start time contains the zero-padded `YYYY-MM`, oldest
    /// first.
    pub fn events_for_month(&self, month: u32, year: i32, group: Option<&str>) -> Vec<Event> {
        let prefix = format!("{:04}-{:02}", year, month);
        self.events_by_start(|e| e.start_time.contains(&prefix) && in_optional_group(e, group))
    }

    /// Events whose start time contains the zero-padded `YYYY-MM-DD`, oldest
    /// first.
    pub fn events_for_day(&self, month: u32, day: u32, year: i32, group: Option<&str>) -> Vec<Event> {
        let prefix = format!("{:04}-{:02}-{:02}", year, month, day);
        self.events_by_start(|e| e.start_time.contains(&prefix) && in_optional_group(e, group))
    }

    pub fn events_for_group(&self, group: &str) -> Vec<Event> {
        self.events_by_start(|e| e.in_group(group))
    }

    /// Matching events with a parseable start time, sorted by that time.
    /// Ties keep their stored order.
    fn events_by_start(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut timed: Vec<(NaiveDateTime, &Event)> = self
            .events
            .iter()
            .filter(|e| keep(*e))
            .filter_map(|e| e.start().map(|start| (start, e)))
            .collect();
        timed.sort_by_key(|(start, _)| *start);
        timed.into_iter().map(|(_, e)| e.clone()).collect()
    }

    // ===== Active-only views =====

    /// Active questions in stored order.
    pub fn active_questions(&self) -> Vec<Question> {
        self.questions.iter().filter(|q| q.is_active).cloned().collect()
    }

    pub fn active_resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> =
            self.resources.iter().filter(|r| r.is_active).cloned().collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        resources
    }

    pub fn active_buildings(&self) -> Vec<Building> {
        let mut buildings: Vec<Building> =
            self.buildings.iter().filter(|b| b.is_active).cloned().collect();
        buildings.sort_by(|a, b| a.name.cmp(&b.name));
        buildings
    }

    pub fn presenter_for(&self, event: &Event) -> Option<&Presenter> {
        self.presenters.iter().find(|p| p.name == event.presenter)
    }
}

fn in_optional_group(event: &Event, group: Option<&str>) -> bool {
    group.map_or(true, |g| event.in_group(g))
}

/// Replace the first equal record in place, or append.
fn upsert_record<T: PartialEq>(records: &mut Vec<T>, record: T) {
    match records.iter().position(|r| *r == record) {
        Some(index) => records[index] = record,
        None => records.push(record),
    }
}

fn remove_record<T: PartialEq>(records: &mut Vec<T>, record: &T) {
    if let Some(index) = records.iter().position(|r| r == record) {
        records.remove(index);
    }
}

// ============================================================================
// Tests
// ============================================================================
