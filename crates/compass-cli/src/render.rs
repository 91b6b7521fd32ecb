//! Plain-text views over the snapshot.
//!
//! Each function builds the full output as a `String` so `main` only prints
//! and the tests can compare text.

use std::fmt::Write;

use compass_core::models::{Building, Event, Presenter, Question, Resource, Theme};

use crate::utils::{or_placeholder, truncate_string};

/// Width of the description column in list views
const DESCRIPTION_WIDTH: usize = 60;

pub fn render_events(title: &str, events: &[Event]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} events)", title, events.len());
    if events.is_empty() {
        let _ = writeln!(out, "  Nothing scheduled");
        return out;
    }

    let mut current_date = String::new();
    for event in events {
        let date = event.full_date_string();
        if date != current_date {
            let _ = writeln!(out, "\n{}", date);
            current_date = date;
        }
        let _ = writeln!(
            out,
            "  {:<20} {}",
            or_placeholder(&event.time_string(), "TBD"),
            event.name
        );
        let _ = writeln!(out, "  {:<20} @ {}", "", or_placeholder(&event.location, "-"));
    }
    out
}

pub fn render_resources(resources: &[Resource]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Resources ({})", resources.len());
    for resource in resources {
        let _ = writeln!(
            out,
            "  {:<30} [{}] {}",
            resource.name,
            or_placeholder(&resource.file_type, "?"),
            truncate_string(&resource.description, DESCRIPTION_WIDTH)
        );
    }
    out
}

pub fn render_questions(questions: &[Question]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Frequently Asked Questions ({})", questions.len());
    for question in questions {
        let _ = writeln!(out, "\nQ: {}", question.question);
        let _ = writeln!(out, "A: {}", question.answer);
    }
    out
}

pub fn render_buildings(buildings: &[Building]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Buildings ({})", buildings.len());
    for building in buildings {
        let _ = writeln!(
            out,
            "  {:<30} {}",
            building.name,
            or_placeholder(&building.address, "-")
        );
    }
    out
}

pub fn render_presenter(event: &Event, presenter: Option<&Presenter>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", event.name);
    let _ = writeln!(
        out,
        "{} {}",
        or_placeholder(&event.full_date_string(), "Date TBD"),
        event.time_string()
    );
    match presenter {
        Some(p) => {
            let _ = writeln!(out, "\nPresented by {} - {}", p.name, or_placeholder(&p.job_title, "-"));
            if !p.bio.trim().is_empty() {
                let _ = writeln!(out, "{}", p.bio);
            }
        }
        None => {
            let _ = writeln!(
                out,
                "\nNo presenter found for \"{}\"",
                or_placeholder(&event.presenter, "-")
            );
        }
    }
    out
}

pub fn render_theme(theme: Option<&Theme>, use_current: bool) -> String {
    let mode = if use_current { "current orientation theme" } else { "basic theme" };
    let mut out = String::new();
    let _ = writeln!(out, "Preference: {}", mode);
    match theme {
        Some(t) => {
            let _ = writeln!(out, "{} ({})", t.name, t.semester);
            if !t.description.trim().is_empty() {
                let _ = writeln!(out, "{}", t.description);
            }
            let _ = writeln!(out, "  logo:      {}", or_placeholder(&t.logo.file_name, "-"));
            let _ = writeln!(out, "  primary:   {}", or_placeholder(&t.colors.primary, "-"));
            let _ = writeln!(out, "  secondary: {}", or_placeholder(&t.colors.secondary, "-"));
            let _ = writeln!(out, "  text:      {}", or_placeholder(&t.colors.text, "-"));
        }
        None => {
            let _ = writeln!(out, "No matching theme in the cache");
        }
    }
    out
}

pub fn render_status(cache_dir: &str, valid: bool, age: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cache:   {}", cache_dir);
    let _ = writeln!(out, "Valid:   {}", if valid { "yes" } else { "no" });
    let _ = writeln!(out, "Updated: {}", age.unwrap_or("never"));
    out
}
