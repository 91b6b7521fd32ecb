//! Champlain Compass CLI - the orientation guide in a terminal.
//!
//! Imports a realtime database export into the local cache, then renders
//! the schedule, resources, FAQ, campus buildings and theme from it,
//! fully offline.

mod app;
mod render;
mod utils;

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

const USAGE: &str = "\
Usage: compass <command>

Commands:
  sync <export.json>                     Import a database export into the cache
  status                                 Show cache location, validity and age
  schedule [year month [day]] [--group G] Events for a month or a day
  group <G>                              All events for an attendee group
  resources                              Active resources
  faq                                    Active frequently asked questions
  buildings                              Active campus buildings
  presenter <event name>                 Presenter of an event
  theme [current|basic]                  Show the preferred theme, or set the preference
  default-group [G]                      Set (or clear) the group schedules filter by
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Sync(PathBuf),
    Status,
    Schedule {
        date: Option<(i32, u32, Option<u32>)>,
        group: Option<String>,
    },
    Group(String),
    Resources,
    Faq,
    Buildings,
    Presenter(String),
    Theme(Option<bool>),
    DefaultGroup(Option<String>),
    Help,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {}: {}", what, value))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };
    let rest = &args[1..];

    match command.as_str() {
        "sync" => match rest {
            [path] => Ok(Command::Sync(PathBuf::from(path))),
            _ => bail!("sync takes exactly one export file"),
        },
        "status" => Ok(Command::Status),
        "schedule" => {
            let mut group = None;
            let mut positional = Vec::new();
            let mut iter = rest.iter();
            while let Some(arg) = iter.next() {
                if arg == "--group" {
                    let value = iter.next().ok_or_else(|| anyhow!("--group needs a value"))?;
                    group = Some(value.clone());
                } else {
                    positional.push(arg.as_str());
                }
            }
            let date = match positional.as_slice() {
                [] => None,
                [year, month] => Some((parse_number(year, "year")?, parse_number(month, "month")?, None)),
                [year, month, day] => Some((
                    parse_number(year, "year")?,
                    parse_number(month, "month")?,
                    Some(parse_number(day, "day")?),
                )),
                _ => bail!("schedule takes a year and month, and optionally a day"),
            };
            if let Some((_, month, day)) = date {
                if !(1..=12).contains(&month) {
                    bail!("Invalid month: {}", month);
                }
                if day.is_some_and(|d| !(1..=31).contains(&d)) {
                    bail!("Invalid day: {}", day.unwrap_or_default());
                }
            }
            Ok(Command::Schedule { date, group })
        }
        "group" => match rest {
            [group] => Ok(Command::Group(group.clone())),
            _ => bail!("group takes exactly one group name"),
        },
        "resources" => Ok(Command::Resources),
        "faq" => Ok(Command::Faq),
        "buildings" => Ok(Command::Buildings),
        "presenter" if !rest.is_empty() => Ok(Command::Presenter(rest.join(" "))),
        "presenter" => bail!("presenter needs an event name"),
        "theme" => match rest {
            [] => Ok(Command::Theme(None)),
            [mode] if mode == "current" => Ok(Command::Theme(Some(true))),
            [mode] if mode == "basic" => Ok(Command::Theme(Some(false))),
            _ => bail!("theme takes 'current' or 'basic'"),
        },
        "default-group" => match rest {
            [] => Ok(Command::DefaultGroup(None)),
            [group] => Ok(Command::DefaultGroup(Some(group.clone()))),
            _ => bail!("default-group takes at most one group name"),
        },
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        print!("{}", USAGE);
        return Ok(());
    }

    let mut app = App::new()?;
    info!(?command, "Compass starting");

    match &command {
        Command::Sync(path) => {
            let summary = app.sync(path).await?;
            println!(
                "Applied {} of {} records from {}",
                summary.applied,
                summary.received,
                path.display()
            );
            for (collection, count) in &summary.counts {
                println!("  {:<12} {}", collection, count);
            }
            return Ok(());
        }
        Command::Status => {
            let valid = app.store.is_cache_valid();
            let age = app.store.cache().cache_age();
            print!(
                "{}",
                render::render_status(&app.cache_dir().display().to_string(), valid, age.as_deref())
            );
            return Ok(());
        }
        Command::DefaultGroup(group) => {
            app.set_default_group(group.clone())?;
            match app.default_group() {
                Some(group) => println!("Default group set to {}", group),
                None => println!("Default group cleared"),
            }
            return Ok(());
        }
        Command::Theme(Some(use_current)) => {
            app.store
                .cache()
                .set_use_current_theme(*use_current)
                .context("Failed to save theme preference")?;
        }
        _ => {}
    }

    if !app.load_from_cache() {
        bail!("No usable cached data. Run `compass sync <export.json>` first.");
    }

    let output = match command {
        Command::Schedule { date, group } => {
            let group = group.as_deref().or(app.default_group());
            let (year, month, day) = date.unwrap_or_else(|| {
                let today = Local::now().date_naive();
                (today.year(), today.month(), None)
            });
            let events = match day {
                Some(day) => app.store.events_for_day(month, day, year, group),
                None => app.store.events_for_month(month, year, group),
            };
            let mut title = utils::schedule_label(year, month, day);
            if let Some(group) = group {
                title = format!("{} [{}]", title, group);
            }
            render::render_events(&title, &events)
        }
        Command::Group(group) => render::render_events(&group, &app.store.events_for_group(&group)),
        Command::Resources => render::render_resources(&app.store.active_resources()),
        Command::Faq => render::render_questions(&app.store.active_questions()),
        Command::Buildings => render::render_buildings(&app.store.active_buildings()),
        Command::Presenter(name) => {
            let event = app
                .store
                .snapshot()
                .events
                .into_iter()
                .find(|e| e.name == name)
                .ok_or_else(|| anyhow!("No event named \"{}\"", name))?;
            let presenter = app.store.presenter_for(&event);
            render::render_presenter(&event, presenter.as_ref())
        }
        Command::Theme(_) => render::render_theme(
            app.store.preferred_theme().as_ref(),
            app.store.cache().use_current_theme(),
        ),
        Command::Sync(_) | Command::Status | Command::DefaultGroup(_) | Command::Help => {
            String::new()
        }
    };
    print!("{}", output);

    info!("Compass shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_no_args_is_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_schedule_month_with_group() {
        let command = parse_args(&args(&["schedule", "2024", "6", "--group", "Parents"])).unwrap();
        assert_eq!(
            command,
            Command::Schedule {
                date: Some((2024, 6, None)),
                group: Some("Parents".to_string())
            }
        );
    }

    #[test]
    fn test_parse_schedule_day() {
        let command = parse_args(&args(&["schedule", "2024", "06", "03"])).unwrap();
        assert_eq!(
            command,
            Command::Schedule {
                date: Some((2024, 6, Some(3))),
                group: None
            }
        );
    }

    #[test]
    fn test_parse_schedule_rejects_bad_month() {
        assert!(parse_args(&args(&["schedule", "2024", "13"])).is_err());
        assert!(parse_args(&args(&["schedule", "2024", "june"])).is_err());
        assert!(parse_args(&args(&["schedule", "2024"])).is_err());
    }

    #[test]
    fn test_parse_presenter_joins_words() {
        assert_eq!(
            parse_args(&args(&["presenter", "Welcome", "Session"])).unwrap(),
            Command::Presenter("Welcome Session".to_string())
        );
        assert!(parse_args(&args(&["presenter"])).is_err());
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!(parse_args(&args(&["theme"])).unwrap(), Command::Theme(None));
        assert_eq!(parse_args(&args(&["theme", "basic"])).unwrap(), Command::Theme(Some(false)));
        assert!(parse_args(&args(&["theme", "dark"])).is_err());
    }

    #[test]
    fn test_parse_default_group() {
        assert_eq!(
            parse_args(&args(&["default-group", "Parents"])).unwrap(),
            Command::DefaultGroup(Some("Parents".to_string()))
        );
        assert_eq!(parse_args(&args(&["default-group"])).unwrap(), Command::DefaultGroup(None));
        assert!(parse_args(&args(&["default-group", "a", "b"])).is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(parse_args(&args(&["launch"])).is_err());
    }
}
