use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use crewdeck_application::CrewdeckApp;
use crewdeck_core::event::timeline::{
    current_timeline_item, is_timeline_item_active, relevant_shots, started_timeline_items,
    timeline_progress,
};
use crewdeck_core::event::{Event, EventDraft, EventKind, EventStatus};
use serde_json::json;

use super::utils::{local_time, parse_choice, print_json, truncate};

#[derive(Subcommand)]
pub enum EventsAction {
    /// List events
    List {
        /// Only events with this status (upcoming, active, completed)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show an event with its live timeline (defaults to the active event)
    Show { event_id: Option<String> },
    /// Flip a shot's completion flag
    ToggleShot { event_id: String, shot_id: String },
    /// Attach a note, authored by the signed-in user
    AddNote { event_id: String, content: String },
    /// Create an event
    Create {
        title: String,
        /// Event date, YYYY-MM-DD (local) or RFC 3339
        #[arg(long)]
        date: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        client: String,
        /// wedding, corporate, portrait, commercial or documentary
        #[arg(long, default_value = "wedding")]
        kind: String,
        #[arg(long, default_value = "upcoming")]
        status: String,
        #[arg(long, default_value = "#667eea")]
        color: String,
    },
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", raw))?;
    let midnight = day.and_hms_opt(0, 0, 0).context("invalid date")?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .with_context(|| format!("'{}' does not exist in the local time zone", raw))
}

pub async fn run(app: &CrewdeckApp, action: EventsAction, json: bool) -> Result<()> {
    match action {
        EventsAction::List { status } => {
            let events: Vec<Event> = match status {
                Some(raw) => match parse_choice::<EventStatus>("status", &raw)? {
                    EventStatus::Upcoming => app.events.upcoming_events(),
                    EventStatus::Active => app.events.active_events(),
                    EventStatus::Completed => app
                        .events
                        .events()
                        .iter()
                        .filter(|e| e.status == EventStatus::Completed)
                        .cloned()
                        .collect(),
                },
                None => app.events.events().to_vec(),
            };
            if json {
                return print_json(&events);
            }
            for event in &events {
                let summary = event.shot_summary();
                println!(
                    "{:<14} {:<10} {}  {}  [{}/{} shots]",
                    event.id,
                    format!("{:?}", event.status).to_lowercase(),
                    local_time(&event.date),
                    truncate(&event.title, 40),
                    summary.completed,
                    summary.total
                );
            }
        }
        EventsAction::Show { event_id } => {
            let event = match event_id {
                Some(id) => app.events.event(&id).with_context(|| format!("event '{}' not found", id))?,
                None => app.events.active_event().context("no active event")?,
            };
            app.events.select_event(Some(&event.id));
            show(app, &event, json)?;
        }
        EventsAction::ToggleShot { event_id, shot_id } => {
            let completed = app.events.toggle_shot_complete(&event_id, &shot_id).await?;
            if json {
                return print_json(&json!({ "eventId": event_id, "shotId": shot_id, "completed": completed }));
            }
            println!("Shot {} is now {}", shot_id, if completed { "done" } else { "pending" });
        }
        EventsAction::AddNote { event_id, content } => {
            let user = app.session.user().context("sign in to add notes")?;
            let note = app
                .events
                .add_note(&event_id, &content, &user.name, user.avatar.clone())
                .await?;
            if json {
                return print_json(&note);
            }
            println!("Added note {}", note.id);
        }
        EventsAction::Create {
            title,
            date,
            location,
            client,
            kind,
            status,
            color,
        } => {
            let draft = EventDraft {
                title,
                date: parse_date(&date)?,
                location,
                cover_image: String::new(),
                client,
                kind: parse_choice::<EventKind>("event type", &kind)?,
                team: Vec::new(),
                shot_list: Vec::new(),
                timeline: Vec::new(),
                notes: Vec::new(),
                status: parse_choice("status", &status)?,
                color,
            };
            let id = app.events.add_event(draft).await?;
            if json {
                return print_json(&json!({ "id": id }));
            }
            println!("Created event {}", id);
        }
    }
    Ok(())
}

fn show(app: &CrewdeckApp, event: &Event, json: bool) -> Result<()> {
    let now = app.events.now().with_timezone(&Local);
    let current = current_timeline_item(&event.timeline, &now);
    let progress = timeline_progress(event, &now);
    let started = started_timeline_items(event, &now);
    let relevant = relevant_shots(event, &now);

    if json {
        return print_json(&json!({
            "event": event,
            "currentItem": current,
            "progress": progress,
            "completedItems": started,
            "relevantShots": relevant,
            "shotSummary": {
                "completed": event.shot_summary().completed,
                "total": event.shot_summary().total,
            },
        }));
    }

    println!("{} ({})", event.title, event.client);
    println!("  {} at {}", local_time(&event.date), event.location);
    println!(
        "  timeline {:.0}% ({} of {} done)",
        progress,
        started,
        event.timeline.len()
    );
    for item in &event.timeline {
        let marker = if current.is_some_and(|c| c.id == item.id) {
            ">"
        } else {
            " "
        };
        let live = if is_timeline_item_active(event, item, &now) {
            " (live)"
        } else {
            ""
        };
        println!("  {} {} {}{}", marker, item.time, item.title, live);
    }

    let summary = event.shot_summary();
    println!("  shots {}/{} ({:.0}%)", summary.completed, summary.total, summary.percent());
    for shot in relevant {
        let time = shot.time.map(|t| t.to_string()).unwrap_or_else(|| "--:--".to_string());
        println!("    [ ] {} {} ({})", time, shot.title, shot.id);
    }
    if !event.notes.is_empty() {
        println!("  notes");
        for note in &event.notes {
            println!("    {} {}: {}", local_time(&note.timestamp), note.author, note.content);
        }
    }
    Ok(())
}
