//! Derived views over an event timeline and the wall clock.
//!
//! Every function here is pure: the caller supplies `now` in whatever time
//! zone the crew works in. Timeline times are read as wall-clock times on the
//! event's calendar day in that same zone.
//!
//! When `now` falls before every timeline item, the current item is the first
//! one. The same default applies everywhere a current item is needed.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

use super::model::{Event, ShotItem, TimelineItem};
use crate::time_of_day::TimeOfDay;

/// Shots within this many hours of the current item are relevant.
pub const RELEVANT_HOUR_WINDOW: i64 = 2;
pub const MAX_RELEVANT_SHOTS: usize = 4;
/// Shown when the timeline is empty.
pub const FALLBACK_SHOT_COUNT: usize = 3;
/// How long after its start a timeline item counts as active.
pub const ACTIVE_WINDOW_MINUTES: i64 = 30;

fn minutes_since_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> u32 {
    now.hour() * 60 + now.minute()
}

/// The timeline item whose interval `[time_i, time_{i+1})` contains `now`.
///
/// The last item is open-ended. Falls back to the first item when no
/// interval matches; returns `None` only for an empty timeline.
pub fn current_timeline_item<'a, Tz: TimeZone>(
    timeline: &'a [TimelineItem],
    now: &DateTime<Tz>,
) -> Option<&'a TimelineItem> {
    let current = minutes_since_midnight(now);

    for (i, item) in timeline.iter().enumerate() {
        let start = item.time.minutes_since_midnight();
        match timeline.get(i + 1) {
            Some(next) => {
                if current >= start && current < next.time.minutes_since_midnight() {
                    return Some(item);
                }
            }
            None => {
                if current >= start {
                    return Some(item);
                }
            }
        }
    }

    timeline.first()
}

/// Incomplete shots worth surfacing right now.
///
/// With a current item: shots within ±2 hours of its hour (untimed shots
/// always qualify), at most 4. Without one: the first 3 incomplete shots.
pub fn relevant_shots<'a, Tz: TimeZone>(event: &'a Event, now: &DateTime<Tz>) -> Vec<&'a ShotItem> {
    let pending = event.shot_list.iter().filter(|shot| !shot.completed);

    let Some(current) = current_timeline_item(&event.timeline, now) else {
        return pending.take(FALLBACK_SHOT_COUNT).collect();
    };

    let current_hour = i64::from(current.time.hour());
    pending
        .filter(|shot| match shot.time {
            None => true,
            Some(time) => (i64::from(time.hour()) - current_hour).abs() <= RELEVANT_HOUR_WINDOW,
        })
        .take(MAX_RELEVANT_SHOTS)
        .collect()
}

/// Anchors a timeline time on the event's calendar day in `tz`.
///
/// Returns `None` when that wall-clock time does not exist on that day
/// (skipped by a DST transition). Ambiguous times resolve to the earlier one.
pub fn scheduled_at<Tz: TimeZone>(
    event_date: &DateTime<Utc>,
    time: TimeOfDay,
    tz: &Tz,
) -> Option<DateTime<Tz>> {
    let day = event_date.with_timezone(tz).date_naive();
    tz.from_local_datetime(&day.and_time(time.to_naive()))
        .earliest()
}

/// Number of timeline items already started.
///
/// Zero before the event date. Items are counted in order and counting stops
/// at the first one still in the future.
pub fn started_timeline_items<Tz: TimeZone>(event: &Event, now: &DateTime<Tz>) -> usize {
    if *now < event.date {
        return 0;
    }

    let tz = now.timezone();
    event
        .timeline
        .iter()
        .take_while(|item| {
            scheduled_at(&event.date, item.time, &tz).is_some_and(|at| *now >= at)
        })
        .count()
}

/// Share of timeline items already started, in `[0, 100]`.
///
/// Zero before the event date or for an empty timeline.
pub fn timeline_progress<Tz: TimeZone>(event: &Event, now: &DateTime<Tz>) -> f64 {
    if event.timeline.is_empty() {
        return 0.0;
    }
    started_timeline_items(event, now) as f64 / event.timeline.len() as f64 * 100.0
}

/// An item is active from its start time until 30 minutes later.
pub fn is_timeline_item_active<Tz: TimeZone>(
    event: &Event,
    item: &TimelineItem,
    now: &DateTime<Tz>,
) -> bool {
    let Some(at) = scheduled_at(&event.date, item.time, &now.timezone()) else {
        return false;
    };
    let elapsed = now.clone().signed_duration_since(at);
    elapsed >= Duration::zero() && elapsed <= Duration::minutes(ACTIVE_WINDOW_MINUTES)
}
