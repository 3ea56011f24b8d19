//! Validated time-of-day value.
//!
//! Timeline items and shots are scheduled by clock time only; the calendar
//! date comes from the owning event.

use crate::error::{CrewError, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A wall-clock time with minute precision.
///
/// Accepted input forms:
/// - `HH:MM` / `H:MM` on a 24-hour clock (`09:00`, `14:30`)
/// - `H:MM AM` / `H:MM PM` on a 12-hour clock (`2:30 PM`, `12:00 am`)
///
/// Always serialized as zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(CrewError::validation(format!(
                "time of day out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minute)
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    pub fn to_naive(&self) -> NaiveTime {
        // hour/minute are range-checked at construction
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

fn parse_component(raw: &str, what: &str, input: &str) -> Result<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrewError::validation(format!(
            "invalid {what} in time of day '{input}'"
        )));
    }
    raw.parse::<u32>()
        .map_err(|_| CrewError::validation(format!("invalid {what} in time of day '{input}'")))
}

impl FromStr for TimeOfDay {
    type Err = CrewError;

    fn from_str(input: &str) -> Result<Self> {
        let mut parts = input.split_whitespace();
        let clock = parts
            .next()
            .ok_or_else(|| CrewError::validation("empty time of day"))?;
        let meridiem = parts.next();
        if parts.next().is_some() {
            return Err(CrewError::validation(format!(
                "unexpected trailing text in time of day '{input}'"
            )));
        }

        let (raw_hour, raw_minute) = clock
            .split_once(':')
            .ok_or_else(|| CrewError::validation(format!("expected HH:MM, got '{input}'")))?;
        let hour = parse_component(raw_hour, "hour", input)?;
        if raw_minute.len() != 2 {
            return Err(CrewError::validation(format!(
                "minutes must have two digits in '{input}'"
            )));
        }
        let minute = parse_component(raw_minute, "minute", input)?;

        let hour = match meridiem.map(|m| m.to_ascii_uppercase()) {
            None => hour,
            Some(m) if m == "AM" || m == "PM" => {
                if !(1..=12).contains(&hour) {
                    return Err(CrewError::validation(format!(
                        "12-hour clock hour out of range in '{input}'"
                    )));
                }
                match (m.as_str(), hour) {
                    ("AM", 12) => 0,
                    ("AM", h) => h,
                    ("PM", 12) => 12,
                    (_, h) => h + 12,
                }
            }
            Some(_) => {
                return Err(CrewError::validation(format!(
                    "expected AM or PM in '{input}'"
                )));
            }
        };

        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = CrewError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}
