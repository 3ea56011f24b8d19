//! Event domain model.
//!
//! Field names serialize in camelCase so stored `events.json` files stay
//! compatible with records written by the mobile client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CrewError, Result};
use crate::time_of_day::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Wedding,
    Corporate,
    Portrait,
    Commercial,
    Documentary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Photographer,
    Videographer,
    Assistant,
    Director,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: TeamRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
    Both,
}

/// A planned capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Untimed shots are always considered relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    pub priority: ShotPriority,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineCategory {
    Preparation,
    Shooting,
    Break,
    Transition,
}

/// One phase of the event day. Position in the timeline is its order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub time: TimeOfDay,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category: TimelineCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// A scheduled engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub cover_image: String,
    pub client: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub shot_list: Vec<ShotItem>,
    #[serde(default)]
    pub timeline: Vec<TimelineItem>,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub status: EventStatus,
    #[serde(default)]
    pub color: String,
}

impl Event {
    pub fn shot(&self, shot_id: &str) -> Option<&ShotItem> {
        self.shot_list.iter().find(|s| s.id == shot_id)
    }

    /// Flips one shot's completion flag and returns the new value.
    pub fn toggle_shot(&mut self, shot_id: &str) -> Result<bool> {
        let shot = self
            .shot_list
            .iter_mut()
            .find(|s| s.id == shot_id)
            .ok_or_else(|| CrewError::not_found("shot", shot_id))?;
        shot.completed = !shot.completed;
        Ok(shot.completed)
    }

    pub fn shot_summary(&self) -> ShotSummary {
        ShotSummary {
            completed: self.shot_list.iter().filter(|s| s.completed).count(),
            total: self.shot_list.len(),
        }
    }
}

/// Completed versus planned shots for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShotSummary {
    pub completed: usize,
    pub total: usize,
}

impl ShotSummary {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// An event without an id, as submitted for creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub cover_image: String,
    pub client: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub shot_list: Vec<ShotItem>,
    #[serde(default)]
    pub timeline: Vec<TimelineItem>,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub status: EventStatus,
    #[serde(default)]
    pub color: String,
}

impl EventDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CrewError::validation("event title must not be empty"));
        }
        Ok(())
    }

    pub fn into_event(self, id: String) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            location: self.location,
            cover_image: self.cover_image,
            client: self.client,
            kind: self.kind,
            team: self.team,
            shot_list: self.shot_list,
            timeline: self.timeline,
            notes: self.notes,
            status: self.status,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn shot(id: &str, completed: bool) -> ShotItem {
        ShotItem {
            id: id.to_string(),
            title: format!("Shot {id}"),
            description: None,
            time: Some("10:00".parse().unwrap()),
            location: None,
            equipment: vec!["50mm".to_string()],
            assigned_to: vec![],
            completed,
            priority: ShotPriority::High,
            media_type: MediaType::Photo,
        }
    }

    fn event() -> Event {
        EventDraft {
            title: "Garden Wedding".to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap(),
            location: "Rose Garden".to_string(),
            cover_image: String::new(),
            client: "The Parkers".to_string(),
            kind: EventKind::Wedding,
            team: vec![],
            shot_list: vec![shot("s1", false), shot("s2", true)],
            timeline: vec![TimelineItem {
                id: "t1".to_string(),
                time: "9:00 AM".parse().unwrap(),
                title: "Setup".to_string(),
                description: None,
                category: TimelineCategory::Preparation,
            }],
            notes: vec![Note {
                id: "n1".to_string(),
                author: "Alex".to_string(),
                author_avatar: None,
                content: "Bring reflectors".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 6, 14, 18, 30, 15).unwrap(),
                attachments: vec![],
            }],
            status: EventStatus::Upcoming,
            color: "#FF6B6B".to_string(),
        }
        .into_event("1".to_string())
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut e = event();
        assert!(e.toggle_shot("s1").unwrap());
        assert!(e.shot("s1").unwrap().completed);
        assert!(!e.toggle_shot("s1").unwrap());
        assert_eq!(e, event());
    }

    #[test]
    fn test_toggle_unknown_shot_is_not_found() {
        let mut e = event();
        let err = e.toggle_shot("missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(e, event());
    }

    #[test]
    fn test_shot_summary() {
        let summary = event().shot_summary();
        assert_eq!(summary, ShotSummary { completed: 1, total: 2 });
        assert_eq!(summary.percent(), 50.0);
        assert_eq!(ShotSummary { completed: 0, total: 0 }.percent(), 0.0);
    }

    #[test]
    fn test_json_round_trip_preserves_timestamps() {
        let original = event();
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"shotList\""));
        assert!(json.contains("\"type\":\"wedding\""));
        assert!(json.contains("\"time\":\"09:00\""));

        let restored: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.date, original.date);
        assert_eq!(restored.notes[0].timestamp, original.notes[0].timestamp);
    }

    #[test]
    fn test_draft_requires_title() {
        let mut draft = EventDraft {
            title: " ".to_string(),
            date: Utc::now(),
            location: String::new(),
            cover_image: String::new(),
            client: String::new(),
            kind: EventKind::Portrait,
            team: vec![],
            shot_list: vec![],
            timeline: vec![],
            notes: vec![],
            status: EventStatus::Upcoming,
            color: String::new(),
        };
        assert!(draft.validate().unwrap_err().is_validation());
        draft.title = "Headshots".to_string();
        assert!(draft.validate().is_ok());
    }
}
