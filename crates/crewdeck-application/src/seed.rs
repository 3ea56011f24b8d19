//! Demo data used when a store starts with nothing persisted.

use chrono::{DateTime, Duration, Utc};
use crewdeck_core::chat::{ChatMessage, ChatRoom, ChatSnapshot, MessageType};
use crewdeck_core::event::{
    Event, EventKind, EventStatus, MediaType, ShotItem, ShotPriority, TeamMember, TeamRole,
    TimelineCategory, TimelineItem,
};
use crewdeck_core::user::{Preferences, ServiceType, User, UserRole};
use crewdeck_core::TimeOfDay;
use std::collections::BTreeMap;

/// Builds a `TimeOfDay` from constants known to be in range.
fn at(hour: u32, minute: u32) -> Option<TimeOfDay> {
    TimeOfDay::new(hour, minute).ok()
}

fn member(id: &str, name: &str, role: TeamRole, online: bool) -> TeamMember {
    TeamMember {
        id: id.to_string(),
        name: name.to_string(),
        role,
        avatar: None,
        is_online: Some(online),
    }
}

fn shot(
    id: &str,
    title: &str,
    time: Option<TimeOfDay>,
    priority: ShotPriority,
    media_type: MediaType,
    assigned_to: &[&str],
) -> ShotItem {
    ShotItem {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        time,
        location: None,
        equipment: Vec::new(),
        assigned_to: assigned_to.iter().map(|s| s.to_string()).collect(),
        completed: false,
        priority,
        media_type,
    }
}

fn timeline(items: &[(&str, Option<TimeOfDay>, &str, TimelineCategory)]) -> Vec<TimelineItem> {
    items
        .iter()
        .filter_map(|(id, time, title, category)| {
            Some(TimelineItem {
                id: id.to_string(),
                time: (*time)?,
                title: title.to_string(),
                description: None,
                category: *category,
            })
        })
        .collect()
}

/// Two demo events: a wedding happening today and an upcoming corporate shoot.
pub fn demo_events(now: DateTime<Utc>) -> Vec<Event> {
    let today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
        .unwrap_or(now);

    let crew = vec![
        member("1", "Alex Chen", TeamRole::Photographer, true),
        member("2", "Maria Rodriguez", TeamRole::Videographer, true),
        member("4", "Jordan Lee", TeamRole::Assistant, false),
    ];

    let wedding = Event {
        id: "1".to_string(),
        title: "Sarah & Mike Wedding".to_string(),
        date: today,
        location: "Rosewood Manor, Napa Valley".to_string(),
        cover_image: String::new(),
        client: "Sarah Johnson".to_string(),
        kind: EventKind::Wedding,
        team: crew.clone(),
        shot_list: vec![
            shot("s1", "Bride getting ready", at(9, 30), ShotPriority::High, MediaType::Both, &["1", "2"]),
            shot("s2", "Ring detail", at(10, 0), ShotPriority::Medium, MediaType::Photo, &["1"]),
            shot("s3", "First look", at(11, 0), ShotPriority::High, MediaType::Both, &["1", "2"]),
            shot("s4", "Ceremony processional", at(14, 0), ShotPriority::High, MediaType::Video, &["2"]),
            shot("s5", "Family formals", at(15, 0), ShotPriority::Medium, MediaType::Photo, &["1", "4"]),
            shot("s6", "Venue b-roll", None, ShotPriority::Low, MediaType::Video, &["2"]),
        ],
        timeline: timeline(&[
            ("t1", at(9, 0), "Getting Ready", TimelineCategory::Preparation),
            ("t2", at(10, 30), "Ceremony", TimelineCategory::Shooting),
            ("t3", at(14, 0), "Reception", TimelineCategory::Shooting),
            ("t4", at(17, 0), "Wrap", TimelineCategory::Transition),
        ]),
        notes: Vec::new(),
        status: EventStatus::Active,
        color: "#667eea".to_string(),
    };

    let corporate = Event {
        id: "2".to_string(),
        title: "Corporate Event".to_string(),
        date: today + Duration::days(3),
        location: "Moscone Center, San Francisco".to_string(),
        cover_image: String::new(),
        client: "TechCorp Inc.".to_string(),
        kind: EventKind::Corporate,
        team: crew[..2].to_vec(),
        shot_list: vec![
            shot("c1", "Keynote wide", at(10, 0), ShotPriority::High, MediaType::Both, &["1", "2"]),
            shot("c2", "Speaker portraits", at(12, 30), ShotPriority::Medium, MediaType::Photo, &["1"]),
            shot("c3", "Networking candids", at(16, 0), ShotPriority::Low, MediaType::Photo, &["1"]),
        ],
        timeline: timeline(&[
            ("ct1", at(8, 0), "Load-in", TimelineCategory::Preparation),
            ("ct2", at(10, 0), "Keynote", TimelineCategory::Shooting),
            ("ct3", at(12, 0), "Lunch", TimelineCategory::Break),
            ("ct4", at(13, 0), "Breakouts", TimelineCategory::Shooting),
        ]),
        notes: Vec::new(),
        status: EventStatus::Upcoming,
        color: "#f093fb".to_string(),
    };

    vec![wedding, corporate]
}

fn room(
    id: &str,
    name: &str,
    event_id: Option<&str>,
    participants: &[&str],
    unread_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> ChatRoom {
    ChatRoom {
        id: id.to_string(),
        name: name.to_string(),
        event_id: event_id.map(str::to_string),
        participants: participants.iter().map(|p| p.to_string()).collect(),
        last_message: None,
        unread_count,
        created_at,
        updated_at,
    }
}

fn message(
    id: &str,
    sender: (&str, &str),
    content: &str,
    timestamp: DateTime<Utc>,
    is_read: bool,
) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        sender_id: sender.0.to_string(),
        sender_name: sender.1.to_string(),
        sender_avatar: None,
        content: content.to_string(),
        message_type: MessageType::Text,
        timestamp,
        event_id: None,
        is_read,
        reply_to: None,
        attachments: Vec::new(),
    }
}

/// The general room plus one room per demo event, with a little history.
pub fn demo_chat(now: DateTime<Utc>) -> ChatSnapshot {
    let alex = ("1", "Alex Chen");
    let maria = ("2", "Maria Rodriguez");
    let sarah = ("3", "Sarah Johnson");
    let minutes = Duration::minutes;

    let rooms = vec![
        room("general", "General Chat", None, &["1", "2", "3"], 0, now - Duration::days(7), now),
        room(
            "event-1",
            "Sarah & Mike Wedding",
            Some("1"),
            &["1", "2", "3"],
            2,
            now - Duration::days(3),
            now - minutes(15),
        ),
        room(
            "event-2",
            "Corporate Event",
            Some("2"),
            &["1", "2"],
            0,
            now - Duration::days(2),
            now - Duration::hours(2),
        ),
    ];

    let mut messages = BTreeMap::new();
    messages.insert(
        "general".to_string(),
        vec![
            message("1", maria, "Hey everyone! Ready for the weekend shoots?", now - Duration::hours(2), true),
            message("2", alex, "Absolutely! Just finished prepping all my gear.", now - Duration::hours(1), true),
            message("3", sarah, "Thanks for all your hard work team!", now - minutes(30), false),
        ],
    );
    messages.insert(
        "event-1".to_string(),
        vec![
            message("4", sarah, "The venue looks amazing! Can't wait to see the photos.", now - minutes(45), false),
            message("5", alex, "Just arrived at the venue. The lighting is perfect!", now - minutes(15), false),
        ],
    );
    messages.insert(
        "event-2".to_string(),
        vec![message(
            "6",
            maria,
            "Equipment check complete. All cameras are ready to go.",
            now - Duration::hours(2),
            true,
        )],
    );

    ChatSnapshot { rooms, messages }
}

/// A ready-made identity for quick login, one per demo role.
pub fn demo_user(role: UserRole, now: DateTime<Utc>) -> User {
    let (id, name, service_type) = match role {
        UserRole::Photographer => ("1", "Alex Chen", ServiceType::Photography),
        UserRole::Videographer => ("2", "Maria Rodriguez", ServiceType::Videography),
        UserRole::Client => ("3", "Sarah Johnson", ServiceType::Hybrid),
        UserRole::Assistant => ("4", "Jordan Lee", ServiceType::Photography),
        UserRole::Director => ("5", "Sam Patel", ServiceType::Hybrid),
    };
    User {
        id: id.to_string(),
        email: format!("{}@example.com", role),
        name: name.to_string(),
        avatar: None,
        role,
        service_type,
        company: None,
        phone: None,
        bio: None,
        location: None,
        is_online: true,
        last_seen: now,
        preferences: Preferences::default(),
        crm_contact_id: None,
        crm_deal_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_events_are_well_formed() {
        let events = demo_events(Utc::now());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timeline.len(), 4);
        assert!(events.iter().all(|e| !e.shot_list.is_empty()));
    }

    #[test]
    fn test_demo_chat_rooms_have_history() {
        let chat = demo_chat(Utc::now());
        for room in &chat.rooms {
            assert!(!chat.room_messages(&room.id).is_empty(), "room {}", room.id);
        }
        assert_eq!(chat.unread_total(), 2);
    }

    #[test]
    fn test_demo_user_email_follows_role() {
        let user = demo_user(UserRole::Videographer, Utc::now());
        assert_eq!(user.email, "videographer@example.com");
    }
}
