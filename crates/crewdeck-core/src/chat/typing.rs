//! Typing indicators.
//!
//! Indicators are never persisted. Each one lives until it is stopped
//! explicitly or until a sweep finds it older than the time-to-live.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    pub user_id: String,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-room typing indicators, at most one per user per room.
#[derive(Debug, Clone, Default)]
pub struct TypingRegistry {
    rooms: HashMap<String, Vec<TypingIndicator>>,
}

impl TypingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the user's indicator or refreshes its timestamp.
    pub fn start(&mut self, room_id: &str, user_id: &str, user_name: &str, now: DateTime<Utc>) {
        let entries = self.rooms.entry(room_id.to_string()).or_default();
        match entries.iter_mut().find(|t| t.user_id == user_id) {
            Some(existing) => existing.timestamp = now,
            None => entries.push(TypingIndicator {
                user_id: user_id.to_string(),
                user_name: user_name.to_string(),
                timestamp: now,
            }),
        }
    }

    /// Removes the user's indicator. Returns whether one was present.
    pub fn stop(&mut self, room_id: &str, user_id: &str) -> bool {
        let Some(entries) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|t| t.user_id != user_id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }

    /// Drops indicators whose age has reached `ttl`. Returns how many went.
    pub fn sweep(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut removed = 0;
        self.rooms.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|t| now.signed_duration_since(t.timestamp) < ttl);
            removed += before - entries.len();
            !entries.is_empty()
        });
        removed
    }

    pub fn users(&self, room_id: &str) -> Vec<TypingIndicator> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::seconds(3)
    }

    #[test]
    fn test_indicator_present_at_two_seconds_gone_at_five() {
        let t = Utc::now();
        let mut registry = TypingRegistry::new();
        registry.start("general", "1", "Alex", t);

        registry.sweep(t + Duration::seconds(2), ttl());
        assert_eq!(registry.users("general").len(), 1);

        registry.sweep(t + Duration::seconds(5), ttl());
        assert!(registry.users("general").is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expires_exactly_at_ttl() {
        let t = Utc::now();
        let mut registry = TypingRegistry::new();
        registry.start("general", "1", "Alex", t);

        assert_eq!(registry.sweep(t + Duration::milliseconds(2_999), ttl()), 0);
        assert_eq!(registry.sweep(t + Duration::seconds(3), ttl()), 1);
    }

    #[test]
    fn test_start_refreshes_instead_of_duplicating() {
        let t = Utc::now();
        let mut registry = TypingRegistry::new();
        registry.start("general", "1", "Alex", t);
        registry.start("general", "1", "Alex", t + Duration::seconds(2));

        let users = registry.users("general");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].timestamp, t + Duration::seconds(2));

        // The refresh keeps it alive past the original deadline.
        registry.sweep(t + Duration::seconds(4), ttl());
        assert_eq!(registry.users("general").len(), 1);
    }

    #[test]
    fn test_stop_is_per_user_and_room() {
        let t = Utc::now();
        let mut registry = TypingRegistry::new();
        registry.start("general", "1", "Alex", t);
        registry.start("general", "2", "Maria", t);
        registry.start("event-1", "1", "Alex", t);

        assert!(registry.stop("general", "1"));
        assert!(!registry.stop("general", "1"));
        assert_eq!(registry.users("general")[0].user_id, "2");
        assert_eq!(registry.users("event-1").len(), 1);
    }
}
