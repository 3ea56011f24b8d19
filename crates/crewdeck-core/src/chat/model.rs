//! Chat domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CrewError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<ChatMessage>,
    #[serde(default)]
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the chat store persists: rooms plus messages keyed by room id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatSnapshot {
    pub rooms: Vec<ChatRoom>,
    #[serde(default)]
    pub messages: BTreeMap<String, Vec<ChatMessage>>,
}

impl ChatSnapshot {
    pub fn room(&self, room_id: &str) -> Option<&ChatRoom> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    fn room_mut(&mut self, room_id: &str) -> Result<&mut ChatRoom> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| CrewError::not_found("chat room", room_id))
    }

    /// Messages of a room in arrival order. Unknown rooms have none.
    pub fn room_messages(&self, room_id: &str) -> &[ChatMessage] {
        self.messages
            .get(room_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn unread_total(&self) -> u32 {
        self.rooms.iter().map(|r| r.unread_count).sum()
    }

    /// Appends a message and refreshes the room's last-message snapshot.
    ///
    /// The unread counter is left alone; it tracks messages from others.
    pub fn append_message(&mut self, room_id: &str, message: ChatMessage) -> Result<()> {
        let room = self.room_mut(room_id)?;
        room.updated_at = message.timestamp;
        room.last_message = Some(message.clone());
        self.messages
            .entry(room_id.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    /// Marks every message in the room read and zeroes its unread counter.
    pub fn mark_read(&mut self, room_id: &str) -> Result<()> {
        self.room_mut(room_id)?.unread_count = 0;
        if let Some(messages) = self.messages.get_mut(room_id) {
            for message in messages.iter_mut() {
                message.is_read = true;
            }
        }
        Ok(())
    }
}
