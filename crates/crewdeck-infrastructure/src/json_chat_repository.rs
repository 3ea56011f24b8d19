//! JSON file implementation of [`ChatRepository`].

use crate::storage::{AtomicJsonFile, run_blocking};
use async_trait::async_trait;
use crewdeck_core::chat::{ChatRepository, ChatSnapshot};
use crewdeck_core::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Stores rooms and messages in `chat.json`.
pub struct JsonChatRepository {
    file: Arc<AtomicJsonFile<ChatSnapshot>>,
}

impl JsonChatRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }
}

#[async_trait]
impl ChatRepository for JsonChatRepository {
    async fn load(&self) -> Result<Option<ChatSnapshot>> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.load()?)).await
    }

    async fn save(&self, snapshot: &ChatSnapshot) -> Result<()> {
        let file = self.file.clone();
        let snapshot = snapshot.clone();
        run_blocking(move || Ok(file.save(&snapshot)?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crewdeck_core::chat::{ChatMessage, ChatRoom, MessageType};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonChatRepository::new(temp_dir.path().join("chat.json"));
        assert!(repository.load().await.unwrap().is_none());

        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let message = ChatMessage {
            id: "1".to_string(),
            sender_id: "2".to_string(),
            sender_name: "Maria Rodriguez".to_string(),
            sender_avatar: None,
            content: "Equipment check complete.".to_string(),
            message_type: MessageType::Text,
            timestamp: at,
            event_id: Some("2".to_string()),
            is_read: true,
            reply_to: None,
            attachments: vec![],
        };
        let snapshot = ChatSnapshot {
            rooms: vec![ChatRoom {
                id: "event-2".to_string(),
                name: "Corporate Event".to_string(),
                event_id: Some("2".to_string()),
                participants: vec!["1".to_string(), "2".to_string()],
                last_message: Some(message.clone()),
                unread_count: 0,
                created_at: at,
                updated_at: at,
            }],
            messages: BTreeMap::from([("event-2".to_string(), vec![message])]),
        };

        repository.save(&snapshot).await.unwrap();
        assert_eq!(repository.load().await.unwrap(), Some(snapshot));
    }
}
