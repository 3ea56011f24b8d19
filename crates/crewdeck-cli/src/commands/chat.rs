use anyhow::Result;
use clap::Subcommand;
use crewdeck_application::CrewdeckApp;
use crewdeck_core::chat::MessageType;
use serde_json::json;
use std::time::Duration;

use super::utils::{local_time, parse_choice, print_json, truncate};

#[derive(Subcommand)]
pub enum ChatAction {
    /// List rooms with unread counts
    Rooms,
    /// Show a room's messages and mark it read
    Open {
        room_id: String,
        /// Only the last N messages
        #[arg(long, default_value_t = 20)]
        last: usize,
    },
    /// Send a message as the signed-in user
    Send {
        room_id: String,
        content: String,
        /// text, image or file
        #[arg(long = "type", default_value = "text")]
        message_type: String,
    },
    /// Mark a room read without opening it
    Read { room_id: String },
    /// Show a typing indicator and wait for it to expire
    Type {
        room_id: String,
        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = 10)]
        wait: u64,
    },
}

pub async fn run(app: &CrewdeckApp, action: ChatAction, json: bool) -> Result<()> {
    let chat = &app.chat;
    match action {
        ChatAction::Rooms => {
            let rooms = chat.rooms();
            if json {
                return print_json(&rooms);
            }
            for room in &rooms {
                let preview = room
                    .last_message
                    .as_ref()
                    .map(|m| format!("{}: {}", m.sender_name, truncate(&m.content, 40)))
                    .unwrap_or_default();
                println!("{:<10} {:<24} {:>3} unread  {}", room.id, room.name, room.unread_count, preview);
            }
            println!("{} unread in total", chat.unread_total());
        }
        ChatAction::Open { room_id, last } => {
            chat.set_active_room(Some(&room_id)).await?;
            let messages = chat.room_messages(&room_id);
            let skip = messages.len().saturating_sub(last);
            if json {
                return print_json(&messages[skip..]);
            }
            for message in &messages[skip..] {
                println!("{} {}: {}", local_time(&message.timestamp), message.sender_name, message.content);
            }
        }
        ChatAction::Send {
            room_id,
            content,
            message_type,
        } => {
            let message_type: MessageType = parse_choice("message type", &message_type)?;
            let message = chat.send_message(&room_id, &content, message_type).await?;
            if json {
                return print_json(&message);
            }
            println!("Sent {}", message.id);
        }
        ChatAction::Read { room_id } => {
            chat.mark_read(&room_id).await?;
            println!("Marked {} read", room_id);
        }
        ChatAction::Type { room_id, wait } => {
            chat.start_typing(&room_id)?;
            let sweeper = chat.start_sweeper();
            if !json {
                let names: Vec<String> = chat
                    .typing_users(&room_id)
                    .into_iter()
                    .map(|t| t.user_name)
                    .collect();
                println!("Typing in {}: {}", room_id, names.join(", "));
            }

            let expired = tokio::time::timeout(Duration::from_secs(wait), chat.typing_cleared(&room_id))
                .await
                .is_ok();
            sweeper.shutdown().await;
            if !expired {
                chat.stop_typing(&room_id)?;
            }

            if json {
                return print_json(&json!({ "roomId": room_id, "expired": expired }));
            }
            if expired {
                println!("Typing indicator expired");
            } else {
                println!("Stopped typing after {}s", wait);
            }
        }
    }
    Ok(())
}
