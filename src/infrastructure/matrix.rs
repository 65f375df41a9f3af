//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the
//! `matrix_sdk`. This module is the bridge between the generic `ChatProvider`
//! interface used by the bot's core logic and the specifics of the Matrix SDK,
//! and it supplies the user-directory snapshot from room membership.

use async_trait::async_trait;
use matrix_sdk::RoomMemberships;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;

use crate::application::directory::{DirectoryUser, UserDirectory};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Attachment;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }
}

/// Snapshot the room's joined members as the session's user directory.
pub async fn snapshot_directory(room: &Room) -> UserDirectory {
    match room.members(RoomMemberships::JOIN).await {
        Ok(members) => UserDirectory::new(
            members
                .iter()
                .map(|m| DirectoryUser {
                    id: m.user_id().to_string(),
                    name: m.name().to_string(),
                })
                .collect(),
        ),
        Err(e) => {
            tracing::warn!("failed to fetch room members: {e}");
            UserDirectory::default()
        }
    }
}

/// Webhook bridges flatten rich attachments into the plain message body.
/// On the integration channel, reconstruct `{pretext, text}` from the first
/// line and the remainder.
pub fn bridge_attachment(body: &str) -> Attachment {
    let (pretext, text) = body.split_once('\n').unwrap_or((body, ""));
    Attachment {
        pretext: Some(pretext.to_string()),
        text: Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_attachment_splits_on_first_line() {
        let att = bridge_attachment("New comment by octocat on #7\nShip it :+1:\nthanks");
        assert_eq!(att.pretext.as_deref(), Some("New comment by octocat on #7"));
        assert_eq!(att.text.as_deref(), Some("Ship it :+1:\nthanks"));
    }

    #[test]
    fn single_line_body_becomes_pretext_only() {
        let att = bridge_attachment("New comment by octocat");
        assert_eq!(att.pretext.as_deref(), Some("New comment by octocat"));
        assert_eq!(att.text.as_deref(), Some(""));
    }
}
