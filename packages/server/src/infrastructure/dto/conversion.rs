//! Conversion logic between DTOs and domain entities.

use std::collections::BTreeMap;

use crate::domain::{ChatEvent, ChatMessage, ReactionEvent, Reactions, Sender, Timestamp};
use crate::infrastructure::dto::{
    document::StoredMessage,
    websocket::{ChatMessageFrame, MessageType, OutboundFrame, ReactionFrame},
};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<StoredMessage> for ChatMessage {
    fn from(dto: StoredMessage) -> Self {
        // add() を通すことで重複ユーザーと空の絵文字キーを取り除く
        let mut reactions = Reactions::new();
        for (emoji, users) in dto.reactions {
            for user in users {
                reactions.add(&emoji, Sender::new(user));
            }
        }

        Self {
            id: dto.id,
            sender: Sender::new(dto.sender),
            content: dto.content,
            timestamp: Timestamp::new(dto.timestamp),
            reactions,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for StoredMessage {
    fn from(model: &ChatMessage) -> Self {
        let reactions: BTreeMap<String, Vec<String>> = model
            .reactions
            .iter()
            .map(|(emoji, users)| {
                (
                    emoji.to_string(),
                    users.iter().map(|u| u.as_str().to_string()).collect(),
                )
            })
            .collect();

        Self {
            id: model.id,
            sender: model.sender.as_str().to_string(),
            content: model.content.clone(),
            timestamp: model.timestamp.value(),
            r#type: MessageType::Message,
            reactions,
        }
    }
}

impl From<&ChatMessage> for ChatMessageFrame {
    fn from(model: &ChatMessage) -> Self {
        Self {
            sender: model.sender.as_str().to_string(),
            content: model.content.clone(),
            r#type: MessageType::Message,
        }
    }
}

impl From<&ReactionEvent> for ReactionFrame {
    fn from(event: &ReactionEvent) -> Self {
        Self {
            r#type: MessageType::Reaction,
            message_id: event.message_key.clone(),
            emoji: event.emoji.clone(),
            sender: event.sender.as_str().to_string(),
        }
    }
}

impl From<&ChatEvent> for OutboundFrame {
    fn from(event: &ChatEvent) -> Self {
        match event {
            ChatEvent::Message { sender, content } => Self::Chat(ChatMessageFrame {
                sender: sender.as_str().to_string(),
                content: content.clone(),
                r#type: MessageType::Message,
            }),
            ChatEvent::Reaction(reaction) => Self::Reaction(ReactionFrame::from(reaction)),
        }
    }
}
