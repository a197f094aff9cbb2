//! WebSocket フレームの DTO とコーデック
//!
//! ## 受信フレーム
//!
//! ```json
//! {"sender": "alice", "content": "hi", "type": "message"}
//! {"sender": "bob", "type": "reaction", "messageId": "alice-hi", "emoji": "👍"}
//! ```
//!
//! JSON として解釈できないフレームはエラーにせず、送信者 `"anonymous"` の
//! 生テキストのチャットメッセージとして扱う。
//!
//! ## 送信フレーム
//!
//! - チャット: `{"sender", "content", "type": "message"}`
//! - リアクション: `{"type": "reaction", "messageId", "emoji", "sender"}`

use serde::{Deserialize, Serialize};

use crate::domain::{ChatEvent, ChatMessage, ReactionEvent, Sender};

/// フレーム種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Message,
    Reaction,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Reaction => "reaction",
        }
    }
}

/// クライアントから届くフレーム
///
/// すべてのフィールドは省略可能。`type` は自由な文字列として受け取り、
/// `"reaction"` 以外はチャットメッセージとして扱う。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundFrame {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl InboundFrame {
    /// 種別を解決してドメインイベントに変換
    ///
    /// `type == "reaction"` かつ `messageId` と `emoji` が空でない場合のみリアクション。
    /// それ以外（リアクション指定でもフィールドが欠けている場合を含む）はチャットメッセージ。
    pub fn into_event(self) -> ChatEvent {
        let sender = Sender::from(self.sender);
        let is_reaction = self.r#type.as_deref() == Some(MessageType::Reaction.as_str());

        match (self.message_id, self.emoji) {
            (Some(message_key), Some(emoji))
                if is_reaction && !message_key.is_empty() && !emoji.is_empty() =>
            {
                ChatEvent::Reaction(ReactionEvent {
                    sender,
                    message_key,
                    emoji,
                })
            }
            _ => ChatEvent::Message {
                sender,
                content: self.content.unwrap_or_default(),
            },
        }
    }
}

/// 受信フレームをデコード
///
/// 構造化デコードに失敗した場合は生テキストを内容とするチャットメッセージになる。
pub fn decode_inbound(raw: &str) -> ChatEvent {
    match serde_json::from_str::<InboundFrame>(raw) {
        Ok(frame) => frame.into_event(),
        Err(e) => {
            tracing::debug!("Inbound frame is not a JSON object ({}), using raw text", e);
            ChatEvent::Message {
                sender: Sender::anonymous(),
                content: raw.to_string(),
            }
        }
    }
}

/// チャットメッセージの送信フレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageFrame {
    pub sender: String,
    pub content: String,
    pub r#type: MessageType,
}

/// リアクションの送信フレーム（`sender` はリアクションしたユーザー）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionFrame {
    pub r#type: MessageType,
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub emoji: String,
    pub sender: String,
}

/// サーバーからクライアントへ送るフレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    Reaction(ReactionFrame),
    Chat(ChatMessageFrame),
}

impl OutboundFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 履歴再生用のフレーム列を生成
///
/// メッセージごとにチャットフレーム 1 件と、(絵文字, ユーザー) の組ごとに
/// リアクションフレーム 1 件を続ける。
pub fn history_frames(messages: &[ChatMessage]) -> Vec<OutboundFrame> {
    let mut frames = Vec::with_capacity(messages.len());
    for message in messages {
        frames.push(OutboundFrame::Chat(ChatMessageFrame::from(message)));

        let message_key = message.message_key();
        frames.extend(message.reactions.pairs().map(|(emoji, user)| {
            OutboundFrame::Reaction(ReactionFrame {
                r#type: MessageType::Reaction,
                message_id: message_key.clone(),
                emoji: emoji.to_string(),
                sender: user.as_str().to_string(),
            })
        }));
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ANONYMOUS_SENDER, Timestamp};

    #[test]
    fn test_decode_chat_message() {
        // テスト項目: 通常の JSON フレームがチャットメッセージとしてデコードされる
        // given (前提条件):
        let raw = r#"{"sender":"alice","content":"hi"}"#;

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert_eq!(
            event,
            ChatEvent::Message {
                sender: Sender::new("alice".to_string()),
                content: "hi".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_non_json_falls_back_to_raw_text() {
        // テスト項目: JSON でないフレームは anonymous の生テキストメッセージになる
        // given (前提条件):
        let raw = "hello";

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert_eq!(
            event,
            ChatEvent::Message {
                sender: Sender::anonymous(),
                content: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_json_that_is_not_an_object_falls_back() {
        // テスト項目: オブジェクトでない JSON も生テキストとして扱われる
        // given (前提条件):
        let raw = "[1,2,3]";

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert_eq!(
            event,
            ChatEvent::Message {
                sender: Sender::anonymous(),
                content: "[1,2,3]".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_defaults_missing_sender() {
        // テスト項目: sender が省略された場合は "anonymous" になる
        // given (前提条件):
        let raw = r#"{"content":"who am i"}"#;

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        match event {
            ChatEvent::Message { sender, content } => {
                assert_eq!(sender.as_str(), ANONYMOUS_SENDER);
                assert_eq!(content, "who am i");
            }
            other => panic!("expected chat message, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_reaction() {
        // テスト項目: 必要なフィールドが揃ったリアクションがデコードされる
        // given (前提条件):
        let raw = r#"{"sender":"bob","type":"reaction","messageId":"alice-hi","emoji":"👍"}"#;

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert_eq!(
            event,
            ChatEvent::Reaction(ReactionEvent {
                sender: Sender::new("bob".to_string()),
                message_key: "alice-hi".to_string(),
                emoji: "👍".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_reaction_without_emoji_falls_through_to_message() {
        // テスト項目: emoji が欠けたリアクションはチャットメッセージとして扱われる
        // given (前提条件):
        let raw = r#"{"sender":"bob","type":"reaction","messageId":"alice-hi","content":"oops"}"#;

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert_eq!(
            event,
            ChatEvent::Message {
                sender: Sender::new("bob".to_string()),
                content: "oops".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_reaction_with_empty_message_id_falls_through_to_message() {
        // テスト項目: messageId が空のリアクションはチャットメッセージとして扱われる
        // given (前提条件):
        let raw = r#"{"sender":"bob","type":"reaction","messageId":"","emoji":"👍"}"#;

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert!(matches!(event, ChatEvent::Message { .. }));
    }

    #[test]
    fn test_decode_reaction_fields_without_reaction_type_is_message() {
        // テスト項目: type が "reaction" でなければ messageId/emoji があってもメッセージ
        // given (前提条件):
        let raw = r#"{"sender":"bob","content":"x","messageId":"alice-hi","emoji":"👍"}"#;

        // when (操作):
        let event = decode_inbound(raw);

        // then (期待する結果):
        assert!(matches!(event, ChatEvent::Message { .. }));
    }

    #[test]
    fn test_encode_chat_frame_always_carries_type() {
        // テスト項目: チャットフレームは常に type: "message" を含む
        // given (前提条件):
        let frame = OutboundFrame::Chat(ChatMessageFrame {
            sender: "alice".to_string(),
            content: "hi".to_string(),
            r#type: MessageType::Message,
        });

        // when (操作):
        let json = frame.to_json().unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"sender":"alice","content":"hi","type":"message"}"#);
    }

    #[test]
    fn test_encode_reaction_frame() {
        // テスト項目: リアクションフレームが messageId を camelCase で出力する
        // given (前提条件):
        let frame = OutboundFrame::Reaction(ReactionFrame {
            r#type: MessageType::Reaction,
            message_id: "alice-hi".to_string(),
            emoji: "👍".to_string(),
            sender: "bob".to_string(),
        });

        // when (操作):
        let json = frame.to_json().unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"reaction","messageId":"alice-hi","emoji":"👍","sender":"bob"}"#
        );
    }

    #[test]
    fn test_history_frames_emit_one_reaction_frame_per_pair() {
        // テスト項目: 履歴はメッセージの後に (絵文字, ユーザー) ごとのリアクションが続く
        // given (前提条件):
        let mut first = ChatMessage::new(
            Sender::new("alice".to_string()),
            "hi".to_string(),
            Timestamp::new(1),
        );
        first.add_reaction("👍", Sender::new("bob".to_string()));
        first.add_reaction("👍", Sender::new("carol".to_string()));
        let second = ChatMessage::new(
            Sender::new("bob".to_string()),
            "yo".to_string(),
            Timestamp::new(2),
        );

        // when (操作):
        let frames = history_frames(&[first, second]);

        // then (期待する結果):
        assert_eq!(frames.len(), 4);
        assert!(matches!(&frames[0], OutboundFrame::Chat(f) if f.content == "hi"));
        assert!(matches!(
            &frames[1],
            OutboundFrame::Reaction(f) if f.message_id == "alice-hi" && f.sender == "bob"
        ));
        assert!(matches!(
            &frames[2],
            OutboundFrame::Reaction(f) if f.message_id == "alice-hi" && f.sender == "carol"
        ));
        assert!(matches!(&frames[3], OutboundFrame::Chat(f) if f.sender == "bob"));
    }
}
