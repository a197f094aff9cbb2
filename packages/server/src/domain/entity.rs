//! エンティティ
//!
//! ルームに保存されるチャットメッセージと、そのリアクション集合を定義します。

use std::collections::BTreeMap;

use super::value_object::{Sender, Timestamp};

/// 絵文字ごとのリアクションしたユーザー集合
///
/// ## 不変条件
///
/// - 同じユーザーが同じ絵文字で二度リアクションしても重複しない
/// - ユーザー 0 人の絵文字キーは存在しない（削除操作はなく、集合は増える一方）
///
/// 絵文字キーはソート順、ユーザーは最初にリアクションした順に保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reactions(BTreeMap<String, Vec<Sender>>);

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// リアクションを追加
    ///
    /// # Returns
    ///
    /// 新たに追加された場合は `true`、既にリアクション済みなら `false`
    pub fn add(&mut self, emoji: &str, user: Sender) -> bool {
        let users = self.0.entry(emoji.to_string()).or_default();
        if users.contains(&user) {
            return false;
        }
        users.push(user);
        true
    }

    /// 指定した絵文字にリアクションしたユーザー一覧
    pub fn users(&self, emoji: &str) -> &[Sender] {
        self.0.get(emoji).map(Vec::as_slice).unwrap_or(&[])
    }

    /// (絵文字, ユーザー) の組を列挙
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Sender)> {
        self.0
            .iter()
            .flat_map(|(emoji, users)| users.iter().map(move |user| (emoji.as_str(), user)))
    }

    /// 絵文字ごとのユーザー一覧を列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Sender])> {
        self.0
            .iter()
            .map(|(emoji, users)| (emoji.as_str(), users.as_slice()))
    }
}

/// チャットメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// ルーム内の到着順の連番（1 始まり、保存時にストアが採番）
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    /// 保存時刻（サーバーの時計）
    pub timestamp: Timestamp,
    pub reactions: Reactions,
}

impl ChatMessage {
    /// 未保存のメッセージを作成（`id` はストアが採番する）
    pub fn new(sender: Sender, content: String, timestamp: Timestamp) -> Self {
        Self {
            id: 0,
            sender,
            content,
            timestamp,
            reactions: Reactions::new(),
        }
    }

    /// リアクション対象を指すキー（`"{sender}-{content}"`）
    ///
    /// 同じ送信者の同じ内容のメッセージは区別できない。
    pub fn message_key(&self) -> String {
        format!("{}-{}", self.sender.as_str(), self.content)
    }

    /// リアクションを追加（同じユーザー・絵文字の二重登録は無視）
    pub fn add_reaction(&mut self, emoji: &str, user: Sender) -> bool {
        self.reactions.add(emoji, user)
    }
}

/// メッセージキーに一致する最初のメッセージの位置を探す
pub fn find_message_index(messages: &[ChatMessage], message_key: &str) -> Option<usize> {
    messages
        .iter()
        .position(|message| message.message_key() == message_key)
}
