//! Data Transfer Objects
//!
//! - `websocket`: WebSocket で送受信するフレーム（ワイヤーコーデック）
//! - `document`: メッセージストアに保存するチャットドキュメント

pub mod document;
pub mod websocket;

mod conversion;
