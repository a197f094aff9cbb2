//! UseCase 層
//!
//! チャットリレーのアプリケーションロジック（参加、退出、イベントのブロードキャスト、
//! ヘルスチェック）を提供します。

mod broadcast_event;
mod check_health;
mod error;
mod join_room;
mod leave_room;
mod retry;
mod sequencer;

pub use broadcast_event::BroadcastEventUseCase;
pub use check_health::CheckHealthUseCase;
pub use error::{BroadcastError, JoinError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use retry::RetryPolicy;
pub use sequencer::RoomSequencer;
