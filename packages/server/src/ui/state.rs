//! Server state shared by every connection.

use std::sync::Arc;

use crate::usecase::{
    BroadcastEventUseCase, CheckHealthUseCase, JoinRoomUseCase, LeaveRoomUseCase,
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（ルーム参加と履歴再生のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// BroadcastEventUseCase（イベント保存とブロードキャストのユースケース）
    pub broadcast_event_usecase: Arc<BroadcastEventUseCase>,
    /// CheckHealthUseCase（ストア疎通確認のユースケース）
    pub check_health_usecase: Arc<CheckHealthUseCase>,
}
