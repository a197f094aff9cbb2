//! Room-scoped WebSocket chat relay server.
//!
//! Clients join a room with `/chat?chat_id=<room>`, receive its history, and
//! every message or reaction they send is stored and relayed to the room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --store sqlite
//! ```

use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use hiroba_server::{
    domain::MessageRepository,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageRepository, SqliteMessageRepository},
    },
    ui::Server,
    usecase::{
        BroadcastEventUseCase, CheckHealthUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        RetryPolicy, RoomSequencer,
    },
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

/// Backend used for the message store
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Keep history in process memory (lost on restart)
    Memory,
    /// Keep history in a SQLite database file
    Sqlite,
}

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room-scoped WebSocket chat relay with history replay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// Message store backend
    #[arg(long, env = "HIROBA_STORE", value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    /// Path of the SQLite database (used with `--store sqlite`)
    #[arg(long, env = "HIROBA_DATABASE_PATH", default_value = "./hiroba.db")]
    database_path: String,

    /// Attempts per message store write before giving up on transient failures
    #[arg(long, env = "HIROBA_PERSIST_ATTEMPTS", default_value = "3")]
    persist_attempts: u32,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn open_repository(args: &Args) -> Result<Arc<dyn MessageRepository>, Box<dyn std::error::Error>> {
    match args.store {
        StoreKind::Memory => {
            tracing::info!("Using in-memory message store");
            Ok(Arc::new(InMemoryMessageRepository::new()))
        }
        StoreKind::Sqlite => Ok(Arc::new(SqliteMessageRepository::open(
            &args.database_path,
        )?)),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Open the message store and make sure it answers
    let repository = match open_repository(&args) {
        Ok(repository) => repository,
        Err(e) => {
            tracing::error!("Failed to open message store: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = repository.ping().await {
        tracing::error!("Message store is not reachable: {}", e);
        std::process::exit(1);
    }

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let sequencer = Arc::new(RoomSequencer::new());

    // 3. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        sequencer.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(message_pusher.clone()));
    let broadcast_event_usecase = Arc::new(
        BroadcastEventUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            sequencer,
            Arc::new(SystemClock),
        )
        .with_retry_policy(RetryPolicy::new(
            args.persist_attempts,
            Duration::from_millis(100),
        )),
    );
    let check_health_usecase = Arc::new(CheckHealthUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        join_room_usecase,
        leave_room_usecase,
        broadcast_event_usecase,
        check_health_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
