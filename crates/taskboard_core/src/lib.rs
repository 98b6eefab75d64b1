//! Core domain logic for the task board.
//! This crate is the single source of truth for board state and its
//! persisted layout.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod state;
pub mod views;

pub use config::{BoardConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{Task, TaskDraft, TaskPriority, TaskStatus};
pub use model::workspace::Workspace;
pub use repo::collections::{load, save, Collection, Record};
pub use repo::kv_repo::{
    KeyValueStore, KvWrite, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, StoreResult,
};
pub use service::board_service::{load_state, BoardService, ServiceError, ServiceResult};
pub use state::{AppState, Changes, Command, StateError, Transition};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
