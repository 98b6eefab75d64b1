//! Core use-case services.
//!
//! # Responsibility
//! - Pair the in-memory `AppState` with a key-value store.
//! - Keep callers decoupled from collection keys and JSON encoding.

pub mod board_service;
