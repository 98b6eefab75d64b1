//! Persistence adapter over a local key-value store.
//!
//! # Responsibility
//! - Define the key-value store contract and its SQLite/in-memory backends.
//! - Map each board collection to one JSON-encoded entry.
//!
//! # Invariants
//! - A missing entry loads as an empty collection and never fails.
//! - Saves overwrite the whole collection (last writer wins).
//! - Undecodable payloads surface as `StoreError::Decode`, never as data.

pub mod collections;
pub mod kv_repo;
