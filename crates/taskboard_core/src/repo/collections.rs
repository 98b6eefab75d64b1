//! Typed collection load/save over a key-value store.
//!
//! # Responsibility
//! - Own the storage key of every board collection.
//! - Encode/decode whole collections as JSON arrays.
//!
//! # Invariants
//! - `load` of a never-saved collection returns an empty vector.
//! - `load` after `save(data)` returns `data` unchanged.
//! - Payload content is never logged, only keys and record counts.

use super::kv_repo::{KeyValueStore, KvWrite, StoreError, StoreResult};
use crate::model::activity::Activity;
use crate::model::automation::Automation;
use crate::model::comment::Comment;
use crate::model::filter::Filter;
use crate::model::integration::Integration;
use crate::model::label::Label;
use crate::model::notification::Notification;
use crate::model::template::Template;
use crate::model::time_entry::TimeEntry;
use crate::model::user::User;
use crate::model::workspace::Workspace;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Persisted board collections and their storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Workspaces,
    Users,
    Comments,
    Labels,
    TimeEntries,
    Activities,
    Templates,
    Integrations,
    Automations,
    Filters,
    Notifications,
    /// Single object rather than a sequence.
    CurrentUser,
}

impl Collection {
    pub const ALL: [Collection; 12] = [
        Self::Workspaces,
        Self::Users,
        Self::Comments,
        Self::Labels,
        Self::TimeEntries,
        Self::Activities,
        Self::Templates,
        Self::Integrations,
        Self::Automations,
        Self::Filters,
        Self::Notifications,
        Self::CurrentUser,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Workspaces => "taskify-workspaces",
            Self::Users => "taskify-users",
            Self::Comments => "taskify-comments",
            Self::Labels => "taskify-labels",
            Self::TimeEntries => "taskify-time-entries",
            Self::Activities => "taskify-activities",
            Self::Templates => "taskify-templates",
            Self::Integrations => "taskify-integrations",
            Self::Automations => "taskify-automations",
            Self::Filters => "taskify-filters",
            Self::Notifications => "taskify-notifications",
            Self::CurrentUser => "taskify-current-user",
        }
    }
}

/// Record type stored as one element of a collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

macro_rules! impl_record {
    ($($ty:ty => $collection:ident),+ $(,)?) => {
        $(impl Record for $ty {
            const COLLECTION: Collection = Collection::$collection;
        })+
    };
}

impl_record! {
    Workspace => Workspaces,
    User => Users,
    Comment => Comments,
    Label => Labels,
    TimeEntry => TimeEntries,
    Activity => Activities,
    Template => Templates,
    Integration => Integrations,
    Automation => Automations,
    Filter => Filters,
    Notification => Notifications,
}

/// Loads every record of `T`'s collection.
pub fn load<T: Record>(store: &impl KeyValueStore) -> StoreResult<Vec<T>> {
    let key = T::COLLECTION.key();
    let records = decode_entry::<Vec<T>>(store, key)?.unwrap_or_default();
    debug!(
        "event=store_load module=repo status=ok key={key} records={}",
        records.len()
    );
    Ok(records)
}

/// Overwrites `T`'s collection with `records`.
pub fn save<T: Record>(store: &impl KeyValueStore, records: &[T]) -> StoreResult<()> {
    store.write_batch(&[encode_records(records)?])
}

/// Encodes `records` as the pending overwrite of `T`'s collection.
pub fn encode_records<T: Record>(records: &[T]) -> StoreResult<KvWrite> {
    let key = T::COLLECTION.key();
    let value = encode_value(key, records)?;
    debug!(
        "event=store_save module=repo status=ok key={key} records={}",
        records.len()
    );
    Ok(KvWrite::Set {
        key: key.to_string(),
        value,
    })
}

/// Encodes the current-user entry; `None` removes it.
pub fn encode_current_user(user: Option<&User>) -> StoreResult<KvWrite> {
    let key = Collection::CurrentUser.key();
    Ok(match user {
        Some(user) => KvWrite::Set {
            key: key.to_string(),
            value: encode_value(key, user)?,
        },
        None => KvWrite::Remove {
            key: key.to_string(),
        },
    })
}

pub fn load_current_user(store: &impl KeyValueStore) -> StoreResult<Option<User>> {
    decode_entry(store, Collection::CurrentUser.key())
}

pub fn save_current_user(store: &impl KeyValueStore, user: &User) -> StoreResult<()> {
    store.write_batch(&[encode_current_user(Some(user))?])
}

fn decode_entry<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &'static str,
) -> StoreResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw).map(Some).map_err(|source| {
        error!(
            "event=store_load module=repo status=error key={key} error_code=decode_failed line={} column={}",
            source.line(),
            source.column()
        );
        StoreError::Decode {
            key: key.to_string(),
            source,
        }
    })
}

fn encode_value<T: Serialize + ?Sized>(key: &'static str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| {
        error!("event=store_save module=repo status=error key={key} error_code=encode_failed");
        StoreError::Encode {
            key: key.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{load, save, Collection};
    use crate::model::label::Label;
    use crate::repo::kv_repo::{KeyValueStore, MemoryKeyValueStore, StoreError};
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn storage_keys_are_unique() {
        let keys: HashSet<_> = Collection::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn missing_collection_loads_empty() {
        let store = MemoryKeyValueStore::new();
        let labels = load::<Label>(&store).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn save_overwrites_previous_collection() {
        let store = MemoryKeyValueStore::new();
        let workspace_id = Uuid::new_v4();
        save(&store, &[Label::new("bug", "#f00", workspace_id)]).unwrap();
        let replacement = vec![Label::new("feature", "#0f0", workspace_id)];
        save(&store, &replacement).unwrap();
        assert_eq!(load::<Label>(&store).unwrap(), replacement);
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let store = MemoryKeyValueStore::new();
        store.set(Collection::Labels.key(), "{not json").unwrap();
        let err = load::<Label>(&store).unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "taskify-labels"));
    }
}
