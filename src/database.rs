//! Persistent store adapter over the embedded redb database
//!
//! Three tables back the three record collections. Keys are record ids
//! (random alphanumeric strings), values are JSON-serialized records.
//! Every operation is atomic at single-record granularity only; there
//! are no cross-collection transactions. Not-found on update/delete is
//! reported as `Ok(None)` / `Ok(false)` — a [`StoreError`] always means
//! the store itself failed.

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::model::VisitorRecord;
use crate::publish::MediaHost;
use crate::staging::Staging;

/// Admin profile collection.
///
/// Key: record id, Value: JSON-serialized `AdminProfile`
pub const TABLE_ADMINS: TableDefinition<&str, &str> = TableDefinition::new("admins_v1");

/// Media record collection.
///
/// Key: record id, Value: JSON-serialized `MediaRecord`
pub const TABLE_MEDIA: TableDefinition<&str, &str> = TableDefinition::new("media_v1");

/// Visitor collection.
///
/// Key: record id, Value: JSON-serialized `VisitorRecord`
pub const TABLE_VISITORS: TableDefinition<&str, &str> = TableDefinition::new("visitors_v1");

/// Failure of the store itself, distinct from a record not being found.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database failure: {0}")]
    Backend(#[from] redb::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Application state shared across all request handlers.
///
/// Built once at startup and cloned into handlers and middleware; no
/// component reads global state behind the router's back.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe reference to the embedded database
    pub db: Arc<Database>,

    /// Process configuration read once from the environment
    pub config: Arc<Config>,

    /// Client for the external media-hosting service
    pub media_host: MediaHost,

    /// Local staging area for incoming uploads
    pub staging: Staging,
}

/// Initializes the embedded database and creates the three collections.
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_ADMINS)?;
        write_txn.open_table(TABLE_MEDIA)?;
        write_txn.open_table(TABLE_VISITORS)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Generates a random 12-character alphanumeric record id.
///
/// Also used for staged-upload filename tokens, which removes the
/// collision risk a coarse timestamp component would carry under
/// concurrent uploads.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Inserts a new record under the given id.
pub fn create<T: Serialize>(
    db: &Database,
    table: TableDefinition<&str, &str>,
    id: &str,
    record: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(record)?;

    let write_txn = db.begin_write()?;
    {
        let mut t = write_txn.open_table(table)?;
        t.insert(id, json.as_str())?;
    }
    write_txn.commit()?;

    Ok(())
}

/// Returns the first record matching `filter`, or `None`.
///
/// Records that fail to deserialize are skipped rather than failing the
/// whole scan.
pub fn find_one<T, F>(
    db: &Database,
    table: TableDefinition<&str, &str>,
    filter: F,
) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let read_txn = db.begin_read()?;
    let t = read_txn.open_table(table)?;

    for entry in t.iter()? {
        let (_, value) = entry?;
        if let Ok(record) = serde_json::from_str::<T>(value.value()) {
            if filter(&record) {
                return Ok(Some(record));
            }
        }
    }

    Ok(None)
}

/// Returns all records matching `filter`, sorted descending by
/// `sort_key` (newest first when keyed on creation time).
pub fn find_many<T, K, F, S>(
    db: &Database,
    table: TableDefinition<&str, &str>,
    filter: F,
    sort_key: S,
) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    K: Ord,
    F: Fn(&T) -> bool,
    S: Fn(&T) -> K,
{
    let read_txn = db.begin_read()?;
    let t = read_txn.open_table(table)?;

    let mut records: Vec<T> = t
        .iter()?
        .filter_map(|entry| {
            entry
                .ok()
                .and_then(|(_, value)| serde_json::from_str::<T>(value.value()).ok())
        })
        .filter(|record| filter(record))
        .collect();

    records.sort_by_key(|record| Reverse(sort_key(record)));

    Ok(records)
}

/// Applies `apply` to the record stored under `id` and persists the
/// result. Returns the updated record, or `None` when the id is absent.
pub fn update_by_id<T, F>(
    db: &Database,
    table: TableDefinition<&str, &str>,
    id: &str,
    apply: F,
) -> Result<Option<T>, StoreError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut T),
{
    let write_txn = db.begin_write()?;
    let updated = {
        let mut t = write_txn.open_table(table)?;

        // Copy out of the access guard so the table can be written below
        let existing = t.get(id)?.map(|guard| guard.value().to_string());

        match existing {
            None => None,
            Some(json) => {
                let mut record: T = serde_json::from_str(&json)?;
                apply(&mut record);

                let json = serde_json::to_string(&record)?;
                t.insert(id, json.as_str())?;
                Some(record)
            }
        }
    };
    write_txn.commit()?;

    Ok(updated)
}

/// Removes the record stored under `id`. Returns whether it existed.
pub fn delete_by_id(
    db: &Database,
    table: TableDefinition<&str, &str>,
    id: &str,
) -> Result<bool, StoreError> {
    let write_txn = db.begin_write()?;
    let removed = {
        let mut t = write_txn.open_table(table)?;
        let removed = t.remove(id)?.is_some();
        removed
    };
    write_txn.commit()?;

    Ok(removed)
}

/// Counts records matching `filter`.
pub fn count<T, F>(
    db: &Database,
    table: TableDefinition<&str, &str>,
    filter: F,
) -> Result<u64, StoreError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let read_txn = db.begin_read()?;
    let t = read_txn.open_table(table)?;

    let mut total = 0;
    for entry in t.iter()? {
        let (_, value) = entry?;
        if let Ok(record) = serde_json::from_str::<T>(value.value()) {
            if filter(&record) {
                total += 1;
            }
        }
    }

    Ok(total)
}

/// Upserts against a logical key expressed as a record predicate.
///
/// Scans for a record matching `matches`; if found, `update` is applied
/// in place under the existing storage key. Otherwise `insert` supplies
/// a fresh key and record. The whole operation runs in one write
/// transaction.
pub fn upsert_by_key<T, M, I, U>(
    db: &Database,
    table: TableDefinition<&str, &str>,
    matches: M,
    insert: I,
    update: U,
) -> Result<T, StoreError>
where
    T: Serialize + DeserializeOwned,
    M: Fn(&T) -> bool,
    I: FnOnce() -> (String, T),
    U: FnOnce(&mut T),
{
    let write_txn = db.begin_write()?;
    let result = {
        let mut t = write_txn.open_table(table)?;

        let mut found: Option<(String, T)> = None;
        for entry in t.iter()? {
            let (key, value) = entry?;
            if let Ok(record) = serde_json::from_str::<T>(value.value()) {
                if matches(&record) {
                    found = Some((key.value().to_string(), record));
                    break;
                }
            }
        }

        match found {
            Some((key, mut record)) => {
                update(&mut record);
                let json = serde_json::to_string(&record)?;
                t.insert(key.as_str(), json.as_str())?;
                record
            }
            None => {
                let (key, record) = insert();
                let json = serde_json::to_string(&record)?;
                t.insert(key.as_str(), json.as_str())?;
                record
            }
        }
    };
    write_txn.commit()?;

    Ok(result)
}

/// Idempotent per-IP visitor tracking used by the middleware path.
///
/// Repeated calls for the same IP refresh `updatedAt` without creating
/// duplicate records. Note that `POST /visitor` deliberately does NOT go
/// through this path and inserts a fresh record per call.
pub fn upsert_visitor(db: &Database, ip: &str) -> Result<VisitorRecord, StoreError> {
    let now = Utc::now();

    upsert_by_key(
        db,
        TABLE_VISITORS,
        |visitor: &VisitorRecord| visitor.ip == ip,
        || {
            let record = VisitorRecord {
                id: generate_id(),
                ip: ip.to_string(),
                created_at: now,
                updated_at: now,
            };
            (record.id.clone(), record)
        },
        |visitor| visitor.updated_at = now,
    )
}
