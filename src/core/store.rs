//! Loan persistence.
//!
//! Loans live in a local-storage-shaped key-value store: each loan type has a
//! named key holding a JSON array of `LoanRecord`s. Readers treat a missing
//! key or an unparseable document as an empty collection. Writers replace the
//! whole array, so the last writer wins.

use crate::{
    core::loan::{LoanRecord, LoanType},
    entities::{StorageEntry, storage_entry},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, PoisonError},
};
use tracing::{debug, info, warn};

/// A local-storage-shaped capability: named string slots.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get_item(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Replaces the value stored under `key`.
    fn set_item(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// In-process key-value store.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Key-value store backed by the `storage_entries` table.
#[derive(Debug, Clone)]
pub struct DatabaseKeyValueStore {
    db: DatabaseConnection,
}

impl DatabaseKeyValueStore {
    /// Wraps a connection whose tables already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl KeyValueStore for DatabaseKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entry = StorageEntry::find()
            .filter(storage_entry::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(entry.map(|e| e.value))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let now = Utc::now().naive_utc();
        let existing = StorageEntry::find()
            .filter(storage_entry::Column::Key.eq(key))
            .one(&self.db)
            .await?;

        if let Some(entry) = existing {
            let mut active_model: storage_entry::ActiveModel = entry.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_entry = storage_entry::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            new_entry.insert(&self.db).await?;
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        StorageEntry::delete_many()
            .filter(storage_entry::Column::Key.eq(key))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

/// Loads and saves one loan collection.
pub trait LoanStore {
    /// Reads the whole collection; missing or malformed data reads as empty.
    fn load(&self) -> impl Future<Output = Result<Vec<LoanRecord>>> + Send;

    /// Reads the collection ahead of a rewrite. Missing data reads as empty,
    /// malformed data is an error so the rewrite cannot drop it.
    fn load_for_update(&self) -> impl Future<Output = Result<Vec<LoanRecord>>> + Send;

    /// Overwrites the whole collection.
    fn save(&self, loans: &[LoanRecord]) -> impl Future<Output = Result<()>> + Send;
}

/// A `LoanStore` over one key of a `KeyValueStore`.
#[derive(Debug)]
pub struct KeyedLoanStore<'a, S> {
    backend: &'a S,
    key: String,
}

impl<'a, S: KeyValueStore> KeyedLoanStore<'a, S> {
    /// Store for an arbitrary key.
    pub fn new(backend: &'a S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Store for the key a loan type is persisted under.
    pub fn for_type(backend: &'a S, loan_type: LoanType) -> Self {
        Self::new(backend, loan_type.storage_key())
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<S: KeyValueStore> LoanStore for KeyedLoanStore<'_, S> {
    async fn load(&self) -> Result<Vec<LoanRecord>> {
        let raw = self.backend.get_item(&self.key).await?;
        Ok(decode_loans(&self.key, raw.as_deref()))
    }

    async fn load_for_update(&self) -> Result<Vec<LoanRecord>> {
        let raw = self.backend.get_item(&self.key).await?;
        decode_loans_strict(&self.key, raw.as_deref())
    }

    async fn save(&self, loans: &[LoanRecord]) -> Result<()> {
        ensure_encodable(loans)?;
        let encoded = serde_json::to_string(loans)?;
        self.backend.set_item(&self.key, encoded).await?;
        debug!("Saved {} loans under `{}`", loans.len(), self.key);
        Ok(())
    }
}

/// Decodes a stored loan array, treating absent or malformed data as empty.
#[must_use]
pub fn decode_loans(key: &str, raw: Option<&str>) -> Vec<LoanRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(loans) => loans,
        Err(e) => {
            warn!("Ignoring malformed loan data under `{key}`: {e}");
            Vec::new()
        }
    }
}

/// Like `decode_loans`, but unreadable data is `Error::CorruptStore`.
pub fn decode_loans_strict(key: &str, raw: Option<&str>) -> Result<Vec<LoanRecord>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw).map_err(|e| Error::CorruptStore {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Rejects numbers JSON cannot represent; `serde_json` writes them as `null`.
fn ensure_encodable(loans: &[LoanRecord]) -> Result<()> {
    for loan in loans {
        for (field, value) in [("amount", loan.amount), ("interestRate", loan.interest_rate)] {
            if !value.is_finite() {
                return Err(Error::NonFiniteField {
                    id: loan.id.clone(),
                    field,
                });
            }
        }
    }
    Ok(())
}

/// Appends one loan to a store. Fails without writing if the stored
/// collection is unreadable.
pub async fn append_loan<L: LoanStore>(store: &L, loan: LoanRecord) -> Result<()> {
    let mut loans = store.load_for_update().await?;
    loans.push(loan);
    store.save(&loans).await
}

/// Loads every loan type's collection, in `LoanType::ALL` order.
pub async fn load_all_loans<S: KeyValueStore>(backend: &S) -> Result<Vec<LoanRecord>> {
    let mut all = Vec::new();
    for loan_type in LoanType::ALL {
        let loans = KeyedLoanStore::for_type(backend, loan_type).load().await?;
        all.extend(loans);
    }
    Ok(all)
}

/// Writes `seeds` under their type keys for every key that does not exist
/// yet. Returns the number of loans written.
pub async fn seed_if_missing<S: KeyValueStore>(backend: &S, seeds: &[LoanRecord]) -> Result<usize> {
    let mut written = 0;
    for loan_type in LoanType::ALL {
        let of_type: Vec<LoanRecord> = seeds
            .iter()
            .filter(|loan| loan.loan_type == loan_type)
            .cloned()
            .collect();
        if of_type.is_empty() {
            continue;
        }
        let store = KeyedLoanStore::for_type(backend, loan_type);
        if backend.get_item(store.key()).await?.is_some() {
            debug!("Key `{}` already present, not seeding", store.key());
            continue;
        }
        store.save(&of_type).await?;
        written += of_type.len();
    }
    info!("Seeded {written} loans");
    Ok(written)
}
