// src/storage/result_store.rs
//! Verification result storage.
//!
//! The verification engine never persists anything itself; the HTTP layer
//! hands each finished verification to a [`VerificationResultStore`]. This
//! module ships an in-memory implementation that keeps records per principal.

use crate::models::record::{NewVerificationRecord, VerificationRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store lock poisoned")]
    Poisoned,
}

/// Persistence collaborator for verification results.
pub trait VerificationResultStore: Send + Sync {
    /// Persists a record and returns it with its assigned id.
    fn store(&self, record: NewVerificationRecord) -> Result<VerificationRecord, StoreError>;

    /// Returns every record for `principal_id`, newest first.
    fn list_for_principal(&self, principal_id: &str) -> Result<Vec<VerificationRecord>, StoreError>;
}

/// Record storage without locking, for single-threaded use.
///
/// - O(1) average insert
/// - Records grouped by principal, in insertion order
#[derive(Debug)]
pub struct ResultStorage {
    records: HashMap<String, Vec<VerificationRecord>>,
    next_id: u64,
}

impl ResultStorage {
    pub fn new() -> Self {
        ResultStorage {
            records: HashMap::new(),
            next_id: 1,
        }
    }

    /// Stores a record, assigning the next sequential id.
    pub fn insert(&mut self, record: NewVerificationRecord) -> VerificationRecord {
        let stored = VerificationRecord::from_new(self.next_id, record);
        self.next_id += 1;
        self.records
            .entry(stored.principal_id.clone())
            .or_default()
            .push(stored.clone());
        stored
    }

    /// Records for a principal, newest first.
    pub fn for_principal(&self, principal_id: &str) -> Vec<VerificationRecord> {
        self.records
            .get(principal_id)
            .map(|records| records.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of stored records across all principals.
    pub fn count_records(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

impl Default for ResultStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe in-memory result store.
///
/// # Note
/// Records live only as long as the process.
#[derive(Clone, Default)]
pub struct InMemoryResultStore {
    storage: Arc<Mutex<ResultStorage>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        InMemoryResultStore {
            storage: Arc::new(Mutex::new(ResultStorage::new())),
        }
    }

    pub fn count_records(&self) -> Result<usize, StoreError> {
        let storage = self.storage.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(storage.count_records())
    }
}

impl VerificationResultStore for InMemoryResultStore {
    fn store(&self, record: NewVerificationRecord) -> Result<VerificationRecord, StoreError> {
        let mut storage = self.storage.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(storage.insert(record))
    }

    fn list_for_principal(&self, principal_id: &str) -> Result<Vec<VerificationRecord>, StoreError> {
        let storage = self.storage.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(storage.for_principal(principal_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::VerificationOutcome;

    fn record(principal: &str, outcome: VerificationOutcome) -> NewVerificationRecord {
        NewVerificationRecord::json(principal, outcome, Some("Example University".into()))
    }

    #[test]
    fn test_ids_are_sequential() {
        let store = InMemoryResultStore::new();
        let first = store.store(record("user-1", VerificationOutcome::Verified)).unwrap();
        let second = store.store(record("user-2", VerificationOutcome::InvalidIssuer)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.document_type, "json");
        assert_eq!(store.count_records().unwrap(), 2);
    }

    #[test]
    fn test_list_is_per_principal_newest_first() {
        let store = InMemoryResultStore::new();
        store.store(record("user-1", VerificationOutcome::Verified)).unwrap();
        store.store(record("user-2", VerificationOutcome::InvalidRecipient)).unwrap();
        store.store(record("user-1", VerificationOutcome::InvalidSignature)).unwrap();

        let listed = store.list_for_principal("user-1").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].outcome, VerificationOutcome::InvalidSignature);
        assert_eq!(listed[1].outcome, VerificationOutcome::Verified);
        assert!(listed.iter().all(|r| r.principal_id == "user-1"));
    }

    #[test]
    fn test_unknown_principal_is_empty() {
        let store = InMemoryResultStore::new();
        assert!(store.list_for_principal("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let store = InMemoryResultStore::new();
        let clone = store.clone();
        clone.store(record("user-1", VerificationOutcome::Verified)).unwrap();
        assert_eq!(store.count_records().unwrap(), 1);
    }
}
