//! Message records and the storage seam.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;

/// A validated submission, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A stored contact message as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Create-only message storage.
pub trait MessageStore: Send + Sync {
    /// Persists a submission and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the record could not be written.
    fn create(&self, message: NewMessage) -> Result<ContactMessage, StoreError>;

    /// All records, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the records could not be read.
    fn list_newest_first(&self) -> Result<Vec<ContactMessage>, StoreError>;
}

/// In-process store, bounded to `capacity` records.
#[derive(Debug)]
pub struct InMemoryStore {
    records: RwLock<Vec<ContactMessage>>,
    capacity: usize,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore for InMemoryStore {
    fn create(&self, message: NewMessage) -> Result<ContactMessage, StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.len() >= self.capacity {
            return Err(StoreError::Full {
                capacity: self.capacity,
            });
        }
        let record = ContactMessage {
            id: Uuid::new_v4(),
            name: message.name,
            email: message.email,
            message: message.message,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    fn list_newest_first(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        // Insertion order breaks timestamp ties.
        let mut listed: Vec<ContactMessage> = records.iter().rev().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }
}
