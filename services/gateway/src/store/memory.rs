//! In-memory permission store.
//!
//! # Purpose
//! Holds permission records in a `HashMap` guarded by `tokio::sync::RwLock`.
//! Used for local development, tests, and deployments that seed on startup
//! and do not need records to survive a restart.
//!
//! # Durability and consistency
//! - **Not durable**: all records are lost on process restart.
//! - Each `batch_put` is applied under one write lock, so readers never see a
//!   partially written batch.
//! - Multiple gateway instances each hold independent state.
use async_trait::async_trait;
use eventhub_authz::{
    MAX_BATCH_SIZE, PermissionKey, PermissionRecord, PermissionStore, PermissionStoreError,
    PermissionStoreResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records keyed by `(pk, sk)`, matching the durable layout.
#[derive(Debug, Clone)]
pub struct InMemoryPermissionStore {
    records: Arc<RwLock<HashMap<(String, String), PermissionRecord>>>,
    max_batch_size: usize,
}

impl Default for InMemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::with_max_batch_size(MAX_BATCH_SIZE)
    }

    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            max_batch_size,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All records sorted by key.
    pub async fn records(&self) -> Vec<PermissionRecord> {
        let records = self.records.read().await;
        let mut keyed: Vec<_> = records.iter().collect();
        keyed.sort_by(|(left, _), (right, _)| left.cmp(right));
        keyed.into_iter().map(|(_, record)| record.clone()).collect()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn get_permission(
        &self,
        key: &PermissionKey,
    ) -> PermissionStoreResult<Option<PermissionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(key.pk(), key.sk())).cloned())
    }

    async fn batch_put(&self, records: &[PermissionRecord]) -> PermissionStoreResult<()> {
        if records.len() > self.max_batch_size {
            return Err(PermissionStoreError::BatchTooLarge {
                size: records.len(),
                limit: self.max_batch_size,
            });
        }
        let mut map = self.records.write().await;
        for record in records {
            let key = record.key();
            map.insert((key.pk(), key.sk()), record.clone());
        }
        Ok(())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn health_check(&self) -> PermissionStoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
