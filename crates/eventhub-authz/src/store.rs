use crate::{PermissionKey, PermissionRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Largest batch a permission store accepts in one write.
pub const MAX_BATCH_SIZE: usize = 25;

#[derive(Debug, Error)]
pub enum PermissionStoreError {
    #[error("permission store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed permission record: {0}")]
    Malformed(String),
    #[error("batch of {size} exceeds limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
    #[error("permission store error: {0}")]
    Unexpected(String),
}

pub type PermissionStoreResult<T> = Result<T, PermissionStoreError>;

/// Key-value backend for permission records.
///
/// Lookups are by exact key only. `batch_put` overwrites existing records with
/// the same key so seeding can be re-run safely.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn get_permission(
        &self,
        key: &PermissionKey,
    ) -> PermissionStoreResult<Option<PermissionRecord>>;

    async fn batch_put(&self, records: &[PermissionRecord]) -> PermissionStoreResult<()>;

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn health_check(&self) -> PermissionStoreResult<()>;

    fn backend_name(&self) -> &'static str;
}
