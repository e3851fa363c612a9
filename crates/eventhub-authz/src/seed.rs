use crate::{
    MAX_BATCH_SIZE, PermissionRecord, PermissionStore, PermissionStoreResult, rules,
};
use serde::Serialize;

/// Result of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub records: usize,
    pub batches: usize,
}

/// Every allowed permission record generated from the rule table.
pub fn default_permissions() -> Vec<PermissionRecord> {
    rules::rules()
        .into_iter()
        .map(|rule| {
            PermissionRecord::allowed(
                rule.resource.as_str(),
                rule.action.as_str(),
                rule.role,
                rule.conditions,
            )
        })
        .collect()
}

/// Writes [`default_permissions`] to `store`.
///
/// Safe to re-run: records are upserted on their key with identical content.
pub async fn seed_permissions(store: &dyn PermissionStore) -> PermissionStoreResult<SeedReport> {
    write_batched(store, &default_permissions()).await
}

/// Writes `records` sequentially in batches no larger than the store allows.
///
/// A failure stops the run and is returned; earlier batches stay written.
pub async fn write_batched(
    store: &dyn PermissionStore,
    records: &[PermissionRecord],
) -> PermissionStoreResult<SeedReport> {
    let batch_size = store.max_batch_size().clamp(1, MAX_BATCH_SIZE);
    let mut batches = 0;
    for chunk in records.chunks(batch_size) {
        store.batch_put(chunk).await?;
        batches += 1;
        tracing::debug!(
            batch = batches,
            size = chunk.len(),
            backend = store.backend_name(),
            "permission batch written"
        );
    }
    tracing::info!(
        records = records.len(),
        batches,
        backend = store.backend_name(),
        "permissions seeded"
    );
    Ok(SeedReport {
        records: records.len(),
        batches,
    })
}
