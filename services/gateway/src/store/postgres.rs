//! Postgres-backed permission store.
//!
//! # Data model
//! One `permissions` row per `(pk, sk)`, where `pk` is
//! `PERMISSION#{resource}:{action}` and `sk` is `ROLE#{role}`. `conditions`
//! is stored as JSONB with unset flags omitted.
//!
//! # Consistency
//! - Lookups are single-row primary key reads. A row whose `pk`/`sk` do not
//!   agree with its `resource`, `action`, and `role` columns is malformed.
//! - A batch is one multi-row `INSERT .. ON CONFLICT (pk, sk) DO UPDATE`, so
//!   each batch is atomic and re-running it converges to the same rows.
//! - There is no atomicity across batches.
//!
//! # Operational notes
//! - Migrations run at connect time via `sqlx::migrate!("./migrations")`.
//! - Database URLs may contain credentials; they are never logged.
use crate::config::PostgresConfig;
use async_trait::async_trait;
use eventhub_authz::{
    Conditions, MAX_BATCH_SIZE, PermissionKey, PermissionRecord, PermissionStore,
    PermissionStoreError, PermissionStoreResult, Role,
};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use std::time::Duration;

/// Durable permission store backed by Postgres.
///
/// # Example
/// ```rust,no_run
/// use gateway::config::PostgresConfig;
/// use gateway::store::postgres::PostgresPermissionStore;
///
/// async fn open(pg: PostgresConfig) {
///     let _ = PostgresPermissionStore::connect(&pg).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PostgresPermissionStore {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct DbPermission {
    pk: String,
    sk: String,
    resource: String,
    action: String,
    role: String,
    allowed: bool,
    conditions: Value,
}

impl PostgresPermissionStore {
    /// Connect, then apply embedded migrations before returning.
    pub async fn connect(pg: &PostgresConfig) -> PermissionStoreResult<Self> {
        Self::connect_internal(pg, true).await
    }

    /// Connect without running migrations, for tests that manage the schema.
    #[cfg(any(test, feature = "pg-tests"))]
    pub async fn connect_without_migrations(pg: &PostgresConfig) -> PermissionStoreResult<Self> {
        Self::connect_internal(pg, false).await
    }

    async fn connect_internal(pg: &PostgresConfig, run_migrations: bool) -> PermissionStoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)
            .map_err(|err| PermissionStoreError::Unexpected(format!("invalid postgres url: {err}")))?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options)
            .await
            .map_err(store_error)?;

        if run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|err| PermissionStoreError::Unexpected(format!("migration failed: {err}")))?;
        }

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PostgresPermissionStore {
    async fn get_permission(
        &self,
        key: &PermissionKey,
    ) -> PermissionStoreResult<Option<PermissionRecord>> {
        let row = sqlx::query_as::<_, DbPermission>(
            "SELECT pk, sk, resource, action, role, allowed, conditions FROM permissions WHERE pk = $1 AND sk = $2",
        )
        .bind(key.pk())
        .bind(key.sk())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        row.map(permission_from_db).transpose()
    }

    async fn batch_put(&self, records: &[PermissionRecord]) -> PermissionStoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        if records.len() > MAX_BATCH_SIZE {
            return Err(PermissionStoreError::BatchTooLarge {
                size: records.len(),
                limit: MAX_BATCH_SIZE,
            });
        }

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let key = record.key();
            let conditions = serde_json::to_value(record.conditions)
                .map_err(|err| PermissionStoreError::Malformed(err.to_string()))?;
            rows.push((key.pk(), key.sk(), record, conditions));
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO permissions (pk, sk, resource, action, role, allowed, conditions) ",
        );
        builder.push_values(rows, |mut row, (pk, sk, record, conditions)| {
            row.push_bind(pk)
                .push_bind(sk)
                .push_bind(record.resource.clone())
                .push_bind(record.action.clone())
                .push_bind(record.role.as_str())
                .push_bind(record.allowed)
                .push_bind(conditions);
        });
        builder.push(
            " ON CONFLICT (pk, sk) DO UPDATE SET \
             resource = EXCLUDED.resource, \
             action = EXCLUDED.action, \
             role = EXCLUDED.role, \
             allowed = EXCLUDED.allowed, \
             conditions = EXCLUDED.conditions, \
             updated_at = now()",
        );
        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn health_check(&self) -> PermissionStoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn store_error(err: sqlx::Error) -> PermissionStoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Tls(_) => PermissionStoreError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            PermissionStoreError::Malformed(err.to_string())
        }
        other => PermissionStoreError::Unexpected(other.to_string()),
    }
}

fn permission_from_db(row: DbPermission) -> PermissionStoreResult<PermissionRecord> {
    let key = PermissionKey::parse(&row.pk, &row.sk)
        .map_err(|err| PermissionStoreError::Malformed(err.to_string()))?;
    let role = Role::from_str(&row.role)
        .map_err(|err| PermissionStoreError::Malformed(err.to_string()))?;
    if key != PermissionKey::new(row.resource.as_str(), row.action.as_str(), role) {
        return Err(PermissionStoreError::Malformed(format!(
            "row {}/{} does not match {}:{}:{}",
            row.pk, row.sk, row.resource, row.action, role
        )));
    }
    let conditions: Conditions = serde_json::from_value(row.conditions)
        .map_err(|err| PermissionStoreError::Malformed(format!("conditions: {err}")))?;
    Ok(PermissionRecord {
        resource: row.resource,
        action: row.action,
        role,
        allowed: row.allowed,
        conditions,
    })
}
