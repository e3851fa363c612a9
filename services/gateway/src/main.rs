//! EventHub gateway HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, the permission store, the Cognito resolver, and HTTP
//! routers, then starts the main API server and (optionally) the bootstrap
//! server.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
use anyhow::Context;
use eventhub_authz::{PermissionEvaluator, PermissionStore, seed_permissions};
use gateway::app::{AppState, build_bootstrap_router, build_router};
use gateway::auth::{Authenticator, CognitoTokenResolver, ResolverSettings};
use gateway::config::{GatewayConfig, PermissionsBackend};
use gateway::observability;
use gateway::store::memory::InMemoryPermissionStore;
use gateway::store::postgres::PostgresPermissionStore;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env_or_yaml().context("gateway config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: GatewayConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("eventhub-gateway")?;
    let state = build_state(config.clone()).await?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());

    let bootstrap_task = if config.bootstrap.enabled {
        let bootstrap_addr = config.bootstrap.bind_addr;
        let bootstrap_app = build_bootstrap_router(state.clone());
        Some(tokio::spawn(async move {
            tracing::info!(%bootstrap_addr, "bootstrap listener starting");
            match tokio::net::TcpListener::bind(bootstrap_addr).await {
                Ok(listener) => {
                    let _ = axum::serve(listener, bootstrap_app.into_make_service()).await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to bind bootstrap listener");
                }
            }
        }))
    } else {
        None
    };

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        permissions_backend = state
            .permission_store
            .as_ref()
            .map(|store| store.backend_name())
            .unwrap_or("fallback"),
        "gateway listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    if let Some(task) = &bootstrap_task {
        task.abort();
    }
    let _ = metrics_task.await;
    if let Some(task) = bootstrap_task {
        let _ = task.await;
    }
    Ok(())
}

async fn build_state(config: GatewayConfig) -> anyhow::Result<AppState> {
    let store: Option<Arc<dyn PermissionStore>> = match config.permissions_store {
        PermissionsBackend::None => None,
        PermissionsBackend::Memory => Some(Arc::new(InMemoryPermissionStore::new())),
        PermissionsBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Some(Arc::new(
                PostgresPermissionStore::connect(pg)
                    .await
                    .context("connect permission store")?,
            ))
        }
    };

    if config.seed_on_startup
        && let Some(store) = &store
    {
        let report = seed_permissions(store.as_ref())
            .await
            .context("seed permissions on startup")?;
        observability::record_permissions_seeded(report.records);
        tracing::info!(
            records = report.records,
            batches = report.batches,
            backend = store.backend_name(),
            "permissions seeded on startup"
        );
    }

    let evaluator = match &store {
        Some(store) => PermissionEvaluator::with_store(store.clone()),
        None => PermissionEvaluator::fallback(),
    };
    let resolver = CognitoTokenResolver::new(ResolverSettings::from(&config.cognito));
    let authenticator = Authenticator::new(Arc::new(resolver), evaluator);

    Ok(AppState {
        authenticator,
        permission_store: store,
        bootstrap_enabled: config.bootstrap.enabled,
        bootstrap_token: config.bootstrap.token,
    })
}
