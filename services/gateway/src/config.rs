//! Gateway configuration.
//!
//! Values come from environment variables first. When `EVENTHUB_CONFIG` names
//! a YAML file, any field it sets overrides the environment.
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_JWKS_TTL_SECS: u64 = 600;
pub const DEFAULT_JWKS_REQUESTS_PER_MINUTE: u32 = 5;
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 60;
pub const MAX_JWKS_TTL_SECS: u64 = 86_400;
pub const MAX_CLOCK_SKEW_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub cognito: CognitoConfig,
    pub permissions_store: PermissionsBackend,
    pub postgres: Option<PostgresConfig>,
    pub seed_on_startup: bool,
    pub bootstrap: BootstrapConfig,
}

/// Identity pool settings used to validate bearer tokens.
#[derive(Debug, Clone)]
pub struct CognitoConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    /// Overrides the issuer derived from region and pool id.
    pub issuer: Option<String>,
    /// Overrides the JWKS URL derived from the issuer.
    pub jwks_url: Option<String>,
    pub jwks_ttl: Duration,
    pub jwks_requests_per_minute: u32,
    pub clock_skew_seconds: u64,
}

impl CognitoConfig {
    pub fn issuer(&self) -> String {
        self.issuer.clone().unwrap_or_else(|| {
            format!(
                "https://cognito-idp.{}.amazonaws.com/{}",
                self.region, self.user_pool_id
            )
        })
    }

    pub fn jwks_url(&self) -> String {
        self.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "{}/.well-known/jwks.json",
                self.issuer().trim_end_matches('/')
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionsBackend {
    /// No store; the built-in fallback matrix answers every check.
    None,
    Memory,
    Postgres,
}

impl std::str::FromStr for PermissionsBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" | "fallback" => Ok(PermissionsBackend::None),
            "memory" => Ok(PermissionsBackend::Memory),
            "postgres" => Ok(PermissionsBackend::Postgres),
            other => bail!("unknown permissions store backend: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub enabled: bool,
    pub bind_addr: SocketAddr,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    region: Option<String>,
    user_pool_id: Option<String>,
    client_id: Option<String>,
    issuer: Option<String>,
    jwks_url: Option<String>,
    jwks_ttl_secs: Option<u64>,
    jwks_requests_per_minute: Option<u32>,
    clock_skew_secs: Option<u64>,
    permissions_store: Option<PermissionsBackend>,
    postgres_url: Option<String>,
    seed_on_startup: Option<bool>,
    bootstrap_enabled: Option<bool>,
    bootstrap_bind: Option<String>,
    bootstrap_token: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_or(key, default);
    raw.parse()
        .map_err(|err| anyhow::anyhow!("{err}"))
        .with_context(|| format!("parse {key}"))
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_parse("EVENTHUB_BIND", "0.0.0.0:8080")?;
        let metrics_bind = env_parse("EVENTHUB_METRICS_BIND", "0.0.0.0:9090")?;

        let cognito = CognitoConfig {
            region: env_or("AWS_REGION", "us-east-1"),
            user_pool_id: std::env::var("COGNITO_USER_POOL_ID").unwrap_or_default(),
            client_id: std::env::var("COGNITO_USER_POOL_CLIENT_ID").unwrap_or_default(),
            issuer: std::env::var("EVENTHUB_ISSUER").ok(),
            jwks_url: std::env::var("EVENTHUB_JWKS_URL").ok(),
            jwks_ttl: Duration::from_secs(env_parse(
                "EVENTHUB_JWKS_TTL_SECS",
                &DEFAULT_JWKS_TTL_SECS.to_string(),
            )?),
            jwks_requests_per_minute: env_parse(
                "EVENTHUB_JWKS_REQUESTS_PER_MINUTE",
                &DEFAULT_JWKS_REQUESTS_PER_MINUTE.to_string(),
            )?,
            clock_skew_seconds: env_parse(
                "EVENTHUB_CLOCK_SKEW_SECS",
                &DEFAULT_CLOCK_SKEW_SECS.to_string(),
            )?,
        };

        let permissions_store = env_parse("EVENTHUB_PERMISSIONS_STORE", "none")?;
        let postgres = match std::env::var("EVENTHUB_PG_URL") {
            Ok(url) => Some(PostgresConfig {
                url,
                max_connections: env_parse("EVENTHUB_PG_MAX_CONNECTIONS", "10")?,
                acquire_timeout_ms: env_parse("EVENTHUB_PG_ACQUIRE_TIMEOUT_MS", "5000")?,
            }),
            Err(_) => None,
        };

        let bootstrap = BootstrapConfig {
            enabled: env_parse("EVENTHUB_BOOTSTRAP_ENABLED", "false")?,
            bind_addr: env_parse("EVENTHUB_BOOTSTRAP_BIND", "127.0.0.1:8081")?,
            token: std::env::var("EVENTHUB_BOOTSTRAP_TOKEN").ok(),
        };

        Ok(Self {
            bind_addr,
            metrics_bind,
            cognito,
            permissions_store,
            postgres,
            seed_on_startup: env_parse("EVENTHUB_SEED_ON_STARTUP", "false")?,
            bootstrap,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("EVENTHUB_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read EVENTHUB_CONFIG: {path}"))?;
            let override_cfg: GatewayConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse gateway config yaml")?;
            config.apply(override_cfg)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, override_cfg: GatewayConfigOverride) -> Result<()> {
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.region {
            self.cognito.region = value;
        }
        if let Some(value) = override_cfg.user_pool_id {
            self.cognito.user_pool_id = value;
        }
        if let Some(value) = override_cfg.client_id {
            self.cognito.client_id = value;
        }
        if let Some(value) = override_cfg.issuer {
            self.cognito.issuer = Some(value);
        }
        if let Some(value) = override_cfg.jwks_url {
            self.cognito.jwks_url = Some(value);
        }
        if let Some(value) = override_cfg.jwks_ttl_secs {
            self.cognito.jwks_ttl = Duration::from_secs(value);
        }
        if let Some(value) = override_cfg.jwks_requests_per_minute {
            self.cognito.jwks_requests_per_minute = value;
        }
        if let Some(value) = override_cfg.clock_skew_secs {
            self.cognito.clock_skew_seconds = value;
        }
        if let Some(value) = override_cfg.permissions_store {
            self.permissions_store = value;
        }
        if let Some(url) = override_cfg.postgres_url {
            match &mut self.postgres {
                Some(pg) => pg.url = url,
                None => {
                    self.postgres = Some(PostgresConfig {
                        url,
                        max_connections: 10,
                        acquire_timeout_ms: 5000,
                    })
                }
            }
        }
        if let Some(value) = override_cfg.seed_on_startup {
            self.seed_on_startup = value;
        }
        if let Some(value) = override_cfg.bootstrap_enabled {
            self.bootstrap.enabled = value;
        }
        if let Some(value) = override_cfg.bootstrap_bind {
            self.bootstrap.bind_addr = value.parse().with_context(|| "parse bootstrap_bind")?;
        }
        if let Some(value) = override_cfg.bootstrap_token {
            self.bootstrap.token = Some(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cognito.issuer.is_none() && self.cognito.user_pool_id.trim().is_empty() {
            bail!("COGNITO_USER_POOL_ID is required");
        }
        if self.cognito.client_id.trim().is_empty() {
            bail!("COGNITO_USER_POOL_CLIENT_ID is required");
        }
        if self.permissions_store == PermissionsBackend::Postgres && self.postgres.is_none() {
            bail!("EVENTHUB_PG_URL is required for the postgres permissions store");
        }
        if self.bootstrap.enabled && self.bootstrap.token.is_none() {
            bail!("EVENTHUB_BOOTSTRAP_TOKEN is required when bootstrap is enabled");
        }
        if self.cognito.jwks_ttl.is_zero()
            || self.cognito.jwks_ttl > Duration::from_secs(MAX_JWKS_TTL_SECS)
        {
            bail!("EVENTHUB_JWKS_TTL_SECS must be between 1 and {MAX_JWKS_TTL_SECS}");
        }
        if self.cognito.clock_skew_seconds > MAX_CLOCK_SKEW_SECS {
            bail!("EVENTHUB_CLOCK_SKEW_SECS must be at most {MAX_CLOCK_SKEW_SECS}");
        }
        Ok(())
    }
}
