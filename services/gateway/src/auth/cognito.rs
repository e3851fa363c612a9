//! Cognito bearer token validation with a cached, rate-limited JWKS.
//!
//! # Purpose
//! Turn a bearer token issued by the user pool into a trusted [`Identity`].
//!
//! # Key invariants
//! - Only RS256 is accepted. Any other header algorithm is rejected before a
//!   key is looked up. Tokens claiming `none` fail header decoding.
//! - `iss` must equal the pool issuer and `aud` the app client id.
//! - JWKS responses are cached for a TTL. Refetches are capped per rolling
//!   minute; when the cap is hit a stale cached set is used if one exists.
//!
//! # Concurrency model
//! The key cache is a `DashMap` shared across requests. Concurrent misses may
//! both fetch, which is harmless because fetches are idempotent reads.
//!
//! # Security model
//! Claims are only read after the signature, issuer, audience, and expiry
//! checks pass. Error messages never include token contents.
use crate::config::CognitoConfig;
use crate::observability;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use eventhub_authz::Identity;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SUBJECT_CLAIM: &str = "sub";
const EMAIL_CLAIM: &str = "email";
const USERNAME_CLAIM: &str = "cognito:username";
const ACCESS_TOKEN_USERNAME_CLAIM: &str = "username";
const GROUPS_CLAIM: &str = "cognito:groups";
const ORGANIZATION_CLAIM: &str = "custom:organization";
const ROLE_CLAIM: &str = "custom:role";
const MAX_CACHE_TTL: Duration = Duration::from_secs(86_400);
const MAX_LEEWAY_SECS: u64 = 600;

/// Turns a bearer token into an [`Identity`].
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, OidcError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OidcError {
    #[error("missing subject")]
    MissingSubject,
    #[error("missing key id")]
    MissingKeyId,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid jwk: {0}")]
    InvalidJwk(String),
    #[error("jwks key not found")]
    JwksKeyNotFound,
    #[error("jwks refresh rate limited")]
    JwksRateLimited,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid claim: {0}")]
    InvalidClaim(String),
}

/// Fixed inputs for token validation.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_ttl: Duration,
    pub jwks_requests_per_minute: u32,
    pub clock_skew_seconds: u64,
}

impl From<&CognitoConfig> for ResolverSettings {
    fn from(config: &CognitoConfig) -> Self {
        Self {
            issuer: config.issuer(),
            audience: config.client_id.clone(),
            jwks_url: config.jwks_url(),
            jwks_ttl: config.jwks_ttl,
            jwks_requests_per_minute: config.jwks_requests_per_minute,
            clock_skew_seconds: config.clock_skew_seconds,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: JwkSet,
    expires_at: Instant,
}

/// Sliding-window cap on JWKS fetches. A limit of zero disables the cap.
#[derive(Debug)]
struct FetchLimiter {
    limit: usize,
    window: Duration,
    recent: Mutex<VecDeque<Instant>>,
}

impl FetchLimiter {
    fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            window,
            recent: Mutex::new(VecDeque::with_capacity(limit as usize)),
        }
    }

    fn try_acquire(&self) -> bool {
        if self.limit == 0 {
            return true;
        }
        let now = Instant::now();
        let mut recent = self.recent.lock();
        while let Some(oldest) = recent.front() {
            if now.duration_since(*oldest) >= self.window {
                recent.pop_front();
            } else {
                break;
            }
        }
        if recent.len() >= self.limit {
            return false;
        }
        recent.push_back(now);
        true
    }
}

/// Validates user pool tokens against the pool's published JWKS.
///
/// # Examples
/// ```rust
/// use gateway::auth::cognito::{CognitoTokenResolver, ResolverSettings};
/// use std::time::Duration;
///
/// let resolver = CognitoTokenResolver::new(ResolverSettings {
///     issuer: "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_pool".to_string(),
///     audience: "client-1".to_string(),
///     jwks_url: "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_pool/.well-known/jwks.json".to_string(),
///     jwks_ttl: Duration::from_secs(600),
///     jwks_requests_per_minute: 5,
///     clock_skew_seconds: 60,
/// });
/// ```
#[derive(Debug, Clone)]
pub struct CognitoTokenResolver {
    client: reqwest::Client,
    settings: Arc<ResolverSettings>,
    jwks_cache: Arc<DashMap<String, CachedJwks>>,
    limiter: Arc<FetchLimiter>,
}

impl CognitoTokenResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        let limiter = FetchLimiter::new(settings.jwks_requests_per_minute, Duration::from_secs(60));
        Self {
            client: reqwest::Client::new(),
            settings: Arc::new(settings),
            jwks_cache: Arc::new(DashMap::new()),
            limiter: Arc::new(limiter),
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Validate `token` and build the caller's identity.
    ///
    /// # Errors
    /// - `OidcError::UnsupportedAlgorithm` if the header algorithm is not RS256.
    /// - `OidcError::MissingKeyId` if the header lacks a `kid`.
    /// - `OidcError::JwksKeyNotFound` if no published key matches after one refresh.
    /// - `OidcError::JwksRateLimited` if keys are needed but fetching is capped.
    /// - `OidcError::Jwt` for signature, issuer, audience, or expiry failures.
    /// - `OidcError::MissingSubject` if the verified token has no `sub`.
    pub async fn validate(&self, token: &str) -> Result<Identity, OidcError> {
        // Reject unexpected algorithms before any network work.
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(OidcError::UnsupportedAlgorithm);
        }
        let kid = header.kid.as_deref().ok_or(OidcError::MissingKeyId)?;

        // An unknown kid may mean the pool rotated keys, so refresh once.
        let jwks = self.get_jwks().await?;
        let decoding_key = match find_jwk(&jwks, kid) {
            Some(key) => {
                ensure_rsa_jwk(key)?;
                DecodingKey::from_jwk(key)?
            }
            None => {
                let refreshed = self
                    .refresh_jwks()
                    .await?
                    .ok_or(OidcError::JwksKeyNotFound)?;
                let key = find_jwk(&refreshed, kid).ok_or(OidcError::JwksKeyNotFound)?;
                ensure_rsa_jwk(key)?;
                DecodingKey::from_jwk(key)?
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.audience.as_str()]);
        validation
            .required_spec_claims
            .extend(["iss".to_string(), "aud".to_string()]);
        validation.leeway = self.settings.clock_skew_seconds.min(MAX_LEEWAY_SECS);

        let token = decode::<Value>(token, &decoding_key, &validation)?;
        validate_iat(&token.claims, self.settings.clock_skew_seconds)?;
        identity_from_claims(&token.claims)
    }

    async fn get_jwks(&self) -> Result<JwkSet, OidcError> {
        let cached = self
            .jwks_cache
            .get(&self.settings.jwks_url)
            .map(|entry| entry.value().clone());
        if let Some(entry) = &cached
            && entry.expires_at > Instant::now()
        {
            return Ok(entry.jwks.clone());
        }
        match self.refresh_jwks().await? {
            Some(jwks) => Ok(jwks),
            None => match cached {
                Some(stale) => {
                    tracing::warn!(
                        jwks_url = %self.settings.jwks_url,
                        "jwks refresh rate limited; serving stale keys"
                    );
                    Ok(stale.jwks)
                }
                None => Err(OidcError::JwksRateLimited),
            },
        }
    }

    /// Fetch and cache the key set. Returns `None` when the fetch cap is hit.
    async fn refresh_jwks(&self) -> Result<Option<JwkSet>, OidcError> {
        if !self.limiter.try_acquire() {
            observability::record_jwks_fetch("rate_limited");
            return Ok(None);
        }
        let jwks = match self.fetch_jwks().await {
            Ok(jwks) => jwks,
            Err(err) => {
                observability::record_jwks_fetch("error");
                tracing::warn!(error = %err, jwks_url = %self.settings.jwks_url, "jwks fetch failed");
                return Err(err);
            }
        };
        observability::record_jwks_fetch("ok");
        self.jwks_cache.insert(
            self.settings.jwks_url.clone(),
            CachedJwks {
                jwks: jwks.clone(),
                expires_at: cache_expiry(Instant::now(), self.settings.jwks_ttl),
            },
        );
        Ok(Some(jwks))
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, OidcError> {
        let jwks = self
            .client
            .get(&self.settings.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(jwks)
    }
}

#[async_trait]
impl IdentityResolver for CognitoTokenResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, OidcError> {
        self.validate(token).await
    }
}

fn ensure_rsa_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<(), OidcError> {
    if let Some(key_alg) = jwk.common.key_algorithm
        && key_alg != KeyAlgorithm::RS256
    {
        return Err(OidcError::InvalidJwk("alg mismatch".to_string()));
    }
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Ok(()),
        _ => Err(OidcError::InvalidJwk("kty mismatch".to_string())),
    }
}

/// Expiry for a freshly fetched key set. TTLs past what `Instant` can
/// represent are capped at `MAX_CACHE_TTL`.
fn cache_expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(MAX_CACHE_TTL))
        .unwrap_or(now)
}

fn find_jwk<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    jwks.keys
        .iter()
        .find(|key| key.common.key_id.as_deref() == Some(kid))
}

fn validate_iat(claims: &Value, leeway_seconds: u64) -> Result<(), OidcError> {
    let Some(iat) = claims.get("iat") else {
        return Ok(());
    };
    let iat = iat
        .as_i64()
        .ok_or_else(|| OidcError::InvalidClaim("iat".to_string()))?;
    let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
    let now = Utc::now().timestamp();
    if iat > now.saturating_add(leeway) {
        return Err(OidcError::InvalidClaim("iat in future".to_string()));
    }
    Ok(())
}

fn identity_from_claims(claims: &Value) -> Result<Identity, OidcError> {
    let subject = extract_string_claim(claims, SUBJECT_CLAIM)
        .filter(|value| !value.is_empty())
        .ok_or(OidcError::MissingSubject)?;
    let username = extract_string_claim(claims, USERNAME_CLAIM)
        .or_else(|| extract_string_claim(claims, ACCESS_TOKEN_USERNAME_CLAIM));
    Ok(Identity::new(subject, extract_groups_claim(claims, GROUPS_CLAIM))
        .with_email(extract_string_claim(claims, EMAIL_CLAIM))
        .with_username(username)
        .with_organization(extract_string_claim(claims, ORGANIZATION_CLAIM))
        .with_custom_role(extract_string_claim(claims, ROLE_CLAIM)))
}

fn extract_string_claim(claims: &Value, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

fn extract_groups_claim(claims: &Value, name: &str) -> Vec<String> {
    // Groups may be encoded as either a string or array of strings.
    let Some(value) = claims.get(name) else {
        return Vec::new();
    };
    if let Some(values) = value.as_array() {
        return values
            .iter()
            .filter_map(|item| item.as_str().map(|val| val.to_string()))
            .collect();
    }
    if let Some(value) = value.as_str() {
        return vec![value.to_string()];
    }
    Vec::new()
}
