use axum::http;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use moka::sync::Cache;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::AuthUser;

// Get the auth token from a request
pub fn get_auth_token<B>(req: &http::Request<B>) -> Result<String, String> {
    // 1. Try to get token from Authorization header
    if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| "Invalid Authorization header".to_string())?;
        Ok(auth_str
            .strip_prefix("Bearer ")
            .unwrap_or(auth_str)
            .to_string())
    }
    // 2. Try to get token from cookies
    else {
        let cookie_header = req.headers().get(http::header::COOKIE)
            .ok_or_else(|| "Missing Authorization header or Cookie".to_string())?
            .to_str()
            .map_err(|_| "Invalid Cookie header".to_string())?;

        for c in cookie::Cookie::split_parse(cookie_header).flatten() {
            if c.name() == "auth_token" {
                return Ok(c.value().to_string());
            }
        }
        Err("auth_token cookie not found".to_string())
    }
}

// Validate a JWT token and return the token data
pub fn validate_jwt(token: &str, secret: &str) -> Result<TokenData<Value>, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Value>(token, &decoding_key, &validation)
}

fn claim_str(claims: &Value, name: &str) -> Option<String> {
    claims.get(name).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Build the caller identity from verified claims
pub fn claims_to_user(claims: &Value) -> Result<AuthUser, String> {
    let uid = claim_str(claims, "sub").ok_or_else(|| "JWT token does not contain 'sub' claim".to_string())?;

    // Get roles from the token claims
    let roles = match claims.get("roles").and_then(|v| v.as_array()) {
        Some(roles_array) => roles_array.iter().filter_map(|r| r.as_str().map(|s| s.to_string())).collect::<Vec<String>>(),
        None => Vec::new(),
    };

    Ok(AuthUser {
        uid,
        email: claim_str(claims, "email"),
        first_name: claim_str(claims, "given_name"),
        last_name: claim_str(claims, "family_name"),
        roles,
    })
}

#[derive(Clone)]
struct CachedIdentity {
    user: AuthUser,
    expires_at: i64,
}

/// Verified identities keyed by raw token
#[derive(Clone)]
pub struct IdentityCache {
    cache: Cache<String, CachedIdentity>,
}

impl IdentityCache {
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(100_000)
            .time_to_idle(Duration::from_secs(5 * 60))
            .build();
        info!("Identity cache initialized");
        Self { cache }
    }

    /// Resolve a token, validating it only on a cache miss or after expiry
    pub fn resolve(&self, token: &str, secret: &str) -> Result<AuthUser, String> {
        if let Some(hit) = self.cache.get(token) {
            if hit.expires_at > Utc::now().timestamp() {
                return Ok(hit.user);
            }
            self.cache.invalidate(token);
        }

        let token_data = validate_jwt(token, secret).map_err(|e| format!("JWT validation failed: {}", e))?;
        let user = claims_to_user(&token_data.claims)?;
        debug!("JWT token validated successfully for user: {}", user.uid);

        let expires_at = token_data.claims.get("exp").and_then(|v| v.as_i64()).unwrap_or_default();
        self.cache.insert(token.to_string(), CachedIdentity { user: user.clone(), expires_at });
        Ok(user)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}
