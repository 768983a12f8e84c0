use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;

/// Identity provider user API
const USER_API_URL: &str = "https://api.clerk.dev/v1/users";

/// Cache TTL in seconds (1 hour)
const JWKS_CACHE_TTL_SECS: u64 = 3600;

/// Verifies a bearer token and resolves the submitting user.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<AuthenticatedUser>;
}

/// Session token claims; the audience is not checked
#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// JWKS key from the identity provider
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
    kty: String,
    alg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

struct JwksCache {
    keys: HashMap<String, JwkKey>,
    fetched_at: std::time::Instant,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

/// Subset of the provider's user profile
#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl UserProfile {
    fn email(&self) -> String {
        self.email_addresses
            .first()
            .map(|e| e.email_address.clone())
            .unwrap_or_default()
    }

    fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Verifies RS256 session tokens against the provider's JWKS and loads the user profile
#[derive(Clone)]
pub struct ClerkTokenVerifier {
    client: Client,
    jwks_url: String,
    secret_key: String,
    cache: Arc<RwLock<Option<JwksCache>>>,
}

impl ClerkTokenVerifier {
    pub fn new(client: Client, domain: &str, secret_key: String) -> Self {
        Self {
            client,
            jwks_url: format!("https://{}/.well-known/jwks.json", domain),
            secret_key,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    async fn get_decoding_key(&self, kid: &str) -> AppResult<DecodingKey> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed().as_secs() < JWKS_CACHE_TTL_SECS {
                    if let Some(key) = cached.keys.get(kid) {
                        return jwk_to_decoding_key(key);
                    }
                }
            }
        }

        // Fetch fresh JWKS
        let jwks: JwksResponse = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {}", e)))?;

        let keys: HashMap<String, JwkKey> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        let decoding_key = keys
            .get(kid)
            .ok_or_else(|| AppError::Unauthorized("Invalid token key".to_string()))
            .and_then(jwk_to_decoding_key)?;

        // Update cache
        {
            let mut cache = self.cache.write().await;
            *cache = Some(JwksCache {
                keys,
                fetched_at: std::time::Instant::now(),
            });
        }

        Ok(decoding_key)
    }

    async fn fetch_profile(&self, user_id: &str) -> AppResult<UserProfile> {
        let response = self
            .client
            .get(format!("{}/{}", USER_API_URL, user_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch user: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized("Failed to fetch user".to_string()));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse user: {}", e)))
    }
}

#[async_trait]
impl TokenVerifier for ClerkTokenVerifier {
    async fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let header = decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Unauthorized("Token missing kid header".to_string()))?;

        let decoding_key = self.get_decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;

        let claims = decode::<SessionClaims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Token validation failed: {}", e)))?
            .claims;

        let profile = self.fetch_profile(&claims.sub).await?;
        Ok(AuthenticatedUser {
            email: profile.email(),
            name: profile.display_name(),
            user_id: claims.sub,
        })
    }
}

fn jwk_to_decoding_key(key: &JwkKey) -> AppResult<DecodingKey> {
    if key.kty != "RSA" {
        return Err(AppError::Unauthorized(format!(
            "Unsupported key type: {}",
            key.kty
        )));
    }
    DecodingKey::from_rsa_components(&key.n, &key.e)
        .map_err(|e| AppError::Unauthorized(format!("Failed to create decoding key: {}", e)))
}
