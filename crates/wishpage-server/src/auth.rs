//! Admin authentication: password check and bearer tokens

use crate::{ApiError, ErrorCode};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Subject of every admin token; there is a single admin identity
pub const ADMIN_SUBJECT: &str = "admin";

/// Length of the per-process signing secret
const SECRET_LEN: usize = 32;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    pub sub: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
}

/// A freshly minted token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    #[serde(skip)]
    pub expires_at: i64,
}

/// Hex-encoded SHA-256, the form clients submit at login
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Issues and verifies admin tokens
///
/// The signing secret is generated at startup and never stored, so a restart
/// invalidates every outstanding token.
pub struct TokenAuthority {
    password_hash: String,
    secret: [u8; SECRET_LEN],
    ttl: Duration,
}

impl TokenAuthority {
    /// Create an authority for this admin password with a random secret
    pub fn new(admin_password: &str, ttl: Duration) -> Self {
        let mut secret = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut secret);
        Self::with_secret(admin_password, secret, ttl)
    }

    /// Create an authority with a known secret
    pub fn with_secret(admin_password: &str, secret: [u8; SECRET_LEN], ttl: Duration) -> Self {
        Self {
            password_hash: hash_password(admin_password),
            secret,
            ttl,
        }
    }

    /// Compare a client-submitted hash with the configured one
    ///
    /// The client sends the hash, not the password; both sides are compared
    /// as opaque strings.
    pub fn check_password(&self, submitted_hash: &str) -> bool {
        self.password_hash == submitted_hash
    }

    /// Mint a token that expires `ttl` from now
    pub fn issue(&self) -> Result<IssuedToken, ApiError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<IssuedToken, ApiError> {
        let token = encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| ApiError::Internal(format!("could not generate token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Validate a raw token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(ADMIN_SUBJECT.to_string());

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                ApiError::new(ErrorCode::InvalidToken, "Invalid token")
            })
    }

    /// Verify an `Authorization` header value
    pub fn verify(&self, auth_header: Option<&str>) -> Result<Claims, ApiError> {
        let header =
            auth_header.ok_or_else(|| ApiError::new(ErrorCode::MissingToken, "No token provided"))?;
        let token = extract_bearer_token(header).ok_or_else(|| {
            ApiError::new(ErrorCode::InvalidToken, "Invalid Authorization header format")
        })?;
        self.validate_token(token)
    }
}
