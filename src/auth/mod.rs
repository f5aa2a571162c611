pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::Role;

pub use password::{hash_password, verify_password};

/// Longest token lifetime a service may be configured with (one year)
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, role: Role, lifetime: Duration) -> Result<Self, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::Signing("token expiry out of range".to_string()))?;
        Ok(Self {
            sub,
            role,
            exp: expires.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token subject no longer exists")]
    UnknownSubject,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// A freshly signed token and its lifetime in seconds
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Signs and verifies HS256 tokens. Built once at startup from configuration.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Signing("JWT secret not configured".to_string()));
        }

        let lifetime = i64::try_from(expiry_hours)
            .ok()
            .filter(|hours| (1..=MAX_EXPIRY_HOURS as i64).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AuthError::Signing(format!(
                    "token lifetime must be between 1 and {} hours",
                    MAX_EXPIRY_HOURS
                ))
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token is dead the second it expires.
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token asserting `identity` and `role`
    pub fn issue(&self, identity: Uuid, role: Role) -> Result<IssuedToken, AuthError> {
        let claims = Claims::new(identity, role, self.lifetime)?;
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            token_type: "Bearer",
            expires_in: self.lifetime.num_seconds(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the asserted identity
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}
