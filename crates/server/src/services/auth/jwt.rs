//! Bearer token issuing and validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use mise_core::{EmployeeId, EmployeeRole, StoreId};

use super::AuthError;
use crate::config::JwtConfig;
use crate::models::{CurrentUser, Employee};

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Employee ID.
    pub sub: String,
    pub store: StoreId,
    pub role: EmployeeRole,
    pub name: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<EmployeeId>()
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            id,
            store_id: claims.store,
            name: claims.name,
            role: claims.role,
        })
    }
}

/// Issues and validates HS256 tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            ttl: Duration::minutes(config.ttl_minutes),
        }
    }

    /// Issue a token for `employee`, returning it with its expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenEncoding` if signing fails.
    pub fn issue(&self, employee: &Employee) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: employee.id.to_string(),
            store: employee.store_id,
            role: employee.role,
            name: employee.name.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenEncoding(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Verify signature, issuer and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for anything else wrong with it.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;
        Ok(data.claims)
    }

    /// Validate a token and return the caller it identifies.
    ///
    /// # Errors
    ///
    /// Same as [`JwtService::validate`].
    pub fn current_user(&self, token: &str) -> Result<CurrentUser, AuthError> {
        self.validate(token)?.try_into()
    }

    /// Pull the token out of an `Authorization` header value.
    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
