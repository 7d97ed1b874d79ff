// Copyright 2026 S4Core Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JWT token generation and validation.
//!
//! Tokens are compact HMAC-signed JWTs carrying `sub`, `iat` and `exp`.
//! Expiry is checked against a caller-supplied clock with zero leeway: a
//! token presented at exactly `exp` is rejected.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::AuthSettings;
use super::error::IamError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and validates access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, IamError> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(IamError::UnsupportedAlgorithm(other.to_string())),
    }
}

impl TokenCodec {
    /// Create a token codec.
    ///
    /// # Arguments
    ///
    /// * `secret` - Shared signing secret
    /// * `algorithm` - One of `HS256`, `HS384`, `HS512`
    /// * `ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    ///
    /// Returns `IamError::UnsupportedAlgorithm` for non-HMAC algorithms and
    /// `IamError::Config` for an empty secret or a non-positive lifetime.
    pub fn new(secret: &str, algorithm: &str, ttl: Duration) -> Result<Self, IamError> {
        let algorithm = parse_algorithm(algorithm)?;
        if secret.is_empty() {
            return Err(IamError::Config("secret key must not be empty".to_string()));
        }
        if ttl <= Duration::zero() {
            return Err(IamError::Config("token lifetime must be positive".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl,
        })
    }

    /// Create a token codec from loaded settings.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, IamError> {
        Self::new(
            &settings.secret_key,
            &settings.algorithm,
            Duration::minutes(i64::from(settings.access_token_expire_minutes)),
        )
    }

    /// Signing algorithm in use.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Lifetime of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Expiry instant of a token issued at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.ttl
    }

    /// Issue a token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `IamError::TokenGenerationFailed` if signing fails.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, IamError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: self.expires_at(now).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|_| IamError::TokenGenerationFailed)
    }

    /// Validate and decode a token as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `IamError::InvalidToken` if the token is malformed, signed with
    /// a different key or algorithm, or expired.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, IamError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                IamError::InvalidToken
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            debug!(sub = %claims.sub, exp = claims.exp, "Rejected expired access token");
            return Err(IamError::InvalidToken);
        }

        Ok(claims)
    }
}
