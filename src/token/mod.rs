//! Signed, time-bound authorization tokens.
//!
//! Tokens are JWTs signed with HMAC-SHA256. Verification pins the algorithm:
//! a token whose header claims anything else is rejected before its signature
//! is even checked.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("malformed token: {0}")]
    Parse(#[source] jsonwebtoken::errors::Error),
}

/// Claim set carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub authorized: bool,
    pub sub: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
}

impl AccessClaims {
    /// Claims for `subject`, expiring `ttl` from now.
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        Self {
            authorized: true,
            sub: subject.into(),
            exp: unix_now() + ttl.as_secs(),
        }
    }
}

/// Outcome of a verification.
///
/// Claims are only surfaced from a valid token; every rejected token carries
/// `claims: None` so callers cannot act on forged content.
#[derive(Debug, Clone)]
pub struct Verification {
    pub valid: bool,
    pub claims: Option<AccessClaims>,
}

impl Verification {
    fn invalid() -> Self {
        Self {
            valid: false,
            claims: None,
        }
    }
}

/// Issues and verifies HS256-signed tokens.
///
/// Stateless aside from the shared secret; safe for unsynchronized concurrent
/// use.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    subject: String,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked explicitly in `verify` so the boundary is exact.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            subject: config.subject.clone(),
            ttl: Duration::from_secs(config.ttl),
        }
    }

    /// Issue a token for the configured subject, expiring `ttl` from now.
    pub fn issue(&self) -> Result<String, TokenError> {
        self.sign(&AccessClaims::new(self.subject.clone(), self.ttl))
    }

    /// Sign an explicit claim set.
    pub fn sign(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify a presented token.
    ///
    /// Wrong algorithm, signature mismatch and expiry all yield
    /// `valid = false`; only a structurally malformed token string is a
    /// [`TokenError::Parse`].
    pub fn verify(&self, token: &str) -> Result<Verification, TokenError> {
        let data = match decode::<AccessClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidAlgorithmName
                    | ErrorKind::InvalidSignature
                    | ErrorKind::ExpiredSignature => Ok(Verification::invalid()),
                    _ => Err(TokenError::Parse(e)),
                };
            }
        };

        // Valid over [issue, exp); a token presented at exactly `exp` is dead.
        if data.claims.exp <= unix_now() {
            return Ok(Verification::invalid());
        }

        Ok(Verification {
            valid: true,
            claims: Some(data.claims),
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
