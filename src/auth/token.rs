//! Bearer token verification.
//!
//! Tokens are compact HS256 JWTs (`header.payload.signature`, each part
//! base64url). Two configured bypass keys are accepted verbatim.
//!
//! # Design Decisions
//! - `verify` never errors: every failure folds into `false`
//! - Signature is checked before the payload is looked at
//! - Signature comparison is constant time (`Mac::verify_slice`)

use std::time::{SystemTime, UNIX_EPOCH};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Standard alphabet, padding optional.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a token fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no secret configured or empty token")]
    Empty,

    #[error("token must have exactly three parts")]
    Malformed,

    #[error("invalid base64 in {0}")]
    Encoding(&'static str),

    #[error("signature mismatch")]
    BadSignature,

    #[error("invalid payload: {0}")]
    Payload(String),

    #[error("token expired at {exp}")]
    Expired { exp: i64 },

    #[error("secret rejected as HMAC key")]
    Key,
}

/// Verifies bearer tokens against the configured secret and bypass keys.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: String,
    anon_key: String,
    service_role_key: String,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("secret_set", &!self.secret.is_empty())
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    /// Returns true if the token is a bypass key or a valid, unexpired JWT.
    pub fn verify(&self, token: &str) -> bool {
        self.verify_at(token, unix_now())
    }

    /// Same as [`verify`](Self::verify) with an explicit clock.
    pub fn verify_at(&self, token: &str, now: u64) -> bool {
        match self.check(token, now) {
            Ok(()) => true,
            Err(e @ (TokenError::Empty | TokenError::BadSignature | TokenError::Expired { .. })) => {
                tracing::debug!(error = %e, "Token rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token validation error");
                false
            }
        }
    }

    fn check(&self, token: &str, now: u64) -> Result<(), TokenError> {
        if self.secret.is_empty() || token.is_empty() {
            return Err(TokenError::Empty);
        }

        if token == self.anon_key || token == self.service_role_key {
            return Ok(());
        }

        let parts: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(TokenError::Malformed);
        };

        let signature = decode_segment(signature).map_err(|_| TokenError::Encoding("signature"))?;

        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| TokenError::Key)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = decode_segment(payload).map_err(|_| TokenError::Encoding("payload"))?;
        let claims: Value =
            serde_json::from_slice(&payload).map_err(|e| TokenError::Payload(e.to_string()))?;
        let claims = claims
            .as_object()
            .ok_or_else(|| TokenError::Payload("not a JSON object".into()))?;

        match claims.get("exp") {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Number(exp)) => {
                let exp = exp
                    .as_f64()
                    .ok_or_else(|| TokenError::Payload("exp out of range".into()))?;
                if exp > now as f64 {
                    Ok(())
                } else {
                    Err(TokenError::Expired { exp: exp as i64 })
                }
            }
            Some(_) => Err(TokenError::Payload("exp is not numeric".into())),
        }
    }
}

/// Decode a base64url segment by mapping it onto the standard alphabet first.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let standard = segment.replace('-', "+").replace('_', "/");
    LENIENT_STANDARD.decode(standard)
}

/// Mint an HS256 token carrying the given claims.
pub fn sign_token(secret: &str, claims: &Value) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{header}.{payload}");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::Key)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Current wall-clock time in whole seconds since the epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
