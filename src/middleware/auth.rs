// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token claims and verification.

use chrono::Utc;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Tolerated clock difference between this host and the token issuer.
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 60;

/// Claims carried by backend-issued access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Account email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// "access" or "refresh"
    #[serde(rename = "type")]
    pub token_type: String,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not before (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Outcome of checking a presented credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Missing,
    Invalid,
    /// Signed correctly but not valid yet: the clocks disagree.
    ClockSkew,
}

/// Verify an access token against the shared signing key.
pub fn verify_access_token(token: &str, signing_key: &[u8]) -> TokenStatus {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_nbf = true;
    validation.leeway = CLOCK_SKEW_LEEWAY_SECS as u64;

    let claims = match decode::<AccessClaims>(token, &key, &validation) {
        Ok(data) => data.claims,
        Err(e) if matches!(e.kind(), ErrorKind::ImmatureSignature) => {
            return TokenStatus::ClockSkew;
        }
        Err(_) => return TokenStatus::Invalid,
    };

    if claims.token_type != "access" || claims.email.is_empty() {
        return TokenStatus::Invalid;
    }

    if issued_in_future(claims.iat, claims.nbf, Utc::now().timestamp()) {
        return TokenStatus::ClockSkew;
    }

    TokenStatus::Valid
}

/// Timing claims read without verifying the signature.
#[derive(Debug, Deserialize)]
struct TimingClaims {
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

/// True if `token` is a JWT the local clock considers not yet issued.
///
/// Opaque (non-JWT) tokens are never reported as skewed.
pub fn token_used_too_early(token: &str, now: i64) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TimingClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => issued_in_future(data.claims.iat, data.claims.nbf, now),
        Err(_) => false,
    }
}

fn issued_in_future(iat: Option<i64>, nbf: Option<i64>, now: i64) -> bool {
    [iat, nbf]
        .into_iter()
        .flatten()
        .any(|t| t > now + CLOCK_SKEW_LEEWAY_SECS)
}

/// Mint an access token in the backend's format.
pub fn create_access_token(
    email: &str,
    signing_key: &[u8],
    lifetime_secs: u64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now().timestamp();

    let claims = AccessClaims {
        email: email.to_string(),
        exp: (now as u64 + lifetime_secs) as usize,
        token_type: "access".to_string(),
        iat: Some(now),
        nbf: None,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    fn sign(claims: &AccessClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap()
    }

    fn claims(token_type: &str, exp_offset: i64) -> AccessClaims {
        let now = Utc::now().timestamp();
        AccessClaims {
            email: "user@example.com".to_string(),
            exp: (now + exp_offset) as usize,
            token_type: token_type.to_string(),
            iat: None,
            nbf: None,
        }
    }

    #[test]
    fn test_minted_token_verifies() {
        let token = create_access_token("user@example.com", KEY, 900).unwrap();
        assert_eq!(verify_access_token(&token, KEY), TokenStatus::Valid);
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let token = create_access_token("user@example.com", KEY, 900).unwrap();
        assert_eq!(
            verify_access_token(&token, b"another_key_of_sufficient_size!!"),
            TokenStatus::Invalid
        );
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let token = sign(&claims("refresh", 900));
        assert_eq!(verify_access_token(&token, KEY), TokenStatus::Invalid);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let token = sign(&claims("access", -3600));
        assert_eq!(verify_access_token(&token, KEY), TokenStatus::Invalid);
    }

    #[test]
    fn test_future_nbf_is_clock_skew() {
        let mut c = claims("access", 7200);
        c.nbf = Some(Utc::now().timestamp() + 3600);
        assert_eq!(verify_access_token(&sign(&c), KEY), TokenStatus::ClockSkew);
    }

    #[test]
    fn test_token_used_too_early_ignores_opaque_tokens() {
        assert!(!token_used_too_early("A", Utc::now().timestamp()));
    }

    #[test]
    fn test_token_used_too_early_reads_iat() {
        let now = Utc::now().timestamp();
        let mut c = claims("access", 7200);
        c.iat = Some(now + 600);
        assert!(token_used_too_early(&sign(&c), now));

        c.iat = Some(now + 30);
        assert!(!token_used_too_early(&sign(&c), now));
    }
}
