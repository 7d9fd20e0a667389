// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token signing and verification.
//!
//! ## Security
//!
//! - Only `HS256` is accepted. The header algorithm is checked before any
//!   key material is used, so a token re-labelled as another algorithm
//!   (`none`, `RS256`, `HS512`, ...) is refused outright.
//! - `verify` checks the signature only. Issuer and expiry are content policy
//!   and belong to the credential engine.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::TokenClaims;
use super::error::TokenError;

/// The only signing algorithm this service issues or accepts.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies access tokens with a shared secret.
///
/// The secret is supplied once at construction; there is no ambient lookup.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for `user_id`, issued now and expiring after `ttl`.
    pub fn sign(&self, user_id: &str, issuer: &str, ttl: Duration) -> Result<String, TokenError> {
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| TokenError::Signing(format!("token lifetime out of range: {ttl:?}")))?;
        let claims = TokenClaims::new(user_id, issuer, Utc::now().timestamp(), ttl_secs);
        self.sign_claims(&claims)
    }

    /// Sign an explicit claim set.
    pub fn sign_claims(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the algorithm and signature and decode the claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::MalformedToken)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &signature_only())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => {
                    TokenError::UnsupportedAlgorithm(format!("{:?}", header.alg))
                }
                _ => TokenError::MalformedToken,
            })?;

        Ok(token_data.claims)
    }
}

/// Validation that checks the signature and nothing else.
fn signature_only() -> Validation {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}
