// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Opaque refresh tokens and their at-rest digest.
//!
//! A refresh token is 32 bytes from the system CSPRNG, URL-safe base64
//! encoded. Only `hash_refresh_token(raw)` (base64 of SHA-256) is ever
//! persisted; the raw value is handed to the caller once.

use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

use super::error::CredentialError;

const REFRESH_TOKEN_BYTES: usize = 32;

/// A freshly generated refresh token together with its storage digest.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub raw: String,
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Result<Self, CredentialError> {
        let raw = generate_refresh_token()?;
        let hash = hash_refresh_token(&raw);
        Ok(Self { raw, hash })
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshToken")
            .field("raw", &"<redacted>")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Generate a new opaque refresh token.
pub fn generate_refresh_token() -> Result<String, CredentialError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| CredentialError::Internal("system random source unavailable".to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// One-way digest stored in place of the raw refresh token.
pub fn hash_refresh_token(raw: &str) -> String {
    Base64::encode_string(&Sha256::digest(raw.as_bytes()))
}
