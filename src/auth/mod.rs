// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session credentials issued by this service.
//!
//! ## Credential Flow
//!
//! 1. A user logs in through SSO or Google (see `identity`)
//! 2. The service signs an HS256 access token (`iss`, `iat`, `exp`, `user_id`)
//!    and records it in the session cache under the user id
//! 3. The client sends `Authorization: Bearer <token>`
//! 4. Validation checks signature, issuer and expiry, then requires the token
//!    to be byte-identical to the cached one
//!
//! ## Security
//!
//! - Only HS256 is accepted; any other `alg` header is rejected
//! - One active access token per user: a new login supersedes the old token
//! - Refresh tokens are opaque, single-use, and stored only as SHA-256 digests

pub mod claims;
pub mod codec;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod refresh;
pub mod roles;

pub use claims::{TokenClaims, UserCredential};
pub use codec::TokenCodec;
pub use credentials::{Credential, CredentialIssuer, IssuanceSettings};
pub use error::{CredentialError, TokenError};
pub use extractor::Auth;
pub use refresh::{generate_refresh_token, hash_refresh_token, RefreshToken};
pub use roles::Role;
