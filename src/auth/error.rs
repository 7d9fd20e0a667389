// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token and credential errors.

/// Errors raised by the token codec.
///
/// The codec only answers "is this a well-formed HS256 token signed with our
/// secret"; issuer and expiry are checked by the credential engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token is not a decodable three-part token, or its claims are missing
    /// or mistyped
    MalformedToken,
    /// Header names an algorithm other than HS256
    UnsupportedAlgorithm(String),
    /// Signature does not match the configured secret
    InvalidSignature,
    /// Signing failed (secret misconfigured)
    Signing(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::MalformedToken => write!(f, "Token is malformed"),
            TokenError::UnsupportedAlgorithm(alg) => {
                write!(f, "Token algorithm {alg} is not accepted")
            }
            TokenError::InvalidSignature => write!(f, "Token signature is invalid"),
            TokenError::Signing(msg) => write!(f, "Error while signing the token: {msg}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Errors raised by the credential issuance engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// Bad signature, wrong issuer, no active session, or superseded token.
    /// Deliberately one variant so callers cannot tell these apart.
    #[error("invalid token")]
    InvalidToken,

    #[error("token is expired")]
    TokenExpired,

    /// Session cache unreachable or signing misconfigured. The detail is for
    /// logs only.
    #[error("internal service error")]
    Internal(String),
}

impl From<TokenError> for CredentialError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(msg) => CredentialError::Internal(msg),
            _ => CredentialError::InvalidToken,
        }
    }
}
