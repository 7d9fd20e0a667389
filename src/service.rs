// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Auth Orchestrator
//!
//! Use-case layer behind every endpoint. Login requests go through identity
//! verification, then either reuse the user's auth record or provision a new
//! user, and finally issue credentials:
//!
//! ```text
//! Unauthenticated -> IdentityVerified -> ExistingUser       -> CredentialIssued
//!                                     -> NewUserProvisioned -> CredentialIssued
//! ```
//!
//! Validate and refresh skip identity verification.
//!
//! ## Refresh rotation
//!
//! The presented refresh token is claimed before anything is issued: the
//! store swaps the stored hash from the presented one to a fresh one in a
//! single conditional write. Only the caller that wins the swap gets an
//! access token, so a refresh token can be redeemed at most once even under
//! concurrent use. If issuance fails after the swap, the user has to log in
//! again.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::{
    hash_refresh_token, Credential, CredentialError, CredentialIssuer, RefreshToken, Role,
    UserCredential,
};
use crate::error::ServiceError;
use crate::identity::{ExternalIdentity, OAuthError, OAuthProvider, SsoError, TicketVerifier};
use crate::profile::{NewUserProfile, ProfileError, UserProfile, UserProfileClient};
use crate::provisioning::{self, PolicyConfig, ProvisioningError};
use crate::storage::{AuthRecord, AuthStore, StoreError};

const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";
const INVALID_TOKEN: &str = "invalid token";

pub struct AuthService {
    store: Arc<dyn AuthStore>,
    credentials: CredentialIssuer,
    users: Arc<dyn UserProfileClient>,
    sso: Arc<dyn TicketVerifier>,
    oauth: Arc<dyn OAuthProvider>,
    policy: PolicyConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AuthStore>,
        credentials: CredentialIssuer,
        users: Arc<dyn UserProfileClient>,
        sso: Arc<dyn TicketVerifier>,
        oauth: Arc<dyn OAuthProvider>,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            users,
            sso,
            oauth,
            policy,
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Log in with an SSO ticket.
    pub async fn verify_ticket(&self, ticket: &str) -> Result<Credential, ServiceError> {
        if ticket.is_empty() {
            return Err(ServiceError::invalid_argument("no ticket is provided"));
        }

        let sso = self.sso.verify_ticket(ticket).await.map_err(|e| match e {
            SsoError::InvalidTicket => ServiceError::unauthenticated("invalid ticket"),
            SsoError::RateLimited => ServiceError::resource_exhausted("too many requests"),
            SsoError::Config(msg) => {
                error!(operation = "verify_ticket", error = %msg, "SSO client misconfigured");
                ServiceError::internal()
            }
        })?;

        self.login(ExternalIdentity::Student(sso)).await
    }

    /// Log in with a Google authorization code.
    pub async fn verify_google_login(&self, code: &str) -> Result<Credential, ServiceError> {
        if code.is_empty() {
            return Err(ServiceError::invalid_argument("no code is provided"));
        }

        let profile = self
            .oauth
            .exchange_and_fetch_profile(code)
            .await
            .map_err(|e| match e {
                OAuthError::InvalidCode => ServiceError::invalid_argument("invalid code"),
                OAuthError::ProviderUnavailable(msg) => {
                    error!(operation = "verify_google_login", error = %msg, "Unable to get user info");
                    ServiceError::unavailable()
                }
                other => {
                    error!(operation = "verify_google_login", error = %other, "Unable to get user info");
                    ServiceError::internal()
                }
            })?;

        self.login(ExternalIdentity::Google(profile)).await
    }

    /// Redirect URL that starts the Google login.
    pub fn google_login_url(&self) -> Result<String, ServiceError> {
        self.oauth.login_url().map_err(|e| {
            error!(operation = "google_login_url", error = %e, "Unable to build login URL");
            ServiceError::internal()
        })
    }

    async fn login(&self, identity: ExternalIdentity) -> Result<Credential, ServiceError> {
        let provider = identity.provider();

        let found = match &identity {
            ExternalIdentity::Student(sso) => self.users.find_by_student_id(&sso.ouid).await,
            ExternalIdentity::Google(profile) => self.users.find_by_email(&profile.email).await,
        };

        let record = match found {
            Ok(user) => self.existing_record(&user).await?,
            Err(ProfileError::NotFound) => self.provision(&identity).await?,
            Err(e) => {
                error!(
                    operation = "login",
                    provider,
                    subject = %identity.lookup_key(),
                    error = %e,
                    "User service is down"
                );
                return Err(ServiceError::unavailable());
            }
        };

        let role = record.role;
        let credential = self.issue_and_persist(record).await?;
        info!(provider, %role, "User logged in");
        Ok(credential)
    }

    async fn existing_record(&self, user: &UserProfile) -> Result<AuthRecord, ServiceError> {
        match self.store.find_by_user_id(&user.id).await {
            Ok(record) => Ok(record),
            Err(e) if e.is_not_found() => {
                warn!(user_id = %user.id, "Profile exists without an auth record");
                Err(ServiceError::not_found("not found user"))
            }
            Err(e) => {
                error!(operation = "login", user_id = %user.id, error = %e, "Auth store is down");
                Err(ServiceError::unavailable())
            }
        }
    }

    /// First login: policy, then profile creation, then the local record.
    async fn provision(&self, identity: &ExternalIdentity) -> Result<AuthRecord, ServiceError> {
        let new_profile: NewUserProfile = match identity {
            ExternalIdentity::Student(sso) => provisioning::provision_student(sso, &self.policy)
                .map_err(|e| match e {
                    ProvisioningError::ForbiddenStudyYear => {
                        info!(student_id = %sso.ouid, "Study year is not admitted");
                        ServiceError::permission_denied(e.to_string())
                    }
                    ProvisioningError::InvalidStudentId | ProvisioningError::InvalidFacultyId => {
                        ServiceError::invalid_argument(e.to_string())
                    }
                })?,
            ExternalIdentity::Google(profile) => provisioning::build_google_profile(profile),
        };

        let user = self.users.create(&new_profile).await.map_err(|e| match e {
            ProfileError::Rejected(msg) => ServiceError::invalid_argument(msg),
            other => {
                error!(
                    operation = "provision",
                    subject = %identity.lookup_key(),
                    error = %other,
                    "Error creating the user profile"
                );
                ServiceError::unavailable()
            }
        })?;

        let record = AuthRecord::new(user.id.clone(), Role::default());
        if let Err(e) = self.store.create(&record).await {
            error!(
                operation = "provision",
                user_id = %user.id,
                error = %e,
                "Error creating the auth data"
            );
            return Err(ServiceError::unavailable());
        }

        info!(provider = identity.provider(), user_id = %user.id, "Provisioned new user");
        Ok(record)
    }

    /// Issue credentials, then persist the new refresh-token digest.
    async fn issue_and_persist(&self, mut record: AuthRecord) -> Result<Credential, ServiceError> {
        let credential = self
            .credentials
            .create_credentials(&record)
            .await
            .map_err(|e| issuance_error("login", &record.user_id, e))?;

        record.refresh_token_hash = Some(hash_refresh_token(&credential.refresh_token));
        if let Err(e) = self.store.update(&record).await {
            error!(
                operation = "login",
                user_id = %record.user_id,
                error = %e,
                "Error while saving refresh token"
            );
            return Err(ServiceError::internal());
        }

        Ok(credential)
    }

    // =========================================================================
    // Validate / Refresh
    // =========================================================================

    /// Resolve an access token to the identity it asserts.
    pub async fn validate(&self, token: &str) -> Result<UserCredential, ServiceError> {
        if token.is_empty() {
            return Err(ServiceError::unauthenticated(INVALID_TOKEN));
        }
        self.credentials
            .validate(token)
            .await
            .map_err(|e| ServiceError::unauthenticated(e.to_string()))
    }

    /// Exchange a refresh token for new credentials. Single use.
    pub async fn refresh_token(&self, raw_refresh_token: &str) -> Result<Credential, ServiceError> {
        if raw_refresh_token.is_empty() {
            return Err(ServiceError::unauthenticated(INVALID_REFRESH_TOKEN));
        }
        let presented_hash = hash_refresh_token(raw_refresh_token);

        let record = match self.store.find_by_refresh_hash(&presented_hash).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => {
                return Err(ServiceError::unauthenticated(INVALID_REFRESH_TOKEN))
            }
            Err(e) => {
                error!(operation = "refresh_token", error = %e, "Auth store is down");
                return Err(ServiceError::internal());
            }
        };

        let next = RefreshToken::generate()
            .map_err(|e| issuance_error("refresh_token", &record.user_id, e))?;

        let rotated = match self
            .store
            .rotate_refresh_token(record.id, &presented_hash, &next.hash)
            .await
        {
            Ok(rotated) => rotated,
            Err(StoreError::Conflict(_)) | Err(StoreError::NotFound(_)) => {
                warn!(user_id = %record.user_id, "Refresh token reused");
                return Err(ServiceError::unauthenticated(INVALID_REFRESH_TOKEN));
            }
            Err(e) => {
                error!(
                    operation = "refresh_token",
                    user_id = %record.user_id,
                    error = %e,
                    "Error while rotating refresh token"
                );
                return Err(ServiceError::internal());
            }
        };

        self.credentials
            .create_credentials_with_refresh(&rotated, next)
            .await
            .map_err(|e| issuance_error("refresh_token", &rotated.user_id, e))
    }

    /// Readiness: the auth store answers.
    pub async fn store_ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Auth store is not ready");
                false
            }
        }
    }
}

fn issuance_error(operation: &'static str, user_id: &str, e: CredentialError) -> ServiceError {
    error!(operation, user_id = %user_id, error = ?e, "Error while creating new token");
    ServiceError::internal()
}
