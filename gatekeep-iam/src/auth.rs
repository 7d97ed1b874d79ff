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

//! Authentication service.
//!
//! [`AuthService`] ties the store, password hasher, token codec, identity
//! resolver and registration hooks together into the account operations an
//! application exposes: registration, login, token authentication,
//! permission-gated authorization and password changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatekeep_core::{AuthStore, NewUser, StoreError, User, UserUpdate};
use tracing::{debug, info};

use super::config::AuthSettings;
use super::error::IamError;
use super::hooks::RegistrationHooks;
use super::jwt::TokenCodec;
use super::models::{
    ChangePassword, Identity, LoginRequest, LoginResponse, NewAccount, Registration, UserResponse,
};
use super::password::PasswordHasher;
use super::permissions::PermissionCheck;
use super::resolver::IdentityResolver;
use super::validation::{normalize_email, PasswordPolicy};

/// Authentication service that combines the store, password hashing and
/// token management.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AuthStore>,
    codec: TokenCodec,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    resolver: IdentityResolver,
    hooks: RegistrationHooks,
}

impl AuthService {
    /// Create new authentication service.
    ///
    /// # Arguments
    ///
    /// * `store` - Store for users, groups and permissions
    /// * `codec` - Token codec for issuing and validating access tokens
    pub fn new(store: Arc<dyn AuthStore>, codec: TokenCodec) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone()),
            store,
            codec,
            hasher: PasswordHasher::new(),
            policy: PasswordPolicy::default(),
            hooks: RegistrationHooks::new(),
        }
    }

    /// Create a service whose token codec and password policy are built from
    /// `settings`.
    ///
    /// # Errors
    ///
    /// Returns the codec or policy construction error for unusable settings.
    pub fn from_settings(store: Arc<dyn AuthStore>, settings: &AuthSettings) -> Result<Self, IamError> {
        let policy = PasswordPolicy::from_settings(&settings.password)?;
        Ok(Self::new(store, TokenCodec::from_settings(settings)?).with_policy(policy))
    }

    /// Attach the registration hooks run after every self-service registration.
    pub fn with_hooks(mut self, hooks: RegistrationHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the password hasher.
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Replace the password policy.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn hooks(&self) -> &RegistrationHooks {
        &self.hooks
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Register a new active, non-admin account and run the registration hooks.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail`, `WeakPassword` or `PasswordMismatch` for bad input
    /// - `UserAlreadyExists` if the email is taken
    /// - `HookFailed` if a hook fails; the account stays persisted
    pub async fn register(&self, registration: Registration) -> Result<User, IamError> {
        let account = NewAccount {
            email: registration.email,
            password: registration.password,
            password_confirm: registration.password_confirm,
            is_active: true,
            is_admin: false,
        };
        let user = create_account(self.store.as_ref(), &self.hasher, &self.policy, account).await?;
        info!(user_id = %user.id, email = %user.email, "Registered user");

        self.hooks.run(self.store.as_ref(), &user).await?;
        Ok(user)
    }

    /// Create an account on behalf of an administrator. Hooks are not run.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`AuthService::register`].
    pub async fn create_user(&self, account: NewAccount) -> Result<User, IamError> {
        let user = create_account(self.store.as_ref(), &self.hasher, &self.policy, account).await?;
        info!(user_id = %user.id, email = %user.email, is_admin = user.is_admin, "Created user");
        Ok(user)
    }

    /// Verify an email and password pair.
    ///
    /// Unknown emails and wrong passwords fail identically, and both cost one
    /// password verification.
    ///
    /// # Errors
    ///
    /// Returns `IamError::InvalidCredentials` if the pair does not match.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> Result<User, IamError> {
        let user = match normalize_email(email) {
            Ok(email) => self.store.get_user_by_email(&email).await?,
            Err(_) => None,
        };

        match user {
            Some(user) if self.hasher.verify(password, &user.password_hash) => Ok(user),
            Some(user) => {
                debug!(user_id = %user.id, "Password verification failed");
                Err(IamError::InvalidCredentials)
            }
            None => {
                self.hasher.verify_decoy(password);
                debug!("Login attempt for unknown email");
                Err(IamError::InvalidCredentials)
            }
        }
    }

    /// Authenticate user with email and password and issue an access token.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if email or password is incorrect
    /// - `AccountInactive` if the credentials are right but the account is disabled
    /// - `TokenGenerationFailed` if signing fails
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, IamError> {
        self.login_at(request, Utc::now()).await
    }

    /// [`AuthService::login`] with an explicit clock.
    pub async fn login_at(
        &self,
        request: LoginRequest,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, IamError> {
        let user = self.authenticate_user(&request.email, &request.password).await?;
        if !user.is_active {
            debug!(user_id = %user.id, "Login refused for inactive account");
            return Err(IamError::AccountInactive);
        }

        let access_token = self.codec.issue(&user.id.to_string(), now)?;
        self.store
            .update_user(
                &user.id,
                UserUpdate {
                    last_login: Some(now),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_at: self.codec.expires_at(now),
        })
    }

    /// Validate an access token and resolve its identity.
    ///
    /// # Errors
    ///
    /// Returns `IamError::InvalidToken` if the token is bad or expired, or its
    /// subject is missing or inactive.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, IamError> {
        self.authenticate_at(token, Utc::now()).await
    }

    /// [`AuthService::authenticate`] with an explicit clock.
    pub async fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, IamError> {
        let claims = self.codec.decode(token, now)?;
        self.resolver.resolve(&claims.sub).await
    }

    /// Authenticate a token and require `check` to pass.
    ///
    /// # Errors
    ///
    /// Authentication errors as in [`AuthService::authenticate`], then
    /// `IamError::InsufficientPermissions` if the check denies.
    pub async fn authorize(&self, token: &str, check: &PermissionCheck) -> Result<Identity, IamError> {
        let identity = self.authenticate(token).await?;
        check.enforce(&identity)?;
        Ok(identity)
    }

    /// The public view of the token's user.
    pub async fn whoami(&self, token: &str) -> Result<UserResponse, IamError> {
        let identity = self.authenticate(token).await?;
        Ok(UserResponse::from(identity.user))
    }

    /// Change the password of an authenticated user.
    ///
    /// # Errors
    ///
    /// - `WeakPassword` or `PasswordMismatch` for a bad new password
    /// - `PasswordReuse` if the new password equals the current one
    /// - `InvalidCredentials` if the current password does not verify
    pub async fn change_password(
        &self,
        identity: &Identity,
        request: ChangePassword,
    ) -> Result<User, IamError> {
        self.policy.check_with_confirmation(&request.password, &request.password_confirm)?;
        if request.password == request.current_password {
            return Err(IamError::PasswordReuse);
        }

        let user = self
            .store
            .get_user(&identity.user.id)
            .await?
            .ok_or(IamError::InvalidToken)?;
        if !self.hasher.verify(&request.current_password, &user.password_hash) {
            debug!(user_id = %user.id, "Current password did not verify");
            return Err(IamError::InvalidCredentials);
        }

        let password_hash = self.hasher.hash_password(&request.password)?;
        let user = self
            .store
            .update_user(
                &user.id,
                UserUpdate {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user.id, "Password changed");
        Ok(user)
    }
}

/// Validate and persist a new account without running registration hooks.
///
/// This is the account creation path shared by [`AuthService`] and tools that
/// hold a store but no token codec.
///
/// # Errors
///
/// - `InvalidEmail`, `WeakPassword` or `PasswordMismatch` for bad input
/// - `UserAlreadyExists` if the email is taken, including by a concurrent create
pub async fn create_account(
    store: &dyn AuthStore,
    hasher: &PasswordHasher,
    policy: &PasswordPolicy,
    account: NewAccount,
) -> Result<User, IamError> {
    let email = normalize_email(&account.email)?;
    policy.check_with_confirmation(&account.password, &account.password_confirm)?;

    if store.get_user_by_email(&email).await?.is_some() {
        return Err(IamError::UserAlreadyExists);
    }

    let password_hash = hasher.hash_password(&account.password)?;
    let new_user = NewUser {
        email,
        password_hash,
        is_active: account.is_active,
        is_admin: account.is_admin,
    };

    match store.create_user(new_user).await {
        Ok(user) => Ok(user),
        Err(StoreError::EmailTaken { .. }) => Err(IamError::UserAlreadyExists),
        Err(e) => Err(e.into()),
    }
}
