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

//! IAM error types.

use gatekeep_core::StoreError;
use thiserror::Error;

/// IAM-related errors.
#[derive(Error, Debug)]
pub enum IamError {
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token is malformed, forged, expired, or its subject no longer resolves
    #[error("Could not validate credentials")]
    InvalidToken,

    /// Identity is known but lacks the required permissions
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Correct credentials for an account that has been deactivated
    #[error("This account is not active")]
    AccountInactive,

    /// Email already registered
    #[error("A user with this email is already registered")]
    UserAlreadyExists,

    /// Email format is invalid
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password does not satisfy the password policy
    #[error("{0}")]
    WeakPassword(String),

    /// Password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// New password equals the current one
    #[error("You cannot use your current password as your new password")]
    PasswordReuse,

    /// Password hashing operation failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// JWT token generation failed
    #[error("Token generation failed")]
    TokenGenerationFailed,

    /// Signing algorithm not supported by the token codec
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A post-registration hook failed; the user was already persisted
    #[error("Registration hook '{hook}' failed: {reason}")]
    HookFailed {
        /// Name of the failing hook
        hook: String,
        /// Hook-provided failure description
        reason: String,
    },

    /// Underlying store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IamError {
    /// True for failures that mean "caller could not be identified".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, IamError::InvalidCredentials | IamError::InvalidToken)
    }

    /// True for failures that mean "caller was identified but may not proceed".
    pub fn is_forbidden(&self) -> bool {
        matches!(self, IamError::InsufficientPermissions | IamError::AccountInactive)
    }
}
