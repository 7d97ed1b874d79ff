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

//! IAM request and response models.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use gatekeep_core::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user together with the permissions granted through
/// group membership at resolution time.
#[derive(Debug, Clone)]
pub struct Identity {
    /// The resolved account
    pub user: User,
    /// Names of the groups the user belongs to
    pub groups: Vec<String>,
    /// Union of the permission sets of those groups
    pub permissions: BTreeSet<String>,
}

impl Identity {
    /// Check whether a single permission is held.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// User response (sensitive fields filtered out).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// Unique user identifier (UUID v4)
    pub id: Uuid,

    /// Lower-cased email address
    pub email: String,

    /// Active status (disabled users cannot login)
    pub is_active: bool,

    /// Administrative flag
    pub is_admin: bool,

    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email to authenticate
    pub email: String,
    /// Plain text password
    pub password: String,
}

/// Login response with access token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Signed access token
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// Self-service registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Administrative account creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
}

fn default_true() -> bool {
    true
}

/// Password change request for an authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub password: String,
    pub password_confirm: String,
}
