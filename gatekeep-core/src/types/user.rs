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

//! User account records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account as persisted by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier (UUID v4)
    pub id: Uuid,

    /// Login email (unique, lower-cased)
    pub email: String,

    /// Argon2 password hash in PHC format
    pub password_hash: String,

    /// Inactive users cannot log in or authenticate
    pub is_active: bool,

    /// Administrators may manage users, groups and permissions
    pub is_admin: bool,

    /// IDs of the groups this user belongs to
    #[serde(default)]
    pub groups: BTreeSet<Uuid>,

    /// Timestamp of the last successful login
    pub last_login: Option<DateTime<Utc>>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh record with a generated ID and no group memberships.
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_active: new_user.is_active,
            is_admin: new_user.is_admin,
            groups: BTreeSet::new(),
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `update`; absent fields stay untouched.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(admin) = update.is_admin {
            self.is_admin = admin;
        }
        if let Some(hash) = update.password_hash {
            self.password_hash = hash;
        }
        if let Some(last_login) = update.last_login {
            self.last_login = Some(last_login);
        }
        self.updated_at = Utc::now();
    }
}

/// Fields required to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email (already validated and normalized)
    pub email: String,
    /// Argon2 password hash
    pub password_hash: String,
    /// Initial active status
    pub is_active: bool,
    /// Initial admin status
    pub is_admin: bool,
}

/// Partial update of a user record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    /// New active status (if changing)
    pub is_active: Option<bool>,
    /// New admin status (if changing)
    pub is_admin: Option<bool>,
    /// New password hash (if changing)
    pub password_hash: Option<String>,
    /// New last-login timestamp (if changing)
    pub last_login: Option<DateTime<Utc>>,
}

impl UserUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none()
            && self.is_admin.is_none()
            && self.password_hash.is_none()
            && self.last_login.is_none()
    }
}
