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

//! Error types for the auth stores.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in an auth store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// User record not found.
    #[error("User not found: {id}")]
    UserNotFound {
        /// User ID that was not found.
        id: Uuid,
    },

    /// Group record not found.
    #[error("Group not found: {id}")]
    GroupNotFound {
        /// Group ID that was not found.
        id: Uuid,
    },

    /// A permission name referenced by a group update is not registered.
    #[error("Permission not found: {name}")]
    PermissionNotFound {
        /// Permission name that was not found.
        name: String,
    },

    /// Another user already owns this email.
    #[error("Email already registered: {email}")]
    EmailTaken {
        /// Conflicting email.
        email: String,
    },

    /// Another group already uses this name.
    #[error("Group already exists: {name}")]
    GroupExists {
        /// Conflicting group name.
        name: String,
    },

    /// Another permission already uses this name.
    #[error("Permission already exists: {name}")]
    PermissionExists {
        /// Conflicting permission name.
        name: String,
    },

    /// Empty or otherwise unusable group/permission name.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Listing parameters out of range.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
