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

//! Group records and their update semantics.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::normalize_name;
use crate::error::StoreError;

/// A named set of permissions shared by its member users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier (UUID v4)
    pub id: Uuid,

    /// Group name (unique)
    pub name: String,

    /// Names of the permissions granted to every member
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Builds a group with no permissions.
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            permissions: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `update`.
    ///
    /// `permissions: None` keeps the current set; `Some(set)` replaces it
    /// wholesale, so `Some(empty)` clears it. Sets are never merged.
    pub fn apply(&mut self, update: GroupUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(permissions) = update.permissions {
            self.permissions = permissions;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a group.
///
/// Deserializes with the same explicit-replace rule: a missing or `null`
/// `permissions` field is `None`, `[]` is an empty replacement set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupUpdate {
    /// New group name (if renaming)
    pub name: Option<String>,
    /// Replacement permission set (if changing)
    pub permissions: Option<BTreeSet<String>>,
}

impl GroupUpdate {
    /// Update that renames the group.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            permissions: None,
        }
    }

    /// Update that replaces the permission set with `permissions`.
    pub fn set_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            permissions: Some(permissions.into_iter().map(Into::into).collect()),
        }
    }

    /// Update that clears every permission.
    pub fn clear_permissions() -> Self {
        Self {
            name: None,
            permissions: Some(BTreeSet::new()),
        }
    }

    /// Applies [`normalize_name`] to the new name and to every permission in
    /// the replacement set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidName` for the first name that is empty or
    /// too long.
    pub fn normalized(self) -> Result<Self, StoreError> {
        let name = self.name.as_deref().map(normalize_name).transpose()?;
        let permissions = self
            .permissions
            .map(|set| set.iter().map(|p| normalize_name(p)).collect::<Result<BTreeSet<_>, _>>())
            .transpose()?;
        Ok(Self { name, permissions })
    }
}
