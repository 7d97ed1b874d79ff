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

//! Identity resolution.
//!
//! Turns a token subject into an [`Identity`] by loading the user and the
//! groups it belongs to. Nothing is cached, so group and membership changes
//! apply to the very next resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use gatekeep_core::{AuthStore, User};
use tracing::debug;
use uuid::Uuid;

use super::error::IamError;
use super::models::Identity;

/// Loads users and their effective permissions from a store.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn AuthStore>,
}

impl IdentityResolver {
    /// Create a resolver over `store`.
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// Resolve a token subject into an active identity.
    ///
    /// # Errors
    ///
    /// Returns `IamError::InvalidToken` if the subject is not a user ID, the
    /// user no longer exists, or the user is inactive. Store failures are
    /// passed through.
    pub async fn resolve(&self, subject: &str) -> Result<Identity, IamError> {
        let Ok(user_id) = Uuid::parse_str(subject) else {
            debug!(subject = %subject, "Token subject is not a user id");
            return Err(IamError::InvalidToken);
        };

        let Some(user) = self.store.get_user(&user_id).await? else {
            debug!(user_id = %user_id, "Token subject no longer exists");
            return Err(IamError::InvalidToken);
        };

        if !user.is_active {
            debug!(user_id = %user_id, "Token subject is inactive");
            return Err(IamError::InvalidToken);
        }

        self.identity_for(user).await
    }

    /// Build the identity of an already-loaded user.
    pub async fn identity_for(&self, user: User) -> Result<Identity, IamError> {
        let groups = self.store.get_groups_for_user(&user.id).await?;

        let mut names = Vec::with_capacity(groups.len());
        let mut permissions = BTreeSet::new();
        for group in groups {
            permissions.extend(group.permissions);
            names.push(group.name);
        }
        names.sort();

        Ok(Identity {
            user,
            groups: names,
            permissions,
        })
    }
}
