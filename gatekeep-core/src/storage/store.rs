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

//! The store interface consumed by the auth engine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{
    Group, GroupOrder, GroupUpdate, ListQuery, NameFilter, NewUser, Paginated, Permission,
    PermissionOrder, User, UserFilter, UserOrder, UserUpdate,
};

/// Persistence for users, groups and permissions.
///
/// Implementations must reflect every completed write in subsequent reads;
/// the engine keeps no cache of its own on top of this trait.
#[async_trait]
pub trait AuthStore: Send + Sync {
    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Looks up a user by ID.
    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError>;

    /// Looks up a user by (normalized) email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Returns every group the user belongs to, each with its permission set.
    ///
    /// Returns an empty list for unknown users.
    async fn get_groups_for_user(&self, user_id: &Uuid) -> Result<Vec<Group>, StoreError>;

    /// Looks up a group by ID.
    async fn get_group(&self, id: &Uuid) -> Result<Option<Group>, StoreError>;

    /// Looks up a group by name.
    async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError>;

    /// Looks up a registered permission by name.
    async fn get_permission_by_name(&self, name: &str)
        -> Result<Option<Permission>, StoreError>;

    /// Lists users matching `filter`.
    async fn list_users(
        &self,
        filter: &UserFilter,
        query: &ListQuery<UserOrder>,
    ) -> Result<Paginated<User>, StoreError>;

    /// Lists groups matching `filter`.
    async fn list_groups(
        &self,
        filter: &NameFilter,
        query: &ListQuery<GroupOrder>,
    ) -> Result<Paginated<Group>, StoreError>;

    /// Lists registered permissions matching `filter`.
    async fn list_permissions(
        &self,
        filter: &NameFilter,
        query: &ListQuery<PermissionOrder>,
    ) -> Result<Paginated<Permission>, StoreError>;

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Persists a new user.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if another user has the same email
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Applies a partial update to a user.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't exist
    async fn update_user(&self, id: &Uuid, update: UserUpdate) -> Result<User, StoreError>;

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't exist
    async fn delete_user(&self, id: &Uuid) -> Result<(), StoreError>;

    /// Creates an empty group.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name is empty or too long
    /// - `GroupExists` if the name is taken
    async fn create_group(&self, name: &str) -> Result<Group, StoreError>;

    /// Updates a group.
    ///
    /// A present `permissions` set replaces the stored one wholesale (an empty
    /// set clears it); an absent one leaves it untouched.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` if the group doesn't exist
    /// - `GroupExists` if renaming onto a taken name
    /// - `PermissionNotFound` if the replacement set names an unregistered permission
    async fn update_group(&self, id: &Uuid, update: GroupUpdate) -> Result<Group, StoreError>;

    /// Deletes a group and drops it from every member's group set.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` if the group doesn't exist
    async fn delete_group(&self, id: &Uuid) -> Result<(), StoreError>;

    /// Registers a permission name.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name is empty or too long
    /// - `PermissionExists` if the name is taken
    async fn create_permission(&self, name: &str) -> Result<Permission, StoreError>;

    /// Adds a user to a group. Adding an existing member is a no-op.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `GroupNotFound` if either side doesn't exist
    async fn add_user_to_group(&self, user_id: &Uuid, group_id: &Uuid)
        -> Result<User, StoreError>;

    /// Removes a user from a group. Removing a non-member is a no-op.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't exist
    async fn remove_user_from_group(
        &self,
        user_id: &Uuid,
        group_id: &Uuid,
    ) -> Result<User, StoreError>;
}
