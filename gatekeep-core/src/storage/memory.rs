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

//! In-process auth store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::AuthStore;
use crate::error::StoreError;
use crate::types::{
    normalize_name, Group, GroupOrder, GroupUpdate, ListQuery, NameFilter, NewUser, Paginated,
    Permission, PermissionOrder, User, UserFilter, UserOrder, UserUpdate,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    permissions: HashMap<Uuid, Permission>,
}

impl State {
    fn group_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.groups.values().any(|g| g.name == name && Some(g.id) != except)
    }

    fn permission_registered(&self, name: &str) -> bool {
        self.permissions.values().any(|p| p.name == name)
    }
}

/// Auth store kept entirely in memory.
///
/// Cloning shares the underlying state. Intended for tests and for
/// applications that own persistence elsewhere and seed the store at startup.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_groups_for_user(&self, user_id: &Uuid) -> Result<Vec<Group>, StoreError> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(user.groups.iter().filter_map(|id| state.groups.get(id).cloned()).collect())
    }

    async fn get_group(&self, id: &Uuid) -> Result<Option<Group>, StoreError> {
        Ok(self.state.read().await.groups.get(id).cloned())
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        let state = self.state.read().await;
        Ok(state.groups.values().find(|g| g.name == name).cloned())
    }

    async fn get_permission_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Permission>, StoreError> {
        let state = self.state.read().await;
        Ok(state.permissions.values().find(|p| p.name == name).cloned())
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        query: &ListQuery<UserOrder>,
    ) -> Result<Paginated<User>, StoreError> {
        let state = self.state.read().await;
        let users = state.users.values().filter(|u| filter.matches(u)).cloned().collect();
        query.apply(users)
    }

    async fn list_groups(
        &self,
        filter: &NameFilter,
        query: &ListQuery<GroupOrder>,
    ) -> Result<Paginated<Group>, StoreError> {
        let state = self.state.read().await;
        let groups = state.groups.values().filter(|g| filter.matches(&g.name)).cloned().collect();
        query.apply(groups)
    }

    async fn list_permissions(
        &self,
        filter: &NameFilter,
        query: &ListQuery<PermissionOrder>,
    ) -> Result<Paginated<Permission>, StoreError> {
        let state = self.state.read().await;
        let permissions =
            state.permissions.values().filter(|p| filter.matches(&p.name)).cloned().collect();
        query.apply(permissions)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::EmailTaken {
                email: new_user.email,
            });
        }

        let user = User::new(new_user);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(id).ok_or(StoreError::UserNotFound { id: *id })?;
        user.apply(update);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.users.remove(id).map(|_| ()).ok_or(StoreError::UserNotFound { id: *id })
    }

    async fn create_group(&self, name: &str) -> Result<Group, StoreError> {
        let name = normalize_name(name)?;
        let mut state = self.state.write().await;
        if state.group_name_taken(&name, None) {
            return Err(StoreError::GroupExists { name });
        }

        let group = Group::new(name);
        state.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update_group(&self, id: &Uuid, update: GroupUpdate) -> Result<Group, StoreError> {
        let update = update.normalized()?;
        let mut state = self.state.write().await;
        if !state.groups.contains_key(id) {
            return Err(StoreError::GroupNotFound { id: *id });
        }

        if let Some(name) = &update.name {
            if state.group_name_taken(name, Some(*id)) {
                return Err(StoreError::GroupExists { name: name.clone() });
            }
        }
        if let Some(permissions) = &update.permissions {
            if let Some(missing) = permissions.iter().find(|p| !state.permission_registered(p)) {
                return Err(StoreError::PermissionNotFound {
                    name: missing.clone(),
                });
            }
        }

        let group = state.groups.get_mut(id).ok_or(StoreError::GroupNotFound { id: *id })?;
        group.apply(update);
        Ok(group.clone())
    }

    async fn delete_group(&self, id: &Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.groups.remove(id).is_none() {
            return Err(StoreError::GroupNotFound { id: *id });
        }
        for user in state.users.values_mut() {
            user.groups.remove(id);
        }
        Ok(())
    }

    async fn create_permission(&self, name: &str) -> Result<Permission, StoreError> {
        let name = normalize_name(name)?;
        let mut state = self.state.write().await;
        if state.permission_registered(&name) {
            return Err(StoreError::PermissionExists { name });
        }

        let permission = Permission::new(name);
        state.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn add_user_to_group(
        &self,
        user_id: &Uuid,
        group_id: &Uuid,
    ) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(group_id) {
            return Err(StoreError::GroupNotFound { id: *group_id });
        }

        let user =
            state.users.get_mut(user_id).ok_or(StoreError::UserNotFound { id: *user_id })?;
        if user.groups.insert(*group_id) {
            user.apply(UserUpdate::default());
        }
        Ok(user.clone())
    }

    async fn remove_user_from_group(
        &self,
        user_id: &Uuid,
        group_id: &Uuid,
    ) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        let user =
            state.users.get_mut(user_id).ok_or(StoreError::UserNotFound { id: *user_id })?;
        if user.groups.remove(group_id) {
            user.apply(UserUpdate::default());
        }
        Ok(user.clone())
    }
}
