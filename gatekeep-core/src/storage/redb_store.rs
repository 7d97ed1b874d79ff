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

//! Auth store persisted in a redb database file.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{
    Database, ReadTransaction, ReadableTable, Table, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::store::AuthStore;
use crate::error::StoreError;
use crate::types::{
    normalize_name, Group, GroupOrder, GroupUpdate, ListQuery, NameFilter, NewUser, Paginated,
    Permission, PermissionOrder, User, UserFilter, UserOrder, UserUpdate,
};

// Records are JSON, keyed by UUID string.
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const GROUPS: TableDefinition<&str, &[u8]> = TableDefinition::new("groups");
const PERMISSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("permissions");

// Unique-name indexes: name -> UUID string.
const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");
const GROUP_NAMES: TableDefinition<&str, &str> = TableDefinition::new("group_names");
const PERMISSION_NAMES: TableDefinition<&str, &str> = TableDefinition::new("permission_names");

type RecordTable<'txn> = Table<'txn, &'static str, &'static [u8]>;

fn db_err(err: impl std::fmt::Display) -> StoreError {
    StoreError::Database(err.to_string())
}

fn load<T, R>(table: &R, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key).map_err(db_err)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn load_all<T, R>(table: &R) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::new();
    for item in table.iter().map_err(db_err)? {
        let (_, value) = item.map_err(db_err)?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

fn lookup<R>(index: &R, name: &str) -> Result<Option<String>, StoreError>
where
    R: ReadableTable<&'static str, &'static str>,
{
    Ok(index.get(name).map_err(db_err)?.map(|id| id.value().to_string()))
}

fn put<T: Serialize>(table: &mut RecordTable<'_>, key: &str, record: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(record)?;
    table.insert(key, bytes.as_slice()).map_err(db_err)?;
    Ok(())
}

/// Auth store backed by a single redb file.
///
/// Every operation runs in its own redb transaction on the blocking pool,
/// so uniqueness checks and the writes they guard commit atomically.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Creates or opens a store.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the redb database file
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(db_path).map_err(db_err)?;

        // redb creates tables lazily inside a write transaction
        let write_txn = db.begin_write().map_err(db_err)?;
        {
            write_txn.open_table(USERS).map_err(db_err)?;
            write_txn.open_table(GROUPS).map_err(db_err)?;
            write_txn.open_table(PERMISSIONS).map_err(db_err)?;
            write_txn.open_table(USER_EMAILS).map_err(db_err)?;
            write_txn.open_table(GROUP_NAMES).map_err(db_err)?;
            write_txn.open_table(PERMISSION_NAMES).map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;

        debug!(path = %db_path.display(), "Opened redb auth store");

        Ok(Self { db: Arc::new(db) })
    }

    async fn read<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&ReadTransaction) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(db_err)?;
            op(&txn)
        })
        .await
        .map_err(db_err)?
    }

    /// Runs `op` in a write transaction, committing only if it succeeds.
    async fn write<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&WriteTransaction) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(db_err)?;
            let value = op(&txn)?;
            txn.commit().map_err(db_err)?;
            Ok(value)
        })
        .await
        .map_err(db_err)?
    }
}

#[async_trait]
impl AuthStore for RedbStore {
    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        let key = id.to_string();
        self.read(move |txn| {
            let users = txn.open_table(USERS).map_err(db_err)?;
            load(&users, &key)
        })
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_string();
        self.read(move |txn| {
            let emails = txn.open_table(USER_EMAILS).map_err(db_err)?;
            let Some(id) = lookup(&emails, &email)? else {
                return Ok(None);
            };
            let users = txn.open_table(USERS).map_err(db_err)?;
            load(&users, &id)
        })
        .await
    }

    async fn get_groups_for_user(&self, user_id: &Uuid) -> Result<Vec<Group>, StoreError> {
        let key = user_id.to_string();
        self.read(move |txn| {
            let users = txn.open_table(USERS).map_err(db_err)?;
            let Some(user) = load::<User, _>(&users, &key)? else {
                return Ok(Vec::new());
            };

            let groups = txn.open_table(GROUPS).map_err(db_err)?;
            let mut result = Vec::with_capacity(user.groups.len());
            for group_id in &user.groups {
                if let Some(group) = load(&groups, &group_id.to_string())? {
                    result.push(group);
                }
            }
            Ok(result)
        })
        .await
    }

    async fn get_group(&self, id: &Uuid) -> Result<Option<Group>, StoreError> {
        let key = id.to_string();
        self.read(move |txn| {
            let groups = txn.open_table(GROUPS).map_err(db_err)?;
            load(&groups, &key)
        })
        .await
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        let name = name.to_string();
        self.read(move |txn| {
            let names = txn.open_table(GROUP_NAMES).map_err(db_err)?;
            let Some(id) = lookup(&names, &name)? else {
                return Ok(None);
            };
            let groups = txn.open_table(GROUPS).map_err(db_err)?;
            load(&groups, &id)
        })
        .await
    }

    async fn get_permission_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Permission>, StoreError> {
        let name = name.to_string();
        self.read(move |txn| {
            let names = txn.open_table(PERMISSION_NAMES).map_err(db_err)?;
            let Some(id) = lookup(&names, &name)? else {
                return Ok(None);
            };
            let permissions = txn.open_table(PERMISSIONS).map_err(db_err)?;
            load(&permissions, &id)
        })
        .await
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        query: &ListQuery<UserOrder>,
    ) -> Result<Paginated<User>, StoreError> {
        let (filter, query) = (*filter, *query);
        self.read(move |txn| {
            let users = txn.open_table(USERS).map_err(db_err)?;
            let mut all: Vec<User> = load_all(&users)?;
            all.retain(|u| filter.matches(u));
            query.apply(all)
        })
        .await
    }

    async fn list_groups(
        &self,
        filter: &NameFilter,
        query: &ListQuery<GroupOrder>,
    ) -> Result<Paginated<Group>, StoreError> {
        let (filter, query) = (filter.clone(), *query);
        self.read(move |txn| {
            let groups = txn.open_table(GROUPS).map_err(db_err)?;
            let mut all: Vec<Group> = load_all(&groups)?;
            all.retain(|g| filter.matches(&g.name));
            query.apply(all)
        })
        .await
    }

    async fn list_permissions(
        &self,
        filter: &NameFilter,
        query: &ListQuery<PermissionOrder>,
    ) -> Result<Paginated<Permission>, StoreError> {
        let (filter, query) = (filter.clone(), *query);
        self.read(move |txn| {
            let permissions = txn.open_table(PERMISSIONS).map_err(db_err)?;
            let mut all: Vec<Permission> = load_all(&permissions)?;
            all.retain(|p| filter.matches(&p.name));
            query.apply(all)
        })
        .await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.write(move |txn| {
            let mut emails = txn.open_table(USER_EMAILS).map_err(db_err)?;
            if emails.get(new_user.email.as_str()).map_err(db_err)?.is_some() {
                return Err(StoreError::EmailTaken {
                    email: new_user.email,
                });
            }

            let user = User::new(new_user);
            let key = user.id.to_string();

            let mut users = txn.open_table(USERS).map_err(db_err)?;
            put(&mut users, &key, &user)?;
            emails.insert(user.email.as_str(), key.as_str()).map_err(db_err)?;

            Ok(user)
        })
        .await
    }

    async fn update_user(&self, id: &Uuid, update: UserUpdate) -> Result<User, StoreError> {
        let id = *id;
        self.write(move |txn| {
            let key = id.to_string();
            let mut users = txn.open_table(USERS).map_err(db_err)?;
            let mut user: User = load(&users, &key)?.ok_or(StoreError::UserNotFound { id })?;

            user.apply(update);
            put(&mut users, &key, &user)?;
            Ok(user)
        })
        .await
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), StoreError> {
        let id = *id;
        self.write(move |txn| {
            let key = id.to_string();
            let mut users = txn.open_table(USERS).map_err(db_err)?;
            let user: User = load(&users, &key)?.ok_or(StoreError::UserNotFound { id })?;

            users.remove(key.as_str()).map_err(db_err)?;
            let mut emails = txn.open_table(USER_EMAILS).map_err(db_err)?;
            emails.remove(user.email.as_str()).map_err(db_err)?;
            Ok(())
        })
        .await
    }

    async fn create_group(&self, name: &str) -> Result<Group, StoreError> {
        let name = normalize_name(name)?;
        self.write(move |txn| {
            let mut names = txn.open_table(GROUP_NAMES).map_err(db_err)?;
            if names.get(name.as_str()).map_err(db_err)?.is_some() {
                return Err(StoreError::GroupExists { name });
            }

            let group = Group::new(name);
            let key = group.id.to_string();

            let mut groups = txn.open_table(GROUPS).map_err(db_err)?;
            put(&mut groups, &key, &group)?;
            names.insert(group.name.as_str(), key.as_str()).map_err(db_err)?;

            Ok(group)
        })
        .await
    }

    async fn update_group(&self, id: &Uuid, update: GroupUpdate) -> Result<Group, StoreError> {
        let id = *id;
        let update = update.normalized()?;

        self.write(move |txn| {
            let key = id.to_string();
            let mut groups = txn.open_table(GROUPS).map_err(db_err)?;
            let mut group: Group = load(&groups, &key)?.ok_or(StoreError::GroupNotFound { id })?;

            let mut names = txn.open_table(GROUP_NAMES).map_err(db_err)?;
            let rename = update.name.clone().filter(|name| *name != group.name);
            if let Some(name) = &rename {
                if lookup(&names, name)?.is_some() {
                    return Err(StoreError::GroupExists { name: name.clone() });
                }
            }

            if let Some(permissions) = &update.permissions {
                let registry = txn.open_table(PERMISSION_NAMES).map_err(db_err)?;
                for permission in permissions {
                    if registry.get(permission.as_str()).map_err(db_err)?.is_none() {
                        return Err(StoreError::PermissionNotFound {
                            name: permission.clone(),
                        });
                    }
                }
            }

            let old_name = group.name.clone();
            group.apply(update);

            if let Some(name) = rename {
                names.remove(old_name.as_str()).map_err(db_err)?;
                names.insert(name.as_str(), key.as_str()).map_err(db_err)?;
            }
            put(&mut groups, &key, &group)?;

            Ok(group)
        })
        .await
    }

    async fn delete_group(&self, id: &Uuid) -> Result<(), StoreError> {
        let id = *id;
        self.write(move |txn| {
            let key = id.to_string();
            let mut groups = txn.open_table(GROUPS).map_err(db_err)?;
            let group: Group = load(&groups, &key)?.ok_or(StoreError::GroupNotFound { id })?;

            groups.remove(key.as_str()).map_err(db_err)?;
            let mut names = txn.open_table(GROUP_NAMES).map_err(db_err)?;
            names.remove(group.name.as_str()).map_err(db_err)?;

            let mut users = txn.open_table(USERS).map_err(db_err)?;
            let members: Vec<User> = load_all(&users)?;
            for mut user in members.into_iter().filter(|u| u.groups.contains(&id)) {
                user.groups.remove(&id);
                user.apply(UserUpdate::default());
                put(&mut users, &user.id.to_string(), &user)?;
            }

            Ok(())
        })
        .await
    }

    async fn create_permission(&self, name: &str) -> Result<Permission, StoreError> {
        let name = normalize_name(name)?;
        self.write(move |txn| {
            let mut names = txn.open_table(PERMISSION_NAMES).map_err(db_err)?;
            if names.get(name.as_str()).map_err(db_err)?.is_some() {
                return Err(StoreError::PermissionExists { name });
            }

            let permission = Permission::new(name);
            let key = permission.id.to_string();

            let mut permissions = txn.open_table(PERMISSIONS).map_err(db_err)?;
            put(&mut permissions, &key, &permission)?;
            names.insert(permission.name.as_str(), key.as_str()).map_err(db_err)?;

            Ok(permission)
        })
        .await
    }

    async fn add_user_to_group(
        &self,
        user_id: &Uuid,
        group_id: &Uuid,
    ) -> Result<User, StoreError> {
        let (user_id, group_id) = (*user_id, *group_id);
        self.write(move |txn| {
            let groups = txn.open_table(GROUPS).map_err(db_err)?;
            if groups.get(group_id.to_string().as_str()).map_err(db_err)?.is_none() {
                return Err(StoreError::GroupNotFound { id: group_id });
            }

            let key = user_id.to_string();
            let mut users = txn.open_table(USERS).map_err(db_err)?;
            let mut user: User =
                load(&users, &key)?.ok_or(StoreError::UserNotFound { id: user_id })?;

            if user.groups.insert(group_id) {
                user.apply(UserUpdate::default());
                put(&mut users, &key, &user)?;
            }
            Ok(user)
        })
        .await
    }

    async fn remove_user_from_group(
        &self,
        user_id: &Uuid,
        group_id: &Uuid,
    ) -> Result<User, StoreError> {
        let (user_id, group_id) = (*user_id, *group_id);
        self.write(move |txn| {
            let key = user_id.to_string();
            let mut users = txn.open_table(USERS).map_err(db_err)?;
            let mut user: User =
                load(&users, &key)?.ok_or(StoreError::UserNotFound { id: user_id })?;

            if user.groups.remove(&group_id) {
                user.apply(UserUpdate::default());
                put(&mut users, &key, &user)?;
            }
            Ok(user)
        })
        .await
    }
}
