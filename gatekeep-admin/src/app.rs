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

//! Administrative command execution.
//!
//! Each subcommand maps to one method on [`App`]. Methods return the records
//! they touched; [`App::run`] renders them as the text printed by the binary.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use gatekeep_core::{
    AuthStore, Group, GroupUpdate, ListQuery, OrderDirection, Paginated, Permission, User,
    UserFilter, UserOrder, UserUpdate,
};
use gatekeep_iam::validation::normalize_email;
use gatekeep_iam::{create_account, NewAccount, PasswordHasher, PasswordPolicy};
use tracing::info;

use crate::cli::{toggle, Command};

/// Timestamp format used in command output.
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Administrative operations over a store.
#[derive(Clone)]
pub struct App {
    store: Arc<dyn AuthStore>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
}

impl App {
    /// Creates an app over `store` with default hashing and password policy.
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            policy: PasswordPolicy::default(),
        }
    }

    /// Replaces the password hasher.
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Replaces the password policy applied by `newuser`.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    /// Executes `command` and returns the text to print.
    ///
    /// `prompt_password` is called only by `newuser` and yields the password
    /// and its confirmation.
    pub async fn run<F>(&self, command: Command, prompt_password: F) -> Result<String>
    where
        F: FnOnce() -> Result<(String, String)>,
    {
        match command {
            Command::NewUser {
                email,
                admin,
                inactive,
            } => {
                let (password, confirm) = prompt_password()?;
                let user = self.new_user(&email, &password, &confirm, admin, !inactive).await?;
                Ok(format!("User created successfully: {}", format_user(&user)))
            }
            Command::EditUser {
                email,
                admin,
                no_admin,
                active,
                no_active,
            } => {
                let update = UserUpdate {
                    is_admin: toggle(admin, no_admin),
                    is_active: toggle(active, no_active),
                    ..Default::default()
                };
                if update.is_empty() {
                    return Ok(format!("No changes requested for {}", email.trim()));
                }
                let user = self.edit_user(&email, update).await?;
                Ok(format!("User updated successfully: {}", format_user(&user)))
            }
            Command::NewPermission { name } => {
                let permission = self.new_permission(&name).await?;
                Ok(format!("Permission created: {}", permission.name))
            }
            Command::NewGroup { name } => {
                let group = self.new_group(&name).await?;
                Ok(format!("Group created: {}", format_group(&group)))
            }
            Command::SetPermissions {
                group,
                permissions,
                clear,
            } => {
                if permissions.is_empty() && !clear {
                    bail!("pass one or more permissions, or --clear to remove them all");
                }
                let group = self.set_permissions(&group, permissions).await?;
                Ok(format!("Group updated: {}", format_group(&group)))
            }
            Command::AddMember { email, group } => {
                let (user, group) = self.add_member(&email, &group).await?;
                Ok(format!("Added {} to {}", user.email, group.name))
            }
            Command::RemoveMember { email, group } => {
                let (user, group) = self.remove_member(&email, &group).await?;
                Ok(format!("Removed {} from {}", user.email, group.name))
            }
            Command::Users {
                active,
                inactive,
                admins,
                limit,
                offset,
                order_by,
                desc,
            } => {
                let filter = UserFilter {
                    is_active: toggle(active, inactive),
                    is_admin: admins.then_some(true),
                };
                let direction = if desc {
                    OrderDirection::Desc
                } else {
                    OrderDirection::Asc
                };
                let query = ListQuery::default()
                    .page(limit, offset)
                    .ordered(UserOrder::from(order_by), direction);
                let page = self.list_users(&filter, &query).await?;
                Ok(format_user_page(&page))
            }
        }
    }

    /// Creates a user after validating the email and password.
    pub async fn new_user(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
        is_admin: bool,
        is_active: bool,
    ) -> Result<User> {
        let account = NewAccount {
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: password_confirm.to_string(),
            is_active,
            is_admin,
        };
        let user = create_account(self.store.as_ref(), &self.hasher, &self.policy, account).await?;
        info!(user_id = %user.id, email = %user.email, is_admin, is_active, "Created user");
        Ok(user)
    }

    /// Applies flag changes to an existing user.
    pub async fn edit_user(&self, email: &str, update: UserUpdate) -> Result<User> {
        let user = self.find_user(email).await?;
        let user = self.store.update_user(&user.id, update).await?;
        info!(user_id = %user.id, is_admin = user.is_admin, is_active = user.is_active, "Updated user");
        Ok(user)
    }

    pub async fn new_permission(&self, name: &str) -> Result<Permission> {
        let permission = self.store.create_permission(name).await?;
        info!(permission = %permission.name, "Created permission");
        Ok(permission)
    }

    pub async fn new_group(&self, name: &str) -> Result<Group> {
        let group = self.store.create_group(name).await?;
        info!(group = %group.name, "Created group");
        Ok(group)
    }

    /// Replaces the whole permission set of `group`; an empty list clears it.
    pub async fn set_permissions(&self, group: &str, permissions: Vec<String>) -> Result<Group> {
        let group = self.find_group(group).await?;
        let group = self
            .store
            .update_group(&group.id, GroupUpdate::set_permissions(permissions))
            .await?;
        info!(group = %group.name, permissions = ?group.permissions, "Replaced group permissions");
        Ok(group)
    }

    pub async fn add_member(&self, email: &str, group: &str) -> Result<(User, Group)> {
        let user = self.find_user(email).await?;
        let group = self.find_group(group).await?;
        let user = self.store.add_user_to_group(&user.id, &group.id).await?;
        info!(user_id = %user.id, group = %group.name, "Added group member");
        Ok((user, group))
    }

    pub async fn remove_member(&self, email: &str, group: &str) -> Result<(User, Group)> {
        let user = self.find_user(email).await?;
        let group = self.find_group(group).await?;
        let user = self.store.remove_user_from_group(&user.id, &group.id).await?;
        info!(user_id = %user.id, group = %group.name, "Removed group member");
        Ok((user, group))
    }

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        query: &ListQuery<UserOrder>,
    ) -> Result<Paginated<User>> {
        Ok(self.store.list_users(filter, query).await?)
    }

    async fn find_user(&self, email: &str) -> Result<User> {
        let email = normalize_email(email)?;
        self.store
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| anyhow!("A user with this email does not exist: {}", email))
    }

    async fn find_group(&self, name: &str) -> Result<Group> {
        let name = name.trim();
        self.store
            .get_group_by_name(name)
            .await
            .with_context(|| format!("failed to look up group {}", name))?
            .ok_or_else(|| anyhow!("Group does not exist: {}", name))
    }
}

/// One-line description of a user.
pub fn format_user(user: &User) -> String {
    let last_login = user
        .last_login
        .map(|t| t.format(DATETIME_FMT).to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "{} <{}> active={} admin={} groups={} last_login={} created={}",
        user.id,
        user.email,
        user.is_active,
        user.is_admin,
        user.groups.len(),
        last_login,
        user.created_at.format(DATETIME_FMT)
    )
}

/// One-line description of a group.
pub fn format_group(group: &Group) -> String {
    let permissions: Vec<&str> = group.permissions.iter().map(String::as_str).collect();
    format!("{} [{}]", group.name, permissions.join(", "))
}

fn format_user_page(page: &Paginated<User>) -> String {
    let mut out = format!("Showing {} of {} users", page.items.len(), page.total);
    for user in &page.items {
        out.push('\n');
        out.push_str(&format_user(user));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::UserSort;
    use gatekeep_core::{MemoryStore, StoreError};
    use gatekeep_iam::IamError;

    const PASSWORD: &str = "Abcdef123!";

    fn app() -> App {
        App::new(Arc::new(MemoryStore::new()))
            .with_hasher(PasswordHasher::with_params(8, 1, 1).unwrap())
    }

    fn password() -> Result<(String, String)> {
        Ok((PASSWORD.to_string(), PASSWORD.to_string()))
    }

    fn no_prompt() -> Result<(String, String)> {
        panic!("password prompt not expected")
    }

    #[tokio::test]
    async fn test_newuser() {
        let app = app();
        let out = app
            .run(
                Command::NewUser {
                    email: "Ada@Example.com".to_string(),
                    admin: true,
                    inactive: false,
                },
                password,
            )
            .await
            .unwrap();
        assert!(out.starts_with("User created successfully:"));
        assert!(out.contains("<ada@example.com>"));

        let user = app.store().get_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert!(user.is_admin);
        assert!(user.is_active);
        assert!(PasswordHasher::new().verify(PASSWORD, &user.password_hash));
    }

    #[tokio::test]
    async fn test_newuser_validation() {
        let app = app();
        app.new_user("ada@example.com", PASSWORD, PASSWORD, false, false).await.unwrap();

        let err = app.new_user("ada@example.com", PASSWORD, PASSWORD, false, true).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<IamError>(), Some(IamError::UserAlreadyExists)));

        let err = app.new_user("bob@example.com", PASSWORD, "Other123!", false, true).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<IamError>(), Some(IamError::PasswordMismatch)));

        let err = app.new_user("bob@example.com", "short", "short", false, true).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<IamError>(), Some(IamError::WeakPassword(_))));

        let err = app.new_user("bob", PASSWORD, PASSWORD, false, true).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<IamError>(), Some(IamError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_newuser_custom_policy() {
        let policy = PasswordPolicy::default()
            .with_length(12, 64)
            .unwrap()
            .with_rules(["^[a-z ]+$"])
            .unwrap()
            .with_help("Use a passphrase of lowercase words");
        let app = app().with_policy(policy);

        let err = app.new_user("ada@example.com", PASSWORD, PASSWORD, false, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Use a passphrase of lowercase words");

        let phrase = "correct horse battery";
        let user = app.new_user("ada@example.com", phrase, phrase, false, true).await.unwrap();
        assert!(PasswordHasher::new().verify(phrase, &user.password_hash));
    }

    #[tokio::test]
    async fn test_edituser() {
        let app = app();
        app.new_user("ada@example.com", PASSWORD, PASSWORD, false, true).await.unwrap();

        let out = app
            .run(
                Command::EditUser {
                    email: "ada@example.com".to_string(),
                    admin: true,
                    no_admin: false,
                    active: false,
                    no_active: true,
                },
                no_prompt,
            )
            .await
            .unwrap();
        assert!(out.contains("active=false admin=true"));

        let out = app
            .run(
                Command::EditUser {
                    email: "ada@example.com".to_string(),
                    admin: false,
                    no_admin: false,
                    active: false,
                    no_active: false,
                },
                no_prompt,
            )
            .await
            .unwrap();
        assert!(out.starts_with("No changes requested"));

        let err = app
            .edit_user("ghost@example.com", UserUpdate::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_groups_and_membership() {
        let app = app();
        app.new_user("ada@example.com", PASSWORD, PASSWORD, false, true).await.unwrap();
        app.new_permission("docs:read").await.unwrap();
        app.new_permission("docs:write").await.unwrap();
        app.new_group("editors").await.unwrap();

        let out = app
            .run(
                Command::SetPermissions {
                    group: "editors".to_string(),
                    permissions: vec!["docs:write".to_string(), "docs:read".to_string()],
                    clear: false,
                },
                no_prompt,
            )
            .await
            .unwrap();
        assert_eq!(out, "Group updated: editors [docs:read, docs:write]");

        let out = app
            .run(
                Command::AddMember {
                    email: "ada@example.com".to_string(),
                    group: "editors".to_string(),
                },
                no_prompt,
            )
            .await
            .unwrap();
        assert_eq!(out, "Added ada@example.com to editors");
        let user = app.store().get_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(user.groups.len(), 1);

        app.remove_member("ada@example.com", "editors").await.unwrap();
        let user = app.store().get_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert!(user.groups.is_empty());

        let out = app
            .run(
                Command::SetPermissions {
                    group: "editors".to_string(),
                    permissions: Vec::new(),
                    clear: true,
                },
                no_prompt,
            )
            .await
            .unwrap();
        assert_eq!(out, "Group updated: editors []");
    }

    #[tokio::test]
    async fn test_setperms_errors() {
        let app = app();
        app.new_group("editors").await.unwrap();

        let err = app
            .run(
                Command::SetPermissions {
                    group: "editors".to_string(),
                    permissions: Vec::new(),
                    clear: false,
                },
                no_prompt,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--clear"));

        let err = app
            .set_permissions("editors", vec!["docs:unknown".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::PermissionNotFound { .. })
        ));

        let err = app.set_permissions("nobody", Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("Group does not exist"));

        let err = app.add_member("ghost@example.com", "editors").await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_users_listing() {
        let app = app();
        app.new_user("b@example.com", PASSWORD, PASSWORD, true, true).await.unwrap();
        app.new_user("a@example.com", PASSWORD, PASSWORD, false, true).await.unwrap();
        app.new_user("c@example.com", PASSWORD, PASSWORD, false, false).await.unwrap();

        let out = app
            .run(
                Command::Users {
                    active: true,
                    inactive: false,
                    admins: false,
                    limit: 10,
                    offset: 0,
                    order_by: UserSort::Email,
                    desc: false,
                },
                no_prompt,
            )
            .await
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Showing 2 of 2 users");
        assert!(lines[1].contains("<a@example.com>"));
        assert!(lines[2].contains("<b@example.com>"));

        let out = app
            .run(
                Command::Users {
                    active: false,
                    inactive: false,
                    admins: true,
                    limit: 10,
                    offset: 0,
                    order_by: UserSort::Created,
                    desc: true,
                },
                no_prompt,
            )
            .await
            .unwrap();
        assert!(out.starts_with("Showing 1 of 1 users"));

        let err = app
            .run(
                Command::Users {
                    active: false,
                    inactive: false,
                    admins: false,
                    limit: 0,
                    offset: 0,
                    order_by: UserSort::Created,
                    desc: false,
                },
                no_prompt,
            )
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::InvalidQuery(_))));
    }
}
