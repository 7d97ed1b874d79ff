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

//! End-to-end authentication and authorization flows.
//!
//! These tests drive the service the way an application would: register or
//! create accounts, log in, present the token, and gate operations with
//! permission checks.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gatekeep_core::{AuthStore, GroupUpdate, MemoryStore, RedbStore, User, UserUpdate};
use gatekeep_iam::hooks::HookError;
use gatekeep_iam::{
    require_admin, require_all, require_any, AuthService, AuthSettings, ChangePassword, IamError,
    LoginRequest, NewAccount, PasswordHasher, PasswordSettings, PermissionCheck, Registration,
    RegistrationHook, RegistrationHooks, TokenCodec,
};
use tempfile::TempDir;

const PASSWORD: &str = "Abcdef123!";

fn codec() -> TokenCodec {
    TokenCodec::new("integration-test-secret", "HS256", Duration::minutes(30)).unwrap()
}

fn service(store: Arc<dyn AuthStore>) -> AuthService {
    AuthService::new(store, codec()).with_hasher(PasswordHasher::with_params(8, 1, 1).unwrap())
}

fn account(email: &str, is_active: bool, is_admin: bool) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password_confirm: PASSWORD.to_string(),
        is_active,
        is_admin,
    }
}

async fn login(auth: &AuthService, email: &str, password: &str) -> Result<String, IamError> {
    let response = auth
        .login(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    Ok(response.access_token)
}

/// Two groups, G1 granting `read` and G2 granting `write`, and a user in both.
async fn two_group_fixture(store: &Arc<dyn AuthStore>, auth: &AuthService) -> User {
    for name in ["read", "write", "delete"] {
        store.create_permission(name).await.unwrap();
    }
    let g1 = store.create_group("G1").await.unwrap();
    let g2 = store.create_group("G2").await.unwrap();
    store.update_group(&g1.id, GroupUpdate::set_permissions(["read"])).await.unwrap();
    store.update_group(&g2.id, GroupUpdate::set_permissions(["write"])).await.unwrap();

    let user = auth.create_user(account("member@example.com", true, false)).await.unwrap();
    store.add_user_to_group(&user.id, &g1.id).await.unwrap();
    store.add_user_to_group(&user.id, &g2.id).await.unwrap()
}

#[tokio::test]
async fn test_permission_union_across_groups() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    two_group_fixture(&store, &auth).await;

    let token = login(&auth, "member@example.com", PASSWORD).await.unwrap();
    let identity = auth.authenticate(&token).await.unwrap();

    assert!(require_all(&identity, ["read", "write"]));
    assert!(!require_all(&identity, ["read", "delete"]));
    assert!(require_any(&identity, ["delete", "write"]));

    let read_write = PermissionCheck::all(["read", "write"]);
    assert!(auth.authorize(&token, &read_write).await.is_ok());

    let err = auth
        .authorize(&token, &PermissionCheck::all(["read", "delete"]))
        .await
        .unwrap_err();
    assert!(matches!(err, IamError::InsufficientPermissions));
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_group_updates_apply_to_existing_tokens() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    two_group_fixture(&store, &auth).await;

    let token = login(&auth, "member@example.com", PASSWORD).await.unwrap();
    let delete = PermissionCheck::any(["delete"]);
    assert!(auth.authorize(&token, &delete).await.is_err());

    let g2 = store.get_group_by_name("G2").await.unwrap().unwrap();
    store
        .update_group(&g2.id, GroupUpdate::set_permissions(["write", "delete"]))
        .await
        .unwrap();
    assert!(auth.authorize(&token, &delete).await.is_ok());

    // clearing the set revokes everything the group granted
    store.update_group(&g2.id, GroupUpdate::clear_permissions()).await.unwrap();
    let identity = auth.authenticate(&token).await.unwrap();
    assert!(!identity.has_permission("write"));
    assert!(!identity.has_permission("delete"));
    assert!(identity.has_permission("read"));
}

#[tokio::test]
async fn test_token_lifecycle() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    let user = auth.create_user(account("trent@example.com", true, false)).await.unwrap();

    let issued_at = Utc::now();
    let response = auth
        .login_at(
            LoginRequest {
                email: "trent@example.com".to_string(),
                password: PASSWORD.to_string(),
            },
            issued_at,
        )
        .await
        .unwrap();
    let token = response.access_token;

    let before_expiry = response.expires_at - Duration::seconds(1);
    assert!(auth.authenticate_at(&token, before_expiry).await.is_ok());

    let err = auth.authenticate_at(&token, response.expires_at).await.unwrap_err();
    assert!(matches!(err, IamError::InvalidToken));
    assert!(err.is_unauthenticated());

    // deleting the user invalidates its outstanding tokens
    store.delete_user(&user.id).await.unwrap();
    let err = auth.authenticate_at(&token, issued_at).await.unwrap_err();
    assert!(matches!(err, IamError::InvalidToken));
}

#[tokio::test]
async fn test_tokens_from_other_keys_are_rejected() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    let user = auth.create_user(account("victor@example.com", true, false)).await.unwrap();

    let forger = TokenCodec::new("some-other-secret", "HS256", Duration::minutes(30)).unwrap();
    let forged = forger.issue(&user.id.to_string(), Utc::now()).unwrap();
    assert!(matches!(auth.authenticate(&forged).await, Err(IamError::InvalidToken)));

    let genuine = auth.codec().issue(&user.id.to_string(), Utc::now()).unwrap();
    assert!(auth.authenticate(&genuine).await.is_ok());
}

#[tokio::test]
async fn test_inactive_users() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    auth.create_user(account("walter@example.com", false, false)).await.unwrap();

    let err = login(&auth, "walter@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, IamError::AccountInactive));

    // a wrong password never reveals the account state
    let err = login(&auth, "walter@example.com", "Wrong1234!").await.unwrap_err();
    assert!(matches!(err, IamError::InvalidCredentials));

    // deactivating an account invalidates its outstanding tokens
    let user = auth.create_user(account("wendy@example.com", true, false)).await.unwrap();
    let token = login(&auth, "wendy@example.com", PASSWORD).await.unwrap();
    assert!(auth.authenticate(&token).await.is_ok());

    store
        .update_user(
            &user.id,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(auth.authenticate(&token).await, Err(IamError::InvalidToken)));
}

struct RecordingHook {
    name: &'static str,
    fail: bool,
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RegistrationHook for RecordingHook {
    fn name(&self) -> &str {
        self.name
    }

    async fn after_registration(&self, store: &dyn AuthStore, user: &User) -> Result<(), HookError> {
        // the user is already persisted when hooks run
        let persisted = store.get_user(&user.id).await?.is_some();
        self.seen.lock().unwrap().push(format!("{}:{}", self.name, persisted));
        if self.fail {
            return Err(format!("{} refused {}", self.name, user.email).into());
        }
        Ok(())
    }
}

struct DefaultGroupHook {
    group: &'static str,
}

#[async_trait]
impl RegistrationHook for DefaultGroupHook {
    fn name(&self) -> &str {
        "default-group"
    }

    async fn after_registration(&self, store: &dyn AuthStore, user: &User) -> Result<(), HookError> {
        let group = store
            .get_group_by_name(self.group)
            .await?
            .ok_or_else(|| format!("group {} does not exist", self.group))?;
        store.add_user_to_group(&user.id, &group.id).await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_registration_hooks() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    store.create_permission("profile:read").await.unwrap();
    let members = store.create_group("members").await.unwrap();
    store
        .update_group(&members.id, GroupUpdate::set_permissions(["profile:read"]))
        .await
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let hooks = RegistrationHooks::new()
        .with(Arc::new(RecordingHook {
            name: "audit",
            fail: false,
            seen: seen.clone(),
        }))
        .with(Arc::new(DefaultGroupHook { group: "members" }));
    let auth = service(store.clone()).with_hooks(hooks);

    let user = auth
        .register(Registration {
            email: "xavier@example.com".to_string(),
            password: PASSWORD.to_string(),
            password_confirm: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["audit:true"]);

    let token = login(&auth, "xavier@example.com", PASSWORD).await.unwrap();
    let identity = auth.authenticate(&token).await.unwrap();
    assert_eq!(identity.user.id, user.id);
    assert_eq!(identity.groups, vec!["members"]);
    assert!(identity.has_permission("profile:read"));

    // administrative creation skips the hooks
    auth.create_user(account("yvonne@example.com", true, false)).await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failing_hook_leaves_user_persisted() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hooks = RegistrationHooks::new()
        .with(Arc::new(RecordingHook {
            name: "first",
            fail: false,
            seen: seen.clone(),
        }))
        .with(Arc::new(RecordingHook {
            name: "second",
            fail: true,
            seen: seen.clone(),
        }))
        .with(Arc::new(RecordingHook {
            name: "third",
            fail: false,
            seen: seen.clone(),
        }));
    let auth = service(store.clone()).with_hooks(hooks);

    let err = auth
        .register(Registration {
            email: "zoe@example.com".to_string(),
            password: PASSWORD.to_string(),
            password_confirm: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    match err {
        IamError::HookFailed { hook, reason } => {
            assert_eq!(hook, "second");
            assert_eq!(reason, "second refused zoe@example.com");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(*seen.lock().unwrap(), vec!["first:true", "second:true"]);
    assert!(store.get_user_by_email("zoe@example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_change_password() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    auth.create_user(account("alice@example.com", true, false)).await.unwrap();
    let token = login(&auth, "alice@example.com", PASSWORD).await.unwrap();
    let identity = auth.authenticate(&token).await.unwrap();

    let reuse = ChangePassword {
        current_password: PASSWORD.to_string(),
        password: PASSWORD.to_string(),
        password_confirm: PASSWORD.to_string(),
    };
    assert!(matches!(auth.change_password(&identity, reuse).await, Err(IamError::PasswordReuse)));

    let wrong_current = ChangePassword {
        current_password: "Wrong1234!".to_string(),
        password: "Newpass123!".to_string(),
        password_confirm: "Newpass123!".to_string(),
    };
    assert!(matches!(
        auth.change_password(&identity, wrong_current).await,
        Err(IamError::InvalidCredentials)
    ));

    let change = ChangePassword {
        current_password: PASSWORD.to_string(),
        password: "Newpass123!".to_string(),
        password_confirm: "Newpass123!".to_string(),
    };
    auth.change_password(&identity, change).await.unwrap();

    assert!(matches!(
        login(&auth, "alice@example.com", PASSWORD).await,
        Err(IamError::InvalidCredentials)
    ));
    assert!(login(&auth, "alice@example.com", "Newpass123!").await.is_ok());
}

#[tokio::test]
async fn test_whoami_and_admin_gate() {
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = service(store.clone());
    auth.create_user(account("root@example.com", true, true)).await.unwrap();
    auth.create_user(account("bob@example.com", true, false)).await.unwrap();

    let admin_token = login(&auth, "root@example.com", PASSWORD).await.unwrap();
    let me = auth.whoami(&admin_token).await.unwrap();
    assert_eq!(me.email, "root@example.com");
    assert!(me.is_admin);
    assert!(me.last_login.is_some());

    let admin = auth.authenticate(&admin_token).await.unwrap();
    assert!(require_admin(&admin).is_ok());

    let bob_token = login(&auth, "bob@example.com", PASSWORD).await.unwrap();
    let bob = auth.authenticate(&bob_token).await.unwrap();
    assert!(matches!(require_admin(&bob), Err(IamError::InsufficientPermissions)));
}

#[tokio::test]
async fn test_flow_on_redb_store() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("auth.redb");
    let token = {
        let store: Arc<dyn AuthStore> = Arc::new(RedbStore::open(&path).unwrap());
        let auth = service(store.clone());
        two_group_fixture(&store, &auth).await;
        login(&auth, "member@example.com", PASSWORD).await.unwrap()
    };

    // a fresh process with the same key accepts tokens issued earlier
    let store: Arc<dyn AuthStore> = Arc::new(RedbStore::open(&path).unwrap());
    let auth = service(store);
    let identity = auth
        .authorize(&token, &PermissionCheck::all(["read", "write"]))
        .await
        .unwrap();
    assert_eq!(identity.user.email, "member@example.com");
}

#[tokio::test]
async fn test_service_from_settings() {
    let settings = AuthSettings {
        secret_key: "settings-secret".to_string(),
        algorithm: "HS512".to_string(),
        access_token_expire_minutes: 5,
        database_url: "memory://".to_string(),
        password: PasswordSettings {
            min_length: Some(10),
            rules: Some(vec!["^[a-z]+$".to_string()]),
            help: Some("Ten or more lowercase letters".to_string()),
            ..Default::default()
        },
    };
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    let auth = AuthService::from_settings(store, &settings)
        .unwrap()
        .with_hasher(PasswordHasher::with_params(8, 1, 1).unwrap());
    assert_eq!(auth.codec().ttl(), Duration::minutes(5));

    // the configured policy replaces the built-in one
    let rejected = auth
        .register(Registration {
            email: "settings@example.com".to_string(),
            password: "Abcdef123!".to_string(),
            password_confirm: "Abcdef123!".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(rejected.to_string(), "Ten or more lowercase letters");
    auth.register(Registration {
        email: "settings@example.com".to_string(),
        password: "correcthorse".to_string(),
        password_confirm: "correcthorse".to_string(),
    })
    .await
    .unwrap();

    let bad = AuthSettings {
        algorithm: "RS256".to_string(),
        ..settings
    };
    let store: Arc<dyn AuthStore> = Arc::new(MemoryStore::new());
    assert!(matches!(
        AuthService::from_settings(store, &bad),
        Err(IamError::UnsupportedAlgorithm(_))
    ));
}
