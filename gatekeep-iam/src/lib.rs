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

//! Gatekeep IAM (Identity and Access Management).
//!
//! The authentication and authorization engine:
//! - Credential verification (Argon2 password hashes)
//! - Signed, expiring access tokens (JWT)
//! - Identity resolution with effective permissions from group membership
//! - "all" / "any" permission checks
//! - Account registration with post-registration hooks

pub mod auth;
pub mod config;
pub mod error;
pub mod hooks;
pub mod jwt;
pub mod models;
pub mod password;
pub mod permissions;
pub mod resolver;
pub mod validation;

pub use auth::{create_account, AuthService};
pub use config::{AuthSettings, PasswordSettings};
pub use error::IamError;
pub use hooks::{HookError, RegistrationHook, RegistrationHooks};
pub use jwt::{Claims, TokenCodec};
pub use models::{
    ChangePassword, Identity, LoginRequest, LoginResponse, NewAccount, Registration, UserResponse,
};
pub use password::PasswordHasher;
pub use permissions::{require_admin, require_all, require_any, CheckMode, PermissionCheck};
pub use resolver::IdentityResolver;
pub use validation::PasswordPolicy;
