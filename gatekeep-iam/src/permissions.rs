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

//! Permission checking.

use std::collections::BTreeSet;

use tracing::debug;

use super::error::IamError;
use super::models::Identity;

/// Checks that every required permission is held.
///
/// An empty requirement is always satisfied.
pub fn require_all<'a, I>(identity: &Identity, required: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    required.into_iter().all(|p| identity.permissions.contains(p))
}

/// Checks that at least one required permission is held.
///
/// An empty requirement is never satisfied.
pub fn require_any<'a, I>(identity: &Identity, required: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    required.into_iter().any(|p| identity.permissions.contains(p))
}

/// Admin-only gate for administrative operations.
pub fn require_admin(identity: &Identity) -> Result<(), IamError> {
    if identity.user.is_admin {
        Ok(())
    } else {
        debug!(user_id = %identity.user.id, "Denied administrative operation");
        Err(IamError::InsufficientPermissions)
    }
}

/// How a [`PermissionCheck`] combines its permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Every permission is required
    All,
    /// Any one permission suffices
    Any,
}

/// A reusable permission requirement for one protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    mode: CheckMode,
    permissions: BTreeSet<String>,
}

impl PermissionCheck {
    /// Require every one of `permissions`.
    pub fn all<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CheckMode::All, permissions)
    }

    /// Require at least one of `permissions`.
    pub fn any<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CheckMode::Any, permissions)
    }

    fn new<I, S>(mode: CheckMode, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Evaluate the check against an identity.
    pub fn allows(&self, identity: &Identity) -> bool {
        let required = self.permissions.iter().map(String::as_str);
        match self.mode {
            CheckMode::All => require_all(identity, required),
            CheckMode::Any => require_any(identity, required),
        }
    }

    /// Evaluate the check, turning a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns `IamError::InsufficientPermissions` when the check fails.
    pub fn enforce(&self, identity: &Identity) -> Result<(), IamError> {
        if self.allows(identity) {
            Ok(())
        } else {
            debug!(
                user_id = %identity.user.id,
                mode = ?self.mode,
                required = ?self.permissions,
                "Permission check denied"
            );
            Err(IamError::InsufficientPermissions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_core::{NewUser, User};

    fn identity(permissions: &[&str], is_admin: bool) -> Identity {
        Identity {
            user: User::new(NewUser {
                email: "ivan@example.com".to_string(),
                password_hash: String::new(),
                is_active: true,
                is_admin,
            }),
            groups: Vec::new(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_require_all() {
        let id = identity(&["read", "write"], false);
        assert!(require_all(&id, ["read", "write"]));
        assert!(require_all(&id, ["read"]));
        assert!(!require_all(&id, ["read", "delete"]));
    }

    #[test]
    fn test_require_any() {
        let id = identity(&["read", "write"], false);
        assert!(require_any(&id, ["delete", "write"]));
        assert!(!require_any(&id, ["delete", "admin"]));
    }

    #[test]
    fn test_empty_requirements() {
        let id = identity(&[], false);
        assert!(require_all(&id, std::iter::empty::<&str>()));
        assert!(!require_any(&id, std::iter::empty::<&str>()));

        assert!(PermissionCheck::all(Vec::<String>::new()).allows(&id));
        assert!(!PermissionCheck::any(Vec::<String>::new()).allows(&id));
    }

    #[test]
    fn test_enforce() {
        let id = identity(&["reports:read"], false);

        let check = PermissionCheck::all(["reports:read"]);
        assert!(check.enforce(&id).is_ok());

        let check = PermissionCheck::any(["reports:export", "reports:delete"]);
        assert!(matches!(check.enforce(&id), Err(IamError::InsufficientPermissions)));
        assert_eq!(check.mode(), CheckMode::Any);
        assert_eq!(check.permissions().len(), 2);
    }

    #[test]
    fn test_admin_flag_does_not_bypass_checks() {
        let admin = identity(&[], true);
        assert!(require_admin(&admin).is_ok());
        assert!(!PermissionCheck::all(["reports:read"]).allows(&admin));

        let regular = identity(&["reports:read"], false);
        assert!(matches!(require_admin(&regular), Err(IamError::InsufficientPermissions)));
    }
}
