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

//! Post-registration hooks.
//!
//! The embedding application composes a [`RegistrationHooks`] list and hands
//! it to the auth service. Hooks run one after another once a new account
//! has been persisted; the first failure stops the chain.
//!
//! ```rust,ignore
//! let hooks = RegistrationHooks::new()
//!     .with(Arc::new(AddToDefaultGroup::new("members")))
//!     .with(Arc::new(SendWelcomeMail::new(mailer)));
//! let auth = AuthService::new(store, codec).with_hooks(hooks);
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use gatekeep_core::{AuthStore, User};
use tracing::{debug, warn};

use super::error::IamError;

/// Error type returned by hook implementations.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Reacts to a freshly registered user.
#[async_trait]
pub trait RegistrationHook: Send + Sync {
    /// Name used in logs and in [`IamError::HookFailed`].
    fn name(&self) -> &str;

    /// Called after the user has been persisted.
    async fn after_registration(&self, store: &dyn AuthStore, user: &User)
        -> Result<(), HookError>;
}

/// Ordered list of registration hooks.
#[derive(Clone, Default)]
pub struct RegistrationHooks {
    hooks: Vec<Arc<dyn RegistrationHook>>,
}

impl RegistrationHooks {
    /// Creates an empty hook list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook; hooks run in insertion order.
    pub fn with(mut self, hook: Arc<dyn RegistrationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Appends a hook in place.
    pub fn push(&mut self, hook: Arc<dyn RegistrationHook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook in order for `user`.
    ///
    /// # Errors
    ///
    /// Returns `IamError::HookFailed` for the first hook that fails; later
    /// hooks are not invoked.
    pub async fn run(&self, store: &dyn AuthStore, user: &User) -> Result<(), IamError> {
        for hook in &self.hooks {
            debug!(hook = hook.name(), user_id = %user.id, "Running registration hook");
            if let Err(e) = hook.after_registration(store, user).await {
                warn!(hook = hook.name(), user_id = %user.id, error = %e, "Registration hook failed");
                return Err(IamError::HookFailed {
                    hook: hook.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RegistrationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hooks.iter().map(|h| h.name())).finish()
    }
}
