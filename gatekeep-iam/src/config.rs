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

//! Configuration for the auth engine.
//!
//! Settings are read from `GATEKEEP_`-prefixed environment variables. The
//! first four are required:
//!
//! ```bash
//! export GATEKEEP_SECRET_KEY=$(openssl rand -hex 32)
//! export GATEKEEP_ALGORITHM=HS256
//! export GATEKEEP_ACCESS_TOKEN_EXPIRE_MINUTES=30
//! export GATEKEEP_DATABASE_URL=redb:///var/lib/gatekeep/auth.redb
//! ```
//!
//! The password policy is optional. Rules are whitespace-separated regular
//! expressions that must all match (write `\s` for a space):
//!
//! ```bash
//! export GATEKEEP_PASSWORD_MIN_LENGTH=12
//! export GATEKEEP_PASSWORD_MAX_LENGTH=128
//! export GATEKEEP_PASSWORD_RULES='[a-z] [A-Z] [0-9]'
//! export GATEKEEP_PASSWORD_HELP='At least 12 characters with mixed case and a digit'
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::IamError;

/// Environment variable holding the token signing secret.
pub const ENV_SECRET_KEY: &str = "GATEKEEP_SECRET_KEY";
/// Environment variable holding the token signing algorithm.
pub const ENV_ALGORITHM: &str = "GATEKEEP_ALGORITHM";
/// Environment variable holding the token lifetime in minutes.
pub const ENV_ACCESS_TOKEN_EXPIRE_MINUTES: &str = "GATEKEEP_ACCESS_TOKEN_EXPIRE_MINUTES";
/// Environment variable holding the store location.
pub const ENV_DATABASE_URL: &str = "GATEKEEP_DATABASE_URL";
/// Optional minimum password length.
pub const ENV_PASSWORD_MIN_LENGTH: &str = "GATEKEEP_PASSWORD_MIN_LENGTH";
/// Optional maximum password length.
pub const ENV_PASSWORD_MAX_LENGTH: &str = "GATEKEEP_PASSWORD_MAX_LENGTH";
/// Optional whitespace-separated password rules.
pub const ENV_PASSWORD_RULES: &str = "GATEKEEP_PASSWORD_RULES";
/// Optional password rejection message.
pub const ENV_PASSWORD_HELP: &str = "GATEKEEP_PASSWORD_HELP";

/// Auth engine settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Token signing secret (generate with `openssl rand -hex 32`)
    pub secret_key: String,
    /// Token signing algorithm, e.g. `HS256`
    pub algorithm: String,
    /// Lifetime of issued tokens, in minutes
    pub access_token_expire_minutes: u32,
    /// Store location; interpreted by the embedding application
    pub database_url: String,
    /// Password policy overrides
    #[serde(default)]
    pub password: PasswordSettings,
}

/// Optional password policy overrides; unset fields keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordSettings {
    /// Minimum password length
    pub min_length: Option<usize>,
    /// Maximum password length
    pub max_length: Option<usize>,
    /// Regular expressions a password must all match
    pub rules: Option<Vec<String>>,
    /// Message returned when a password is rejected
    pub help: Option<String>,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("database_url", &self.database_url)
            .field("password", &self.password)
            .finish()
    }
}

impl AuthSettings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, IamError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` naming the first missing or invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, IamError> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(IamError::Config(format!("{} must be set", key))),
            }
        };

        let minutes = required(ENV_ACCESS_TOKEN_EXPIRE_MINUTES)?;
        let access_token_expire_minutes = match minutes.trim().parse::<u32>() {
            Ok(m) if m > 0 => m,
            _ => {
                return Err(IamError::Config(format!(
                    "{} must be a positive number of minutes, got {:?}",
                    ENV_ACCESS_TOKEN_EXPIRE_MINUTES, minutes
                )))
            }
        };

        Ok(Self {
            secret_key: required(ENV_SECRET_KEY)?,
            algorithm: required(ENV_ALGORITHM)?.trim().to_string(),
            access_token_expire_minutes,
            database_url: required(ENV_DATABASE_URL)?.trim().to_string(),
            password: PasswordSettings::from_lookup(&lookup)?,
        })
    }
}

impl PasswordSettings {
    /// Load the password overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` naming an invalid length variable.
    pub fn from_env() -> Result<Self, IamError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the password overrides through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` naming an invalid length variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let length = |key: &str| -> Result<Option<usize>, IamError> {
            optional(key)
                .map(|value| {
                    value.trim().parse::<usize>().map_err(|_| {
                        IamError::Config(format!("{} must be a whole number, got {:?}", key, value))
                    })
                })
                .transpose()
        };

        Ok(Self {
            min_length: length(ENV_PASSWORD_MIN_LENGTH)?,
            max_length: length(ENV_PASSWORD_MAX_LENGTH)?,
            rules: optional(ENV_PASSWORD_RULES)
                .map(|rules| rules.split_whitespace().map(str::to_string).collect()),
            help: optional(ENV_PASSWORD_HELP).map(|help| help.trim().to_string()),
        })
    }
}
