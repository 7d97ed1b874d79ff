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

//! Account input validation: email normalization and password strength.

use regex::Regex;

use super::config::PasswordSettings;
use super::error::IamError;

/// Maximum accepted email length (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Special characters accepted (and one of which is required) in passwords.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Validate and normalize an email address.
///
/// The address is trimmed and lower-cased. It must have exactly one `@`, a
/// non-empty local part and a dotted domain, and contain no whitespace.
///
/// # Errors
///
/// Returns `IamError::InvalidEmail` if the address is rejected.
pub fn normalize_email(email: &str) -> Result<String, IamError> {
    let email = email.trim().to_lowercase();

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(IamError::InvalidEmail);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(IamError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(IamError::InvalidEmail);
    }

    // every label of the domain must be non-empty, and there must be at least two
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(IamError::InvalidEmail);
    }

    Ok(email)
}

/// Password strength rules.
///
/// With no custom rules the password must consist of ASCII letters, digits and
/// [`PASSWORD_SPECIALS`], with at least one of each class. Custom rules are
/// regular expressions that must all match and replace the character checks;
/// the length bounds apply either way.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum length in characters
    pub min_len: usize,
    /// Maximum length in characters
    pub max_len: usize,
    rules: Vec<Regex>,
    help: Option<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: 8,
            max_len: 50,
            rules: Vec::new(),
            help: None,
        }
    }
}

impl PasswordPolicy {
    /// Build the policy described by the password settings, falling back to
    /// the defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` for inverted bounds or a rule that does not
    /// compile.
    pub fn from_settings(settings: &PasswordSettings) -> Result<Self, IamError> {
        let defaults = Self::default();
        let mut policy = defaults.clone().with_length(
            settings.min_length.unwrap_or(defaults.min_len),
            settings.max_length.unwrap_or(defaults.max_len),
        )?;
        if let Some(rules) = &settings.rules {
            policy = policy.with_rules(rules)?;
        }
        if let Some(help) = &settings.help {
            policy = policy.with_help(help.clone());
        }
        Ok(policy)
    }

    /// Set the length bounds (inclusive).
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` if `min_len` is zero or above `max_len`.
    pub fn with_length(mut self, min_len: usize, max_len: usize) -> Result<Self, IamError> {
        if min_len == 0 || min_len > max_len {
            return Err(IamError::Config(format!(
                "invalid password length bounds {}..={}",
                min_len, max_len
            )));
        }
        self.min_len = min_len;
        self.max_len = max_len;
        Ok(self)
    }

    /// Replace the character checks with regular expressions that must all
    /// match. An empty list restores the built-in checks.
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` naming the first pattern that does not compile.
    pub fn with_rules<I, S>(mut self, patterns: I) -> Result<Self, IamError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| {
                    IamError::Config(format!("invalid password rule {:?}: {}", pattern, e))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Replace the rejection message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn rules(&self) -> &[Regex] {
        &self.rules
    }

    /// Human-readable description of the rules, used as the rejection message.
    pub fn help(&self) -> String {
        if let Some(help) = &self.help {
            return help.clone();
        }
        if self.rules.is_empty() {
            format!(
                "Password must be between {} and {} characters long and contain at least one \
                 uppercase letter, one lowercase letter, one number and one special character \
                 from {}",
                self.min_len, self.max_len, PASSWORD_SPECIALS
            )
        } else {
            format!(
                "Password must be between {} and {} characters long and satisfy the password rules",
                self.min_len, self.max_len
            )
        }
    }

    /// Check a password against the policy.
    ///
    /// # Errors
    ///
    /// Returns `IamError::WeakPassword` carrying [`PasswordPolicy::help`].
    pub fn check(&self, password: &str) -> Result<(), IamError> {
        let len = password.chars().count();
        let strong = (self.min_len..=self.max_len).contains(&len)
            && if self.rules.is_empty() {
                has_default_classes(password)
            } else {
                self.rules.iter().all(|rule| rule.is_match(password))
            };

        if strong {
            Ok(())
        } else {
            Err(IamError::WeakPassword(self.help()))
        }
    }

    /// Check a new password and its confirmation.
    ///
    /// # Errors
    ///
    /// Returns `IamError::WeakPassword` or `IamError::PasswordMismatch`.
    pub fn check_with_confirmation(&self, password: &str, confirm: &str) -> Result<(), IamError> {
        self.check(password)?;
        if password != confirm {
            return Err(IamError::PasswordMismatch);
        }
        Ok(())
    }
}

fn has_default_classes(password: &str) -> bool {
    password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}
