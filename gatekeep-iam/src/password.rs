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

//! Password hashing and verification using Argon2.

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, warn};

use super::error::IamError;

/// Parameter keys of a hash produced by [`PasswordHasher::hash_password`], in order.
const PARAM_KEYS: [&str; 3] = ["m", "t", "p"];

const DECOY_PASSWORD: &str = "gatekeep-decoy-password";

/// Password hasher using Argon2id.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy: Option<Arc<str>>,
}

impl PasswordHasher {
    /// Create new password hasher with default parameters.
    pub fn new() -> Self {
        Self::from_argon2(Argon2::default())
    }

    /// Create a hasher with explicit Argon2id cost parameters.
    ///
    /// # Arguments
    ///
    /// * `m_cost` - Memory size in KiB (at least 8 per lane)
    /// * `t_cost` - Number of iterations
    /// * `p_cost` - Degree of parallelism
    ///
    /// # Errors
    ///
    /// Returns `IamError::Config` if the parameters are out of range.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, IamError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| IamError::Config(format!("invalid Argon2 parameters: {}", e)))?;
        Ok(Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        let decoy = match hash_with(&argon2, DECOY_PASSWORD) {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                warn!(error = %e, "Failed to prepare decoy password hash");
                None
            }
        };
        Self { argon2, decoy }
    }

    /// Hash password using Argon2.
    ///
    /// # Arguments
    ///
    /// * `password` - Plain text password to hash
    ///
    /// # Returns
    ///
    /// Returns PHC string format hash that can be stored in database.
    ///
    /// # Errors
    ///
    /// Returns `IamError::HashingFailed` if hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String, IamError> {
        hash_with(&self.argon2, password)
    }

    /// Verify password against a stored hash.
    ///
    /// Output comparison is constant-time. A malformed hash, a parameter list
    /// other than exactly `m`, `t`, `p` in that order, or any other hashing
    /// fault counts as a mismatch.
    ///
    /// # Arguments
    ///
    /// * `password` - Plain text password to verify
    /// * `hash` - PHC string format hash from database
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        // argon2 tolerates repeated or missing keys and fills in defaults
        if !parsed_hash.params.iter().map(|(key, _)| key.as_str()).eq(PARAM_KEYS) {
            debug!("Stored password hash has a non-canonical parameter list");
            return false;
        }

        self.argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok()
    }

    /// Runs one verification against a throwaway hash and reports a mismatch.
    ///
    /// Used for unknown accounts so that a lookup miss costs the same as a
    /// wrong password. The decoy hash is computed when the hasher is built.
    pub fn verify_decoy(&self, password: &str) -> bool {
        if let Some(hash) = &self.decoy {
            let _ = self.verify(password, hash);
        }
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, IamError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| IamError::HashingFailed)?;
    Ok(hash.to_string())
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "test_password_123";

        let hash = hasher.hash_password(password).unwrap();
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_different_passwords_different_hashes() {
        let hasher = cheap_hasher();

        let hash1 = hasher.hash_password("password").unwrap();
        let hash2 = hasher.hash_password("password").unwrap();

        // Different salts = different hashes
        assert_ne!(hash1, hash2);

        assert!(hasher.verify("password", &hash1));
        assert!(hasher.verify("password", &hash2));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let hasher = cheap_hasher();

        assert!(!hasher.verify("password", "invalid_hash"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$argon2id$v=19$m=8,t=1,p=1$"));
    }

    #[test]
    fn test_hash_is_not_the_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_password("Sup3r$ecret").unwrap();

        assert!(!hash.contains("Sup3r$ecret"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_any_bit_flip_in_hash_fails_verification() {
        let hasher = cheap_hasher();
        let password = "Correct-Horse-9";
        let hash = hasher.hash_password(password).unwrap();
        assert!(hasher.verify(password, &hash));

        // The final characters of the salt and output segments carry unused
        // padding bits in unpadded base64, so they are left out.
        let output_start = hash.rfind('$').unwrap() + 1;
        let skipped = [output_start - 2, hash.len() - 1];

        let bytes = hash.as_bytes();
        for index in (0..bytes.len()).filter(|i| !skipped.contains(i)) {
            for bit in [0x01u8, 0x02, 0x04] {
                let mut mutated = bytes.to_vec();
                mutated[index] ^= bit;
                let mutated = String::from_utf8(mutated).unwrap();

                assert!(
                    !hasher.verify(password, &mutated),
                    "mutation at byte {} (bit {:#04x}) still verified: {}",
                    index,
                    bit,
                    mutated
                );
            }
        }
    }

    #[test]
    fn test_renamed_parameter_fails_verification() {
        let hasher = cheap_hasher();
        let password = "Correct-Horse-9";
        let hash = hasher.hash_password(password).unwrap();
        assert!(hash.contains(",t=1,p=1$"));

        // 'p' ^ 0x04 == 't'
        let duplicated = hash.replacen(",p=1$", ",t=1$", 1);
        assert_ne!(duplicated, hash);
        assert!(!hasher.verify(password, &duplicated));

        let reordered = hash.replacen("m=8,t=1,p=1", "t=1,m=8,p=1", 1);
        assert!(!hasher.verify(password, &reordered));

        let dropped = hash.replacen(",p=1$", "$", 1);
        assert!(!hasher.verify(password, &dropped));
    }

    #[test]
    fn test_decoy_is_prepared_up_front() {
        let hasher = cheap_hasher();
        let decoy = hasher.decoy.clone().unwrap();
        assert!(decoy.starts_with("$argon2id$"));

        assert!(!hasher.verify_decoy(DECOY_PASSWORD));
        // clones share the same decoy
        assert_eq!(hasher.clone().decoy.as_deref(), Some(&*decoy));
    }

    #[test]
    fn test_empty_password() {
        let hasher = cheap_hasher();

        let hash = hasher.hash_password("").unwrap();
        assert!(hasher.verify("", &hash));
        assert!(!hasher.verify("nonempty", &hash));
    }

    #[test]
    fn test_long_password() {
        let hasher = cheap_hasher();
        let long_password = "a".repeat(1000);

        let hash = hasher.hash_password(&long_password).unwrap();
        assert!(hasher.verify(&long_password, &hash));
    }

    #[test]
    fn test_decoy_never_matches() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify_decoy("gatekeep-decoy-password"));
        assert!(!hasher.verify_decoy("anything"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(matches!(PasswordHasher::with_params(0, 1, 1), Err(IamError::Config(_))));
        assert!(matches!(PasswordHasher::with_params(8, 0, 1), Err(IamError::Config(_))));
    }
}
