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

//! Core records owned by the auth stores.

pub mod group;
pub mod permission;
pub mod query;
pub mod user;

pub use group::{Group, GroupUpdate};
pub use permission::Permission;
pub use query::{
    like_match, GroupOrder, ListQuery, NameFilter, OrderDirection, Paginated, PermissionOrder,
    SortKey, UserFilter, UserOrder, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use user::{NewUser, User, UserUpdate};

use crate::error::StoreError;

/// Maximum length of a group or permission name.
pub const MAX_NAME_LEN: usize = 100;

/// Normalizes a group or permission name.
///
/// Surrounding whitespace is stripped; the result must be non-empty and at
/// most [`MAX_NAME_LEN`] characters.
pub fn normalize_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}
