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

//! Listing parameters shared by every store: filters, ordering and pagination.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Group, Permission, User};
use crate::error::StoreError;

/// Default page size.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest accepted page size.
pub const MAX_LIMIT: usize = 100;

/// Sort direction for a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending order
    #[default]
    Asc,
    /// Descending order
    Desc,
}

/// A column a listing of `T` can be ordered by.
pub trait SortKey<T> {
    /// Compares two records on this column.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// User listing columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserOrder {
    /// Creation time
    #[default]
    Created,
    /// Email address
    Email,
    /// Last login time (never-logged-in users first)
    LastLogin,
}

impl SortKey<User> for UserOrder {
    fn compare(&self, a: &User, b: &User) -> Ordering {
        let primary = match self {
            UserOrder::Created => a.created_at.cmp(&b.created_at),
            UserOrder::Email => a.email.cmp(&b.email),
            UserOrder::LastLogin => a.last_login.cmp(&b.last_login),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Group listing columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Creation time
    #[default]
    Created,
    /// Group name
    Name,
}

impl SortKey<Group> for GroupOrder {
    fn compare(&self, a: &Group, b: &Group) -> Ordering {
        let primary = match self {
            GroupOrder::Created => a.created_at.cmp(&b.created_at),
            GroupOrder::Name => a.name.cmp(&b.name),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Permission listing columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOrder {
    /// Creation time
    #[default]
    Created,
    /// Permission name
    Name,
}

impl SortKey<Permission> for PermissionOrder {
    fn compare(&self, a: &Permission, b: &Permission) -> Ordering {
        let primary = match self {
            PermissionOrder::Created => a.created_at.cmp(&b.created_at),
            PermissionOrder::Name => a.name.cmp(&b.name),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Pagination and ordering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery<O> {
    /// Number of items to return (1..=100)
    pub limit: usize,
    /// Number of matching items to skip
    pub offset: usize,
    /// Column to order by
    pub order_by: O,
    /// Order direction
    pub order_dir: OrderDirection,
}

impl<O: Default> Default for ListQuery<O> {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            order_by: O::default(),
            order_dir: OrderDirection::Asc,
        }
    }
}

impl<O> ListQuery<O> {
    /// Sets the ordering.
    pub fn ordered(mut self, order_by: O, order_dir: OrderDirection) -> Self {
        self.order_by = order_by;
        self.order_dir = order_dir;
        self
    }

    /// Sets the page window.
    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Checks the page size bounds.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(StoreError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        Ok(())
    }

    /// Sorts already-filtered `items` and cuts out the requested page.
    pub fn apply<T>(&self, mut items: Vec<T>) -> Result<Paginated<T>, StoreError>
    where
        O: SortKey<T>,
    {
        self.validate()?;

        items.sort_by(|a, b| {
            let ord = self.order_by.compare(a, b);
            match self.order_dir {
                OrderDirection::Asc => ord,
                OrderDirection::Desc => ord.reverse(),
            }
        });

        let total = items.len();
        let items = items.into_iter().skip(self.offset).take(self.limit).collect();

        Ok(Paginated { total, items })
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Number of records matching the filter, across all pages
    pub total: usize,
    /// Records on this page
    pub items: Vec<T>,
}

/// Filter for user listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    /// Only users with this active status
    pub is_active: Option<bool>,
    /// Only users with this admin status
    pub is_admin: Option<bool>,
}

impl UserFilter {
    /// True if `user` passes the filter.
    pub fn matches(&self, user: &User) -> bool {
        self.is_active.map_or(true, |active| user.is_active == active)
            && self.is_admin.map_or(true, |admin| user.is_admin == admin)
    }
}

/// Filter for group and permission listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameFilter {
    /// SQL LIKE pattern the name must match
    pub name: Option<String>,
}

impl NameFilter {
    /// Filter on a LIKE pattern.
    pub fn like(pattern: impl Into<String>) -> Self {
        Self {
            name: Some(pattern.into()),
        }
    }

    /// True if `name` passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        self.name.as_deref().map_or(true, |pattern| like_match(pattern, name))
    }
}

/// SQL LIKE matching: `%` matches any run of characters, `_` exactly one.
///
/// Comparison is ASCII case-insensitive.
pub fn like_match(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let value: Vec<char> = value.chars().map(|c| c.to_ascii_lowercase()).collect();

    let (mut p, mut v) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, v));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == value[v]) {
            p += 1;
            v += 1;
        } else if let Some((star, mark)) = backtrack {
            // let the last % swallow one more character
            p = star + 1;
            v = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
