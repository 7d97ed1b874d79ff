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

//! Command line definition.

use clap::{Parser, Subcommand, ValueEnum};
use gatekeep_core::{UserOrder, DEFAULT_LIMIT};

/// Gatekeep administration: manage users, groups and permissions.
#[derive(Debug, Parser)]
#[command(name = "gatekeep-admin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store location (`memory://` or `redb://<path>`)
    #[arg(long, env = "GATEKEEP_DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create a new user (the password is prompted for)
    #[command(name = "newuser")]
    NewUser {
        /// Email of the user
        email: String,

        /// Create the user as an administrator
        #[arg(short, long)]
        admin: bool,

        /// Create the user as inactive
        #[arg(short, long)]
        inactive: bool,
    },

    /// Edit the flags of an existing user
    #[command(name = "edituser")]
    EditUser {
        /// Email of an existing user
        email: String,

        /// Grant admin status
        #[arg(long, conflicts_with = "no_admin")]
        admin: bool,

        /// Revoke admin status
        #[arg(long)]
        no_admin: bool,

        /// Activate the user
        #[arg(long, conflicts_with = "no_active")]
        active: bool,

        /// Deactivate the user
        #[arg(long)]
        no_active: bool,
    },

    /// Register a permission name
    #[command(name = "newpermission")]
    NewPermission {
        /// Permission name, e.g. `reports:read`
        name: String,
    },

    /// Create a group with no permissions
    #[command(name = "newgroup")]
    NewGroup {
        /// Group name
        name: String,
    },

    /// Replace the whole permission set of a group
    #[command(name = "setperms")]
    SetPermissions {
        /// Group name
        group: String,

        /// New permission set (replaces the current one)
        #[arg(conflicts_with = "clear")]
        permissions: Vec<String>,

        /// Remove every permission from the group
        #[arg(long)]
        clear: bool,
    },

    /// Add a user to a group
    #[command(name = "addmember")]
    AddMember {
        /// Email of the user
        email: String,
        /// Group name
        group: String,
    },

    /// Remove a user from a group
    #[command(name = "removemember")]
    RemoveMember {
        /// Email of the user
        email: String,
        /// Group name
        group: String,
    },

    /// List users
    #[command(name = "users")]
    Users {
        /// Only active users
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Only inactive users
        #[arg(long)]
        inactive: bool,

        /// Only administrators
        #[arg(long)]
        admins: bool,

        /// Page size (1-100)
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Number of users to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Sort key
        #[arg(long, value_enum, default_value_t = UserSort::Created)]
        order_by: UserSort,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
}

/// Sort keys accepted by `users --order-by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserSort {
    Created,
    Email,
    LastLogin,
}

impl From<UserSort> for UserOrder {
    fn from(sort: UserSort) -> Self {
        match sort {
            UserSort::Created => UserOrder::Created,
            UserSort::Email => UserOrder::Email,
            UserSort::LastLogin => UserOrder::LastLogin,
        }
    }
}

/// Collapses a `--flag` / `--no-flag` pair into an optional change.
pub fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
