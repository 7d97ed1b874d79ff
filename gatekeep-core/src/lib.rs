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

//! Gatekeep Core
//!
//! Data model and persistence layer for the Gatekeep authentication engine:
//! - Users, groups and permissions
//! - Paginated listing with filters and ordering
//! - The `AuthStore` trait the engine reads from and writes to
//! - In-memory and redb-backed store implementations

pub mod error;
pub mod storage;
pub mod types;

pub use error::StoreError;
pub use storage::{AuthStore, MemoryStore, RedbStore};
pub use types::*;
