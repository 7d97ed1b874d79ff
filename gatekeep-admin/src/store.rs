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

//! Store selection from a database URL.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use gatekeep_core::{AuthStore, MemoryStore, RedbStore};
use tracing::{info, warn};

const MEMORY_SCHEME: &str = "memory://";
const REDB_SCHEME: &str = "redb://";

/// Opens the store named by `database_url`.
///
/// Supported forms are `memory://` (a fresh, process-local store) and
/// `redb://<path>` (a redb database file, created if missing).
pub fn open_store(database_url: &str) -> Result<Arc<dyn AuthStore>> {
    let url = database_url.trim();

    if url == MEMORY_SCHEME {
        warn!("Using an in-memory store; changes are lost when the process exits");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if let Some(path) = url.strip_prefix(REDB_SCHEME) {
        if path.is_empty() {
            bail!("database url {:?} is missing a file path", database_url);
        }
        let store = RedbStore::open(Path::new(path))
            .with_context(|| format!("failed to open redb store at {}", path))?;
        info!(path = %path, "Opened redb store");
        return Ok(Arc::new(store));
    }

    bail!(
        "unsupported database url {:?} (expected {} or {}<path>)",
        database_url,
        MEMORY_SCHEME,
        REDB_SCHEME
    )
}
