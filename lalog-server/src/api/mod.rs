// Copyright 2025 lalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP handlers for the collector surface.

mod error;
mod health;
mod hosts;
mod samples;

pub use error::ApiError;
pub use health::health_check;
pub use hosts::{list_hosts, reject_post_root};
pub use samples::{host_samples, ingest_sample};

use lalog_storage::{SqliteStore, StorageError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
}

/// Runs one synchronous storage call on the blocking pool.
///
/// The store serializes statements internally; hopping off the runtime
/// worker keeps a held database lock from stalling unrelated requests.
pub(crate) async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(SqliteStore) -> Result<T, StorageError> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || op(store))
        .await
        .map_err(|e| ApiError::Internal(format!("storage task failed: {e}")))?
        .map_err(ApiError::from)
}
