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

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::api::{with_store, ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct HostsResponse {
    pub hosts: Vec<String>,
}

/// GET / - every registered host name
pub async fn list_hosts(State(state): State<AppState>) -> Result<Json<HostsResponse>, ApiError> {
    let hosts = with_store(&state, |store| store.list_hosts()).await?;
    debug!(count = hosts.len(), "listing hosts");
    Ok(Json(HostsResponse { hosts }))
}

/// POST / - the registry root is read-only
pub async fn reject_post_root() -> ApiError {
    ApiError::MethodNotAllowed
}
