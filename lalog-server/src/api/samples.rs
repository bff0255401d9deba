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

//! Sample ingestion and range queries, the collector's core surface.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use lalog_core::{Sample, TimeRange, STORAGE_TIME_FORMAT};

use crate::api::{with_store, ApiError, AppState};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub since: Option<String>,
    pub until: Option<String>,
}

/// One sample as it appears on the wire.
#[derive(Debug, Serialize)]
struct SampleBody {
    datetime: String,
    loadavg: [f64; 3],
}

impl From<&Sample> for SampleBody {
    fn from(sample: &Sample) -> Self {
        Self {
            datetime: sample.log_time.format(STORAGE_TIME_FORMAT).to_string(),
            loadavg: sample.loadavg.as_array(),
        }
    }
}

/// GET /:hostname - samples for one host, ascending by timestamp
///
/// With `since`/`until` query parameters the window is inclusive on both
/// ends; without any query string every sample the host has is returned.
/// An unknown host is a 404; a known host with an empty window is an
/// empty list.
pub async fn host_samples(
    Path(hostname): Path<String>,
    Query(params): Query<RangeParams>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    validation::validate_hostname(&hostname)?;

    let range = match (&params.since, &params.until) {
        (None, None) => None,
        (since, until) => Some(TimeRange::resolve(
            since.as_deref(),
            until.as_deref(),
            Utc::now(),
        )?),
    };

    let query_host = hostname.clone();
    let samples =
        with_store(&state, move |store| store.samples_in_range(&query_host, range.as_ref()))
            .await?;
    debug!(hostname, count = samples.len(), "range query served");

    let entries: Vec<SampleBody> = samples.iter().map(SampleBody::from).collect();
    let mut body = Map::new();
    body.insert(
        hostname,
        serde_json::to_value(entries).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    Ok(Json(Value::Object(body)))
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub loadavg: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: &'static str,
}

/// POST /:hostname - register the host if unseen and append one sample
///
/// Validation happens entirely before storage is touched: a non-JSON
/// content type is a 415, a body without at least three numeric `loadavg`
/// values is a 422. Extra values beyond the first three are ignored.
pub async fn ingest_sample(
    Path(hostname): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    validation::validate_hostname(&hostname)?;

    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType,
        other => ApiError::UnprocessableEntity(other.body_text()),
    })?;
    let load = validation::validate_loadavg(&request.loadavg)?;

    let ingest_host = hostname.clone();
    with_store(&state, move |store| store.record_sample(&ingest_host, load)).await?;
    debug!(hostname, "sample ingested");

    Ok(Json(IngestResponse { message: "OK" }))
}
