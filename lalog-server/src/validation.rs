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

//! Input validation for API requests, run before any storage call.

use crate::api::ApiError;
use lalog_core::LoadAvg;

/// Maximum hostname length accepted in the path segment.
pub const MAX_HOSTNAME_BYTES: usize = 255;

/// A reading carries at least the 1-, 5- and 15-minute averages.
pub const LOADAVG_VALUES: usize = 3;

pub fn validate_hostname(hostname: &str) -> Result<(), ApiError> {
    if hostname.is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "hostname must not be empty".to_string(),
        ));
    }
    if hostname.len() > MAX_HOSTNAME_BYTES {
        return Err(ApiError::UnprocessableEntity(format!(
            "hostname exceeds {MAX_HOSTNAME_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Checks the `loadavg` sequence and extracts the three meaningful values.
/// Extras beyond the first three are ignored.
pub fn validate_loadavg(values: &[f64]) -> Result<LoadAvg, ApiError> {
    if values.len() < LOADAVG_VALUES {
        return Err(ApiError::UnprocessableEntity(format!(
            "loadavg needs at least {LOADAVG_VALUES} values, got {}",
            values.len()
        )));
    }
    if values[..LOADAVG_VALUES].iter().any(|v| !v.is_finite()) {
        return Err(ApiError::UnprocessableEntity(
            "loadavg values must be finite numbers".to_string(),
        ));
    }
    Ok(LoadAvg::new(values[0], values[1], values[2]))
}
