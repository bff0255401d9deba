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

//! lalog Agent
//!
//! The emitter: samples the local load averages on a drift-correcting
//! timer and reports them to a collector, fire-and-forget.

pub mod loadavg;
pub mod report;
pub mod timer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("getloadavg failed (os reported {0} values)")]
    LoadAvgUnavailable(i32),

    #[error("invalid collector endpoint: {0}")]
    Endpoint(String),

    #[error("report failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector rejected report: {0}")]
    Rejected(reqwest::StatusCode),
}
