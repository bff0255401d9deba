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

//! Local load-average sampling via `getloadavg(3)`.

use lalog_core::LoadAvg;

use crate::AgentError;

/// Reads the OS 1/5/15-minute load averages.
pub fn read() -> Result<LoadAvg, AgentError> {
    let mut values = [0f64; 3];
    // SAFETY: getloadavg writes at most three doubles into the buffer.
    let n = unsafe { libc::getloadavg(values.as_mut_ptr(), 3) };
    if n < 3 {
        return Err(AgentError::LoadAvgUnavailable(n));
    }
    Ok(LoadAvg::new(values[0], values[1], values[2]))
}
