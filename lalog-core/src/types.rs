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

//! Domain types for hosts and load-average samples.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage-assigned identity of a registered host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostId(pub i64);

/// Storage-assigned identity of one appended sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleId(pub i64);

/// One load-average reading: the OS-reported 1-, 5- and 15-minute
/// running averages.
///
/// Serializes as the wire array `[a1, a5, a15]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct LoadAvg {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAvg {
    pub fn new(one: f64, five: f64, fifteen: f64) -> Self {
        Self { one, five, fifteen }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.one, self.five, self.fifteen]
    }
}

impl From<[f64; 3]> for LoadAvg {
    fn from(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl From<LoadAvg> for [f64; 3] {
    fn from(load: LoadAvg) -> Self {
        load.as_array()
    }
}

/// One persisted reading for a host. Samples are immutable and
/// append-only; `log_time` is UTC at second precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub log_time: NaiveDateTime,
    pub loadavg: LoadAvg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loadavg_wire_shape_is_an_array() {
        let load = LoadAvg::new(0.1, 0.2, 0.3);
        let json = serde_json::to_string(&load).unwrap();
        assert_eq!(json, "[0.1,0.2,0.3]");

        let back: LoadAvg = serde_json::from_str("[1.5,0.75,0.25]").unwrap();
        assert_eq!(back, LoadAvg::new(1.5, 0.75, 0.25));
    }
}
