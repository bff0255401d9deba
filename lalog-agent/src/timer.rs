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

//! Drift-correcting cycle timing.
//!
//! The delay to the next report is recomputed from the wall clock every
//! cycle, so the schedule stays aligned to interval boundaries (the top
//! of each minute at the default interval) instead of accumulating the
//! runtime's per-sleep slippage.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Delay until the next tick boundary.
///
/// Boundaries are multiples of `interval` on the epoch-millisecond clock;
/// landing exactly on one yields a full interval, never a zero sleep.
pub fn delay_to_next_tick(now: DateTime<Utc>, interval: Duration) -> Duration {
    let interval_ms = interval.as_millis().max(1) as u64;
    let epoch_ms = now.timestamp_millis().max(0) as u64;
    let into_cycle = epoch_ms % interval_ms;
    Duration::from_millis(interval_ms - into_cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn aligns_to_the_top_of_the_minute() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(13_250);
        let delay = delay_to_next_tick(now, MINUTE);
        assert_eq!(delay, Duration::from_millis(46_750));
    }

    #[test]
    fn on_a_boundary_waits_a_full_interval() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(delay_to_next_tick(now, MINUTE), MINUTE);
    }

    #[test]
    fn late_in_the_minute_fires_soon() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 59).unwrap()
            + chrono::Duration::milliseconds(900);
        let delay = delay_to_next_tick(now, MINUTE);
        assert_eq!(delay, Duration::from_millis(100));
    }

    #[test]
    fn generalizes_to_other_intervals() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 7).unwrap();
        assert_eq!(
            delay_to_next_tick(now, Duration::from_secs(10)),
            Duration::from_secs(3)
        );
    }
}
