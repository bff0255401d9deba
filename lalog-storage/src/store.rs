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

//! The collector's store: lazy host registration, atomic sample appends,
//! and inclusive time-range reads.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use lalog_core::{HostId, LoadAvg, Sample, SampleId, TimeRange, STORAGE_TIME_FORMAT};

use crate::error::StorageError;
use crate::schema;

/// Handle to the embedded datastore.
///
/// Cloning shares the single underlying connection; the mutex strictly
/// serializes statements, which is what makes the multi-statement ingestion
/// transaction atomic in practice. The collector process is the only
/// writer.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the datastore at `path` and bootstraps
    /// the schema. A bootstrap failure here is fatal to the caller.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, StorageError> {
        schema::init(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Atomically registers `hostname` (if unseen) and appends one sample
    /// stamped with the insertion time.
    ///
    /// All-or-nothing: if any statement fails the transaction's drop guard
    /// rolls the whole unit back, so a retry never finds an orphan or
    /// duplicate host row.
    pub fn record_sample(
        &self,
        hostname: &str,
        load: LoadAvg,
    ) -> Result<SampleId, StorageError> {
        self.record(hostname, load, None)
    }

    /// Same as [`record_sample`](Self::record_sample) with an explicit
    /// timestamp (UTC, second precision) instead of the insertion time.
    pub fn record_sample_at(
        &self,
        hostname: &str,
        load: LoadAvg,
        log_time: NaiveDateTime,
    ) -> Result<SampleId, StorageError> {
        self.record(hostname, load, Some(log_time))
    }

    fn record(
        &self,
        hostname: &str,
        load: LoadAvg,
        log_time: Option<NaiveDateTime>,
    ) -> Result<SampleId, StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let host_id = ensure_host(&tx, hostname)?;
        match log_time {
            None => {
                tx.execute(
                    "INSERT INTO lalogs ( host_id, loadavg1, loadavg5, loadavg15 )
                         VALUES ( ?1, ?2, ?3, ?4 )",
                    params![host_id.0, load.one, load.five, load.fifteen],
                )?;
            }
            Some(at) => {
                // Bind the datastore's own text layout so explicit and
                // defaulted timestamps compare lexicographically.
                let at = at.format(STORAGE_TIME_FORMAT).to_string();
                tx.execute(
                    "INSERT INTO lalogs ( host_id, log_time, loadavg1, loadavg5, loadavg15 )
                         VALUES ( ?1, ?2, ?3, ?4, ?5 )",
                    params![host_id.0, at, load.one, load.five, load.fifteen],
                )?;
            }
        }
        let sample_id = SampleId(tx.last_insert_rowid());
        tx.commit()?;

        debug!(hostname, host_id = host_id.0, "sample recorded");
        Ok(sample_id)
    }

    /// Samples for `hostname` within the inclusive window, ascending by
    /// timestamp. `None` means unbounded (every sample the host has).
    ///
    /// An unknown host is [`StorageError::UnknownHost`]; a known host with
    /// an empty window is an empty vector.
    pub fn samples_in_range(
        &self,
        hostname: &str,
        range: Option<&TimeRange>,
    ) -> Result<Vec<Sample>, StorageError> {
        let conn = self.conn.lock();

        let host_id: Option<i64> = conn
            .query_row(
                "SELECT host_id FROM hosts WHERE host_name = ?1",
                params![hostname],
                |row| row.get(0),
            )
            .optional()?;
        let Some(host_id) = host_id else {
            return Err(StorageError::UnknownHost(hostname.to_string()));
        };

        let map_row = |row: &rusqlite::Row<'_>| -> Result<Sample, rusqlite::Error> {
            let raw: String = row.get(0)?;
            let log_time = NaiveDateTime::parse_from_str(&raw, STORAGE_TIME_FORMAT)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
            Ok(Sample {
                log_time,
                loadavg: LoadAvg::new(row.get(1)?, row.get(2)?, row.get(3)?),
            })
        };

        let samples = match range {
            Some(range) => {
                let (since, until) = range.storage_bounds();
                let mut stmt = conn.prepare(
                    "SELECT log_time, loadavg1, loadavg5, loadavg15 FROM lalogs
                         WHERE host_id = ?1 AND log_time BETWEEN ?2 AND ?3
                         ORDER BY log_time ASC, lalog_id ASC",
                )?;
                let rows = stmt.query_map(params![host_id, since, until], map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT log_time, loadavg1, loadavg5, loadavg15 FROM lalogs
                         WHERE host_id = ?1
                         ORDER BY log_time ASC, lalog_id ASC",
                )?;
                let rows = stmt.query_map(params![host_id], map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(samples)
    }

    /// Every registered host name, ordered by name.
    pub fn list_hosts(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT host_name FROM hosts ORDER BY host_name ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Insert-if-absent registration inside the caller's transaction.
///
/// The conditional insert plus the UNIQUE constraint on `host_name` is the
/// race-breaker for concurrent first-sight of a name; a conflict is the
/// expected "already registered" path, never an error.
fn ensure_host(tx: &Transaction<'_>, hostname: &str) -> Result<HostId, StorageError> {
    tx.execute(
        "INSERT INTO hosts ( host_name ) VALUES ( ?1 )
             ON CONFLICT ( host_name ) DO NOTHING",
        params![hostname],
    )?;
    let id = tx.query_row(
        "SELECT host_id FROM hosts WHERE host_name = ?1",
        params![hostname],
        |row| row.get(0),
    )?;
    Ok(HostId(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn window(since: &str, until: &str) -> TimeRange {
        TimeRange {
            since: ts(since),
            until: ts(until),
        }
    }

    #[test]
    fn samples_stay_with_their_own_host() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .record_sample("alpha", LoadAvg::new(0.1, 0.2, 0.3))
            .unwrap();
        store
            .record_sample("beta", LoadAvg::new(1.0, 2.0, 3.0))
            .unwrap();

        assert_eq!(store.list_hosts().unwrap(), vec!["alpha", "beta"]);

        let alpha = store.samples_in_range("alpha", None).unwrap();
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].loadavg, LoadAvg::new(0.1, 0.2, 0.3));

        let beta = store.samples_in_range("beta", None).unwrap();
        assert_eq!(beta.len(), 1);
        assert_eq!(beta[0].loadavg, LoadAvg::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn concurrent_first_sight_registers_one_host() {
        let store = SqliteStore::open_in_memory().unwrap();
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .record_sample("fresh", LoadAvg::new(i as f64, 0.0, 0.0))
                        .unwrap();
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        assert_eq!(store.list_hosts().unwrap(), vec!["fresh"]);
        assert_eq!(store.samples_in_range("fresh", None).unwrap().len(), 8);
    }

    #[test]
    fn range_results_are_ascending_and_inclusive() {
        let store = SqliteStore::open_in_memory().unwrap();
        // Deliberately inserted out of order.
        store
            .record_sample_at("alpha", LoadAvg::new(0.2, 0.2, 0.2), ts("2025-06-01 10:02:00"))
            .unwrap();
        store
            .record_sample_at("alpha", LoadAvg::new(0.1, 0.1, 0.1), ts("2025-06-01 10:01:00"))
            .unwrap();
        store
            .record_sample_at("alpha", LoadAvg::new(0.3, 0.3, 0.3), ts("2025-06-01 10:03:00"))
            .unwrap();

        let all = store
            .samples_in_range("alpha", Some(&window("2025-06-01 10:01:00", "2025-06-01 10:03:00")))
            .unwrap();
        let times: Vec<_> = all.iter().map(|s| s.log_time).collect();
        assert_eq!(
            times,
            vec![
                ts("2025-06-01 10:01:00"),
                ts("2025-06-01 10:02:00"),
                ts("2025-06-01 10:03:00"),
            ]
        );

        // since == until exactly on a sample still matches it.
        let exact = store
            .samples_in_range("alpha", Some(&window("2025-06-01 10:02:00", "2025-06-01 10:02:00")))
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].loadavg, LoadAvg::new(0.2, 0.2, 0.2));
    }

    #[test]
    fn unknown_host_is_distinct_from_empty_window() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .record_sample_at("alpha", LoadAvg::new(0.1, 0.2, 0.3), ts("2025-06-01 10:00:00"))
            .unwrap();

        match store.samples_in_range("nobody", None) {
            Err(StorageError::UnknownHost(name)) => assert_eq!(name, "nobody"),
            other => panic!("expected UnknownHost, got {other:?}"),
        }

        let empty = store
            .samples_in_range("alpha", Some(&window("2020-01-01 00:00:00", "2020-01-02 00:00:00")))
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn list_hosts_is_empty_before_first_sample() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list_hosts().unwrap().is_empty());
    }

    #[test]
    fn schema_bootstrap_is_idempotent_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lalog.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .record_sample("alpha", LoadAvg::new(0.5, 0.5, 0.5))
                .unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.list_hosts().unwrap(), vec!["alpha"]);
        assert_eq!(reopened.samples_in_range("alpha", None).unwrap().len(), 1);
    }

    #[test]
    fn ensure_host_returns_a_stable_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut conn = store.conn.lock();
        let tx = conn.transaction().unwrap();
        let first = ensure_host(&tx, "alpha").unwrap();
        let second = ensure_host(&tx, "alpha").unwrap();
        assert_eq!(first, second);
        tx.commit().unwrap();
    }

    #[test]
    fn default_timestamp_is_recent_utc() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .record_sample("alpha", LoadAvg::new(0.1, 0.2, 0.3))
            .unwrap();
        let samples = store.samples_in_range("alpha", None).unwrap();
        let logged = samples[0].log_time;
        let now = chrono::Utc::now().naive_utc();
        let age = (now - logged).num_seconds().abs();
        assert!(age < 60, "log_time {logged} not near now {now}");
        // Guard against a future regression to local time.
        assert!(logged.date() >= NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }
}
