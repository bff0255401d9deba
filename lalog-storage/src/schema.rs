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

//! Persistent schema: one row per host, append-only sample log.

use rusqlite::Connection;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS hosts (
    host_id   INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    host_name TEXT    UNIQUE NOT NULL
);
CREATE TABLE IF NOT EXISTS lalogs (
    lalog_id  INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    host_id   INTEGER NOT NULL REFERENCES hosts ( host_id ),
    log_time  TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP,
    loadavg1  REAL    NOT NULL,
    loadavg5  REAL    NOT NULL,
    loadavg15 REAL    NOT NULL
);
";

/// Applies connection pragmas and creates the tables if absent, inside one
/// transaction. Safe to run on every open.
pub(crate) fn init(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "journal_mode", "wal")?;
    conn.pragma_update(None, "foreign_keys", "on")?;

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_TABLES)?;
    tx.commit()
}
