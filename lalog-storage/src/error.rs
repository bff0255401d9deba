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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The queried host name has never been registered.
    #[error("unknown host: {0}")]
    UnknownHost(String),

    /// Any underlying datastore failure. Fatal during schema bootstrap,
    /// a 500 during request handling.
    #[error("datastore error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
