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

//! lalog Storage
//!
//! SQLite-backed store for the collector. Deliberately synchronous: the
//! single connection behind a mutex is the serialized execution queue that
//! keeps multi-statement transactions from interleaving. Async callers hop
//! to the blocking pool before touching it.

mod error;
mod schema;
mod store;

pub use error::StorageError;
pub use store::SqliteStore;
