// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for snapshot access.

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or querying a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A type filter names a class that is not part of the class table.
    #[error("unknown IFC type: {0}")]
    UnknownType(String),

    /// An identifier is empty or contains whitespace.
    #[error("malformed identifier: {0:?}")]
    MalformedId(String),

    /// Two entities with the same identifier were inserted into one snapshot.
    #[error("duplicate entity identifier: {0}")]
    DuplicateEntity(String),

    /// Reading a snapshot or identifier file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot interchange document could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
