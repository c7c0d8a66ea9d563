// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh generation and comparison
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Invalid sampling parameters: {0}")]
    InvalidSampling(String),

    #[error("Snapshot error: {0}")]
    Core(#[from] ifc_diff_core::Error),
}

impl Error {
    pub fn mesh(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }
}
