// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid check policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid scene option: {0}")]
    InvalidScene(String),

    #[error(transparent)]
    Core(#[from] ifc_diff_core::Error),

    #[error(transparent)]
    Geometry(#[from] ifc_diff_geometry::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
