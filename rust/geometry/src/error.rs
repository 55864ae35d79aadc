// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::kernel::SolidKey;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported profile: {0}")]
    UnsupportedProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Solid not found: {0:?}")]
    SolidNotFound(SolidKey),

    #[error("Solid has no geometry: {0:?}")]
    EmptySolid(SolidKey),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Transform is not invertible")]
    SingularTransform,
}

impl Error {
    pub fn profile(msg: impl Into<String>) -> Self {
        Error::UnsupportedProfile(msg.into())
    }
}
