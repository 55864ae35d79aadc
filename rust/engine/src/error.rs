// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for engine operations.
//!
//! Per-pair geometry failures inside the matcher are logged and swallowed;
//! these errors only surface from operations that write to a model or
//! validate caller input.

use spacemark_core::ElementId;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error: {0}")]
    Model(#[from] spacemark_core::Error),

    #[error("geometry error: {0}")]
    Geometry(#[from] spacemark_geometry::Error),

    /// An element passed for numbering is not a door.
    #[error("element {0} is not a door")]
    NotADoor(ElementId),
}
