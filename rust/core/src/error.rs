// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model store operations.

use crate::ids::{ElementId, LevelId, RoomId};

/// Result type alias for model store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced element does not exist.
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),

    /// A referenced room does not exist.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// A referenced level does not exist.
    #[error("level not found: {0}")]
    LevelNotFound(LevelId),

    /// An id was registered twice.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// The element cannot carry the requested parameter.
    #[error("element {0} is not a door")]
    NotADoor(ElementId),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Geometry kernel error.
    #[error("geometry error: {0}")]
    Geometry(#[from] spacemark_geometry::Error),
}
