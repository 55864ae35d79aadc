// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Spacemark Core
//!
//! The model-store side of room matching and door numbering.
//!
//! ## Overview
//!
//! - **Ids and phases**: [`ElementId`], [`RoomId`], [`LevelId`], [`Phase`]
//! - **Entities**: [`Level`], [`Room`], [`Element`] with its [`ElementKind`]
//! - **Capabilities**: [`GeometricElement`] describes what the matcher can read
//!   from an element; [`ModelStore`] and [`DoorModel`] are the queries the
//!   engine runs against a model
//! - **Storage**: [`Document`], an in-memory store, with [`LinkInstance`] for
//!   linked documents and [`ModelSnapshot`] for JSON import/export
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacemark_core::{Document, DoorModel, ElementId};
//! use spacemark_geometry::BoxKernel;
//!
//! let kernel = BoxKernel::new();
//! let doc = Document::from_json(&std::fs::read_to_string("model.json")?, &kernel)?;
//! println!("{:?}", doc.mark(ElementId(200)));
//! ```

pub mod document;
pub mod element;
pub mod error;
pub mod ids;
pub mod link;
pub mod room;
pub mod snapshot;
pub mod store;

pub use document::Document;
pub use element::{Element, ElementKind, GeometricElement, Location, PhaseMap, MARK_PARAMETER};
pub use error::{Error, Result};
pub use ids::{ElementId, LevelId, Phase, RoomId};
pub use link::LinkInstance;
pub use room::{Level, Room};
pub use snapshot::ModelSnapshot;
pub use store::{DoorModel, DoorRooms, ModelStore};
