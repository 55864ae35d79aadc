// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Spacemark Engine
//!
//! Spatial association and door numbering on top of a [`spacemark_core`]
//! model store and a [`spacemark_geometry`] kernel.
//!
//! - [`RoomResolver`]: which rooms contain an element, in the host model or
//!   in a linked document
//! - [`plan_door_marks`] / [`assign_door_marks`]: door marks derived from the
//!   room each door opens into
//! - [`propagate`]: parallel batch matching and writing room numbers back
//!   onto elements
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacemark_core::{Document, Phase};
//! use spacemark_engine::{assign_door_marks, MarkOptions, ResolveOptions, RoomResolver};
//! use spacemark_geometry::BoxKernel;
//!
//! let kernel = BoxKernel::new();
//! let mut doc = Document::from_json(&json, &kernel)?;
//! let phase = Phase::from("New Construction");
//!
//! let resolver = RoomResolver::new(&doc, &kernel);
//! for element in doc.elements() {
//!     let rooms = resolver.resolve_rooms(element, &phase, None, &ResolveOptions::default());
//!     println!("{} -> {:?}", element.id, rooms);
//! }
//!
//! let doors = doc.door_ids();
//! assign_door_marks(&mut doc, &doors, &phase, &doors, &MarkOptions::default());
//! ```

pub mod door_marks;
pub mod error;
pub mod options;
pub mod propagate;
pub mod resolver;

pub use door_marks::{
    assign_door_marks, ensure_doors, plan_door_marks, DoorGraph, LevelSnapshot, MarkAssignment,
    MarkPlan, RoomDoors,
};
pub use error::{Error, Result};
pub use options::{MarkOptions, ResolveOptions};
pub use propagate::{assign_spaces, resolve_batch, resolve_batch_in_link, space_label, RoomMatch};
pub use resolver::{Resolution, RoomResolver, Tier};
