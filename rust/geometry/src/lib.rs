// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Spacemark Geometry
//!
//! Coarse geometry used to match building elements to the rooms that
//! enclose them:
//!
//! - [`Outline`] / [`BoundingBox`]: axis-aligned boxes with expansion and
//!   point absorption
//! - [`Transform`]: placement of linked documents, with inverse
//! - [`CurveLoop`]: closed planar loops used as extrusion profiles
//! - [`GeometryKernel`]: the solid-modelling collaborator (intersect, volume,
//!   dispose) and [`ScopedSolid`], which releases a solid on drop
//! - [`make_solid`]: rectangular prism between two corner points
//! - [`BoxKernel`]: a kernel whose solids are unions of axis-aligned boxes

pub mod box_kernel;
pub mod error;
pub mod extrusion;
pub mod kernel;
pub mod outline;
pub mod profile;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use box_kernel::{BoxKernel, KernelStats};
pub use error::{Error, Result};
pub use extrusion::make_solid;
pub use kernel::{GeometryKernel, ScopedSolid, SolidKey, VOLUME_TOLERANCE};
pub use outline::{BoundingBox, Outline};
pub use profile::CurveLoop;
pub use transform::Transform;
