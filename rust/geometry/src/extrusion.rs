// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthetic box solids used as stand-ins for element geometry.

use nalgebra::Point3;

use crate::error::Result;
use crate::kernel::{GeometryKernel, ScopedSolid};
use crate::profile::CurveLoop;

/// Build a closed rectangular prism between two corner points.
///
/// The prism is a rectangle in the XY plane at `min.z`, closed into a planar
/// loop and extruded by `max.z - min.z`. `min` must not exceed `max` on X and
/// Y; the sign of the Z difference sets the extrusion direction and is the
/// caller's to validate. A zero-height prism is accepted.
///
/// The returned solid is released when the guard is dropped.
pub fn make_solid<'k, K>(
    kernel: &'k K,
    min: &Point3<f64>,
    max: &Point3<f64>,
) -> Result<ScopedSolid<'k, K>>
where
    K: GeometryKernel + ?Sized,
{
    let profile = CurveLoop::rectangle(min, max);
    let height = max.z - min.z;
    let key = kernel.extrude(&profile, height)?;
    Ok(ScopedSolid::new(kernel, key))
}
