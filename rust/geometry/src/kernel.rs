// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The solid-modelling collaborator.
//!
//! Solids are opaque handles owned by a kernel. The room matcher only needs a
//! handful of operations on them: extrude a profile, intersect two solids,
//! query volume and bounds, move a solid into another coordinate space, and
//! release it. Every solid the matcher creates is wrapped in a
//! [`ScopedSolid`] so it is released on every exit path.

use slotmap::new_key_type;

use crate::error::Result;
use crate::outline::Outline;
use crate::profile::CurveLoop;
use crate::transform::Transform;

/// Intersection volumes at or below this are treated as empty: coincident or
/// tangent faces produce floating-point slivers, not real overlap.
pub const VOLUME_TOLERANCE: f64 = 1e-6;

new_key_type! {
    /// Handle to a solid held by a [`GeometryKernel`].
    pub struct SolidKey;
}

/// Solid operations required from a geometry kernel.
///
/// Methods take `&self` so a kernel can be shared between concurrent room
/// queries; implementations synchronise internally.
pub trait GeometryKernel {
    /// Extrude a closed planar loop along +Z by `height`.
    ///
    /// A negative height extrudes downwards.
    fn extrude(&self, profile: &CurveLoop, height: f64) -> Result<SolidKey>;

    /// Boolean intersection of two solids. The result is a new solid owned by
    /// the caller, possibly empty (zero volume).
    fn intersect(&self, a: SolidKey, b: SolidKey) -> Result<SolidKey>;

    fn volume(&self, solid: SolidKey) -> Result<f64>;

    /// Axis-aligned bounds of a solid.
    fn bounds(&self, solid: SolidKey) -> Result<Outline>;

    /// Copy of `solid` mapped through `transform`, owned by the caller.
    fn transformed(&self, solid: SolidKey, transform: &Transform) -> Result<SolidKey>;

    /// Release a solid. Unknown keys are ignored.
    fn dispose(&self, solid: SolidKey);

    /// Volume of the intersection of two solids. The intermediate solid is
    /// released before returning.
    fn intersection_volume(&self, a: SolidKey, b: SolidKey) -> Result<f64> {
        let common = ScopedSolid::new(self, self.intersect(a, b)?);
        self.volume(common.key())
    }
}

/// A solid that is disposed when the guard goes out of scope.
pub struct ScopedSolid<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k K,
    key: SolidKey,
}

impl<'k, K: GeometryKernel + ?Sized> ScopedSolid<'k, K> {
    /// Take ownership of `key`, which must have been created for the caller.
    pub fn new(kernel: &'k K, key: SolidKey) -> Self {
        Self { kernel, key }
    }

    #[inline]
    pub fn key(&self) -> SolidKey {
        self.key
    }

    pub fn volume(&self) -> Result<f64> {
        self.kernel.volume(self.key)
    }
}

impl<K: GeometryKernel + ?Sized> Drop for ScopedSolid<'_, K> {
    fn drop(&mut self) {
        self.kernel.dispose(self.key);
    }
}

impl<K: GeometryKernel + ?Sized> std::fmt::Debug for ScopedSolid<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScopedSolid").field(&self.key).finish()
    }
}
