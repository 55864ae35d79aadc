// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry kernel whose solids are unions of disjoint axis-aligned boxes.
//!
//! Room volumes in most models are extruded floor outlines, and the engine
//! itself only ever builds rectangular prisms, so a box representation covers
//! the matcher's needs with exact intersection volumes. Call counters and a
//! live-solid count make it usable as an instrumented stand-in for a real
//! kernel.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::kernel::{GeometryKernel, SolidKey};
use crate::outline::Outline;
use crate::profile::CurveLoop;
use crate::transform::Transform;

/// Stored solid: disjoint boxes whose union is the solid.
#[derive(Debug, Clone)]
struct BoxSolid {
    boxes: Vec<Outline>,
    /// Boolean operations involving this solid fail (simulates kernel
    /// failures on pathological geometry).
    unevaluable: bool,
}

/// Snapshot of kernel activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelStats {
    pub extrusions: usize,
    pub intersections: usize,
    pub transforms: usize,
    pub disposals: usize,
    pub live_solids: usize,
}

/// Box-based [`GeometryKernel`].
#[derive(Debug, Default)]
pub struct BoxKernel {
    solids: RwLock<SlotMap<SolidKey, BoxSolid>>,
    extrusions: AtomicUsize,
    intersections: AtomicUsize,
    transforms: AtomicUsize,
    disposals: AtomicUsize,
}

impl BoxKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a solid made of the given boxes.
    ///
    /// The boxes must not overlap each other, otherwise volumes are counted
    /// twice. Degenerate boxes are dropped.
    pub fn insert_boxes(&self, boxes: Vec<Outline>) -> SolidKey {
        let boxes = boxes.into_iter().filter(|b| !b.is_degenerate()).collect();
        self.solids.write().insert(BoxSolid {
            boxes,
            unevaluable: false,
        })
    }

    pub fn insert_box(&self, outline: Outline) -> SolidKey {
        self.insert_boxes(vec![outline])
    }

    /// Make every boolean operation on `solid` fail.
    pub fn mark_unevaluable(&self, solid: SolidKey) {
        if let Some(s) = self.solids.write().get_mut(solid) {
            s.unevaluable = true;
        }
    }

    pub fn contains(&self, solid: SolidKey) -> bool {
        self.solids.read().contains_key(solid)
    }

    /// Boxes of a stored solid.
    pub fn boxes(&self, solid: SolidKey) -> Result<Vec<Outline>> {
        self.solids
            .read()
            .get(solid)
            .map(|s| s.boxes.clone())
            .ok_or(Error::SolidNotFound(solid))
    }

    pub fn stats(&self) -> KernelStats {
        KernelStats {
            extrusions: self.extrusions.load(Ordering::Relaxed),
            intersections: self.intersections.load(Ordering::Relaxed),
            transforms: self.transforms.load(Ordering::Relaxed),
            disposals: self.disposals.load(Ordering::Relaxed),
            live_solids: self.solids.read().len(),
        }
    }

    /// Number of solids currently stored.
    pub fn live_solids(&self) -> usize {
        self.solids.read().len()
    }
}

impl GeometryKernel for BoxKernel {
    fn extrude(&self, profile: &CurveLoop, height: f64) -> Result<SolidKey> {
        self.extrusions.fetch_add(1, Ordering::Relaxed);

        if !height.is_finite() {
            return Err(Error::InvalidExtrusion(format!(
                "Height must be finite, got {height}"
            )));
        }
        if !profile.is_axis_aligned_rectangle() {
            return Err(Error::profile(
                "Box kernel only extrudes axis-aligned rectangles",
            ));
        }

        let mut outline = profile.bounds();
        let top = profile.elevation() + height;
        outline.min.z = outline.min.z.min(top);
        outline.max.z = outline.max.z.max(top);

        Ok(self.solids.write().insert(BoxSolid {
            boxes: vec![outline],
            unevaluable: false,
        }))
    }

    fn intersect(&self, a: SolidKey, b: SolidKey) -> Result<SolidKey> {
        self.intersections.fetch_add(1, Ordering::Relaxed);

        let boxes = {
            let solids = self.solids.read();
            let sa = solids.get(a).ok_or(Error::SolidNotFound(a))?;
            let sb = solids.get(b).ok_or(Error::SolidNotFound(b))?;
            if sa.unevaluable || sb.unevaluable {
                return Err(Error::BooleanFailed(format!(
                    "cannot intersect {a:?} with {b:?}"
                )));
            }

            let mut boxes = Vec::new();
            for ba in &sa.boxes {
                for bb in &sb.boxes {
                    if let Some(common) = ba.intersection(bb) {
                        if common.volume() > 0.0 {
                            boxes.push(common);
                        }
                    }
                }
            }
            boxes
        };

        Ok(self.solids.write().insert(BoxSolid {
            boxes,
            unevaluable: false,
        }))
    }

    fn volume(&self, solid: SolidKey) -> Result<f64> {
        self.solids
            .read()
            .get(solid)
            .map(|s| s.boxes.iter().map(Outline::volume).sum())
            .ok_or(Error::SolidNotFound(solid))
    }

    fn bounds(&self, solid: SolidKey) -> Result<Outline> {
        let solids = self.solids.read();
        let s = solids.get(solid).ok_or(Error::SolidNotFound(solid))?;
        let (first, rest) = s.boxes.split_first().ok_or(Error::EmptySolid(solid))?;
        let mut outline = *first;
        for b in rest {
            outline.absorb(b);
        }
        Ok(outline)
    }

    fn transformed(&self, solid: SolidKey, transform: &Transform) -> Result<SolidKey> {
        self.transforms.fetch_add(1, Ordering::Relaxed);

        let moved = {
            let solids = self.solids.read();
            let s = solids.get(solid).ok_or(Error::SolidNotFound(solid))?;
            BoxSolid {
                boxes: s.boxes.iter().map(|b| b.transformed(transform)).collect(),
                unevaluable: s.unevaluable,
            }
        };
        Ok(self.solids.write().insert(moved))
    }

    fn dispose(&self, solid: SolidKey) {
        if self.solids.write().remove(solid).is_some() {
            self.disposals.fetch_add(1, Ordering::Relaxed);
        }
    }
}
