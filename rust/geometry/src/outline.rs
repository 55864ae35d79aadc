// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned outlines used for coarse candidate filtering.
//!
//! An [`Outline`] is the unit of bounding-box intersection queries against the
//! model store. Element outlines are expanded by a fuzz offset and may absorb
//! extra points (e.g. the element's position projected onto its level) before
//! the query runs.

use nalgebra::{Point3, Vector3};

use crate::transform::Transform;

/// Axis-aligned box defined by a minimum and maximum corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Outline {
    /// Create an outline from its corners as given (no reordering).
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create the smallest outline containing both points.
    pub fn from_points(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest outline containing every point, or `None` for an empty input.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut outline = Self::new(first, first);
        for p in iter {
            outline.absorb_point(&p);
        }
        Some(outline)
    }

    /// Grow the outline so that it includes `point`.
    #[inline]
    pub fn absorb_point(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Grow the outline so that it includes `other`.
    pub fn absorb(&mut self, other: &Outline) {
        self.absorb_point(&other.min);
        self.absorb_point(&other.max);
    }

    /// Returns a copy grown by `offset` on every side.
    ///
    /// `offset` must be non-negative; zero returns the outline unchanged.
    pub fn expanded(&self, offset: f64) -> Self {
        let delta = Vector3::new(offset, offset, offset);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Inclusive overlap test: touching outlines intersect.
    #[inline]
    pub fn intersects(&self, other: &Outline) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Overlapping region of two outlines, `None` when they are disjoint.
    pub fn intersection(&self, other: &Outline) -> Option<Outline> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        })
    }

    #[inline]
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// True when a max coordinate is below its min or a coordinate is not finite.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.min.coords.iter().chain(self.max.coords.iter()).all(|c| c.is_finite());
        !finite || self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Extent along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min.coords + self.max.coords) / 2.0)
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        (s.x * s.y * s.z).max(0.0)
    }

    /// The eight corners, bottom ring first.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }

    /// Axis-aligned outline of the transformed corners.
    ///
    /// Exact for translations and quarter turns about Z; any other rotation
    /// yields a conservative (larger) box.
    pub fn transformed(&self, transform: &Transform) -> Outline {
        let corners = self.corners();
        let first = transform.apply(&corners[0]);
        let mut result = Outline::new(first, first);
        for c in &corners[1..] {
            result.absorb_point(&transform.apply(c));
        }
        result
    }
}

/// Element bounding box as reported by the model store.
///
/// A disabled box means the host has no usable extent for the element
/// (annotation or non-physical elements).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub outline: Outline,
    pub enabled: bool,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            outline: Outline::new(min, max),
            enabled: true,
        }
    }

    pub fn disabled(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            outline: Outline::new(min, max),
            enabled: false,
        }
    }

    /// The outline when the box is enabled and non-degenerate.
    pub fn usable(&self) -> Option<&Outline> {
        if self.enabled && !self.outline.is_degenerate() {
            Some(&self.outline)
        } else {
            None
        }
    }
}

impl From<Outline> for BoundingBox {
    fn from(outline: Outline) -> Self {
        Self {
            outline,
            enabled: true,
        }
    }
}
