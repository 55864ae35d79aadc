// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed planar loops used as extrusion profiles.

use nalgebra::Point3;

use crate::error::{Error, Result};
use crate::outline::Outline;

const PLANAR_TOLERANCE: f64 = 1e-9;

/// Closed loop of line segments lying in a horizontal plane.
///
/// The closing segment (last point back to the first) is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLoop {
    points: Vec<Point3<f64>>,
}

impl CurveLoop {
    /// Create a loop from its corner points.
    ///
    /// Fails if there are fewer than 3 points or the points are not all at
    /// the same elevation.
    pub fn new(points: Vec<Point3<f64>>) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::profile("Curve loop must have at least 3 points"));
        }
        let z = points[0].z;
        if points.iter().any(|p| (p.z - z).abs() > PLANAR_TOLERANCE) {
            return Err(Error::profile("Curve loop is not horizontal"));
        }
        Ok(Self { points })
    }

    /// Rectangle in the XY plane at `min.z` spanning `min`..`max` on X and Y.
    ///
    /// Corner order: (min.x, min.y), (max.x, min.y), (max.x, max.y), (min.x, max.y).
    pub fn rectangle(min: &Point3<f64>, max: &Point3<f64>) -> Self {
        let z = min.z;
        Self {
            points: vec![
                Point3::new(min.x, min.y, z),
                Point3::new(max.x, min.y, z),
                Point3::new(max.x, max.y, z),
                Point3::new(min.x, max.y, z),
            ],
        }
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Elevation of the loop's plane.
    #[inline]
    pub fn elevation(&self) -> f64 {
        self.points[0].z
    }

    /// Closed segments, including the one from the last point back to the first.
    pub fn segments(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Planar bounds of the loop (zero height).
    pub fn bounds(&self) -> Outline {
        let mut outline = Outline::new(self.points[0], self.points[0]);
        for p in &self.points[1..] {
            outline.absorb_point(p);
        }
        outline
    }

    /// True when every segment runs parallel to the X or Y axis and the loop
    /// has four corners, i.e. it is exactly its own bounding rectangle.
    pub fn is_axis_aligned_rectangle(&self) -> bool {
        if self.points.len() != 4 {
            return false;
        }
        let axis_aligned = self.segments().all(|(a, b)| {
            (a.x - b.x).abs() <= PLANAR_TOLERANCE || (a.y - b.y).abs() <= PLANAR_TOLERANCE
        });
        let bounds = self.bounds();
        let on_corners = self.points.iter().all(|p| {
            ((p.x - bounds.min.x).abs() <= PLANAR_TOLERANCE
                || (p.x - bounds.max.x).abs() <= PLANAR_TOLERANCE)
                && ((p.y - bounds.min.y).abs() <= PLANAR_TOLERANCE
                    || (p.y - bounds.max.y).abs() <= PLANAR_TOLERANCE)
        });
        axis_aligned && on_corners
    }

    /// Signed planar area (counter-clockwise positive), shoelace formula.
    pub fn signed_area(&self) -> f64 {
        self.segments().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }
}
