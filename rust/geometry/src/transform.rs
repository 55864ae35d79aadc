// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement transforms for linked documents.
//!
//! A link instance places a referenced document in the host's coordinate
//! space. Queries against the linked document's rooms run in the link's own
//! space, so host-side geometry is carried across with [`Transform::inverse`].

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use crate::error::{Error, Result};

/// Affine transform stored as a 4x4 matrix mapping local to parent coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from 16 values in column-major order (the layout nalgebra stores).
    pub fn from_column_slice(values: &[f64; 16]) -> Self {
        Self {
            matrix: Matrix4::from_column_slice(values),
        }
    }

    pub fn from_translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    /// Rotation about the Z axis by `angle` radians, then translation.
    ///
    /// This is the usual shape of a link placement: project north rotation
    /// plus a shared-coordinate offset.
    pub fn from_translation_rotation_z(translation: Vector3<f64>, angle: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous();
        let translation = Matrix4::new_translation(&translation);
        Self {
            matrix: translation * rotation,
        }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// The inverse transform (parent to local).
    pub fn inverse(&self) -> Result<Transform> {
        self.matrix
            .try_inverse()
            .map(|matrix| Transform { matrix })
            .ok_or(Error::SingularTransform)
    }

    /// Transform composition: `self.then(other)` applies `self` first.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
        }
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    #[inline]
    pub fn apply_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_vector(vector)
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn inverse_round_trips_point() {
        let t = Transform::from_translation_rotation_z(Vector3::new(5.0, -3.0, 1.0), 0.3);
        let inv = t.inverse().unwrap();

        let p = Point3::new(1.0, 2.0, 3.0);
        let back = inv.apply(&t.apply(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-10);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-10);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-10);
    }

    #[test]
    fn quarter_turn_then_translate() {
        let t = Transform::from_translation_rotation_z(Vector3::new(10.0, 0.0, 0.0), FRAC_PI_2);
        let p = t.apply(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-10);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let t = Transform::from_matrix(Matrix4::zeros());
        assert!(matches!(t.inverse(), Err(Error::SingularTransform)));
    }

    #[test]
    fn then_applies_left_first() {
        let a = Transform::from_translation(1.0, 0.0, 0.0);
        let b = Transform::from_translation_rotation_z(Vector3::zeros(), FRAC_PI_2);
        let p = a.then(&b).apply(&Point3::origin());
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn vectors_ignore_translation() {
        let t = Transform::from_translation(4.0, 4.0, 4.0);
        let v = t.apply_vector(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, 0.0);
        assert!(Transform::default().is_identity());
    }
}
