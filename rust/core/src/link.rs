// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linked documents placed into a host model.

use std::sync::Arc;

use spacemark_geometry::{Outline, Point3, Transform};

use crate::document::Document;
use crate::error::Result;

/// A document placed into the host by a transform (link space to host space).
#[derive(Debug, Clone)]
pub struct LinkInstance {
    pub name: String,
    pub document: Arc<Document>,
    transform: Transform,
    inverse: Transform,
}

impl LinkInstance {
    /// Fails when `transform` cannot be inverted.
    pub fn new(name: impl Into<String>, document: Arc<Document>, transform: Transform) -> Result<Self> {
        let inverse = transform.inverse()?;
        Ok(Self {
            name: name.into(),
            document,
            transform,
            inverse,
        })
    }

    /// Link space to host space.
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Host space to link space.
    #[inline]
    pub fn inverse(&self) -> &Transform {
        &self.inverse
    }

    pub fn point_to_link(&self, point: &Point3<f64>) -> Point3<f64> {
        self.inverse.apply(point)
    }

    pub fn outline_to_link(&self, outline: &Outline) -> Outline {
        outline.transformed(&self.inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spacemark_geometry::Vector3;

    #[test]
    fn host_outline_maps_into_link_space() {
        let link = LinkInstance::new(
            "Architecture",
            Arc::new(Document::new("arch")),
            Transform::from_translation(100.0, 0.0, 0.0),
        )
        .unwrap();

        let host = Outline::new(Point3::new(101.0, 0.0, 0.0), Point3::new(102.0, 1.0, 1.0));
        let local = link.outline_to_link(&host);
        assert_relative_eq!(local.min.x, 1.0);
        assert_relative_eq!(local.max.x, 2.0);
    }

    #[test]
    fn rotated_link_round_trips_points() {
        let transform = Transform::from_translation_rotation_z(
            Vector3::new(10.0, 5.0, 0.0),
            std::f64::consts::FRAC_PI_2,
        );
        let link = LinkInstance::new("l", Arc::new(Document::new("l")), transform).unwrap();

        let p = Point3::new(3.0, 4.0, 2.0);
        let back = link.transform().apply(&link.point_to_link(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-9);
    }

    #[test]
    fn singular_transform_is_rejected() {
        let flat = Transform::from_column_slice(&[0.0; 16]);
        assert!(LinkInstance::new("bad", Arc::new(Document::new("bad")), flat).is_err());
    }
}
