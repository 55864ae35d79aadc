// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Levels and rooms.

use spacemark_geometry::{Error as GeometryError, GeometryKernel, Outline, Point3, SolidKey};

use crate::error::Result;
use crate::ids::{LevelId, Phase, RoomId};

/// A building storey. Only its elevation matters for room matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub elevation: f64,
}

impl Level {
    pub fn new(id: LevelId, name: impl Into<String>, elevation: f64) -> Self {
        Self {
            id,
            name: name.into(),
            elevation,
        }
    }
}

/// An enclosed spatial region belonging to one phase.
///
/// Rooms are read-only to the matcher. The outline is the union of the
/// bounds of all room solids; a room without an outline never matches.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    /// Human-facing number, e.g. "101". Door marks are derived from it.
    pub number: String,
    pub name: String,
    pub phase: Phase,
    pub area: f64,
    /// Representative point, usually the room tag position.
    pub location: Point3<f64>,
    pub solids: Vec<SolidKey>,
    pub outline: Option<Outline>,
}

impl Room {
    pub fn new(id: RoomId, number: impl Into<String>, phase: Phase) -> Self {
        Self {
            id,
            number: number.into(),
            name: String::new(),
            phase,
            area: 0.0,
            location: Point3::origin(),
            solids: Vec::new(),
            outline: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    pub fn with_location(mut self, location: Point3<f64>) -> Self {
        self.location = location;
        self
    }

    /// Attach solids and derive the room outline from their bounds.
    ///
    /// Empty solids contribute nothing to the outline.
    pub fn with_geometry<K>(mut self, kernel: &K, solids: Vec<SolidKey>) -> Result<Self>
    where
        K: GeometryKernel + ?Sized,
    {
        let mut outline: Option<Outline> = None;
        for &solid in &solids {
            let bounds = match kernel.bounds(solid) {
                Ok(bounds) => bounds,
                Err(GeometryError::EmptySolid(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            match outline.as_mut() {
                Some(o) => o.absorb(&bounds),
                None => outline = Some(bounds),
            }
        }
        self.solids = solids;
        self.outline = outline;
        Ok(self)
    }

    #[inline]
    pub fn has_geometry(&self) -> bool {
        self.outline.is_some() && !self.solids.is_empty()
    }
}
