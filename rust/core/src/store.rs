// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Queries the engine runs against a model store.

use spacemark_geometry::{GeometryKernel, Outline, Point3, SolidKey};

use crate::element::GeometricElement;
use crate::error::Result;
use crate::ids::{ElementId, LevelId, Phase, RoomId};
use crate::room::{Level, Room};

/// Read access used by the room matcher.
pub trait ModelStore {
    type Element: GeometricElement;

    fn element(&self, id: ElementId) -> Option<&Self::Element>;

    fn level(&self, id: LevelId) -> Option<&Level>;

    fn room(&self, id: RoomId) -> Option<&Room>;

    /// Rooms of `phase` whose outline intersects `outline`, in model order.
    ///
    /// With `candidates`, only those rooms are considered.
    fn rooms_intersecting(
        &self,
        outline: &Outline,
        phase: &Phase,
        candidates: Option<&[RoomId]>,
    ) -> Vec<RoomId>;

    /// Elements that depend on `element` (directly or through other
    /// dependents) and whose solids intersect `solid`.
    fn dependent_elements_intersecting<K>(
        &self,
        element: ElementId,
        solid: SolidKey,
        kernel: &K,
    ) -> Vec<ElementId>
    where
        K: GeometryKernel + ?Sized;
}

/// Rooms on either side of a door for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoorRooms {
    pub to_room: Option<RoomId>,
    pub from_room: Option<RoomId>,
}

impl DoorRooms {
    /// Distinct rooms touched by the door, to-room first.
    pub fn rooms(&self) -> impl Iterator<Item = RoomId> {
        let to = self.to_room;
        let from = self.from_room.filter(|&r| Some(r) != to);
        to.into_iter().chain(from)
    }
}

/// Access used by the door numbering pass.
pub trait DoorModel {
    /// Rooms connected by `door` in `phase`; `None` when `door` is not a door.
    fn door_rooms(&self, door: ElementId, phase: &Phase) -> Option<DoorRooms>;

    fn room(&self, id: RoomId) -> Option<&Room>;

    /// Representative position of the door.
    fn door_center(&self, door: ElementId) -> Option<Point3<f64>>;

    fn mark(&self, door: ElementId) -> Option<&str>;

    fn set_mark(&mut self, door: ElementId, mark: &str) -> Result<()>;
}
