// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placed building elements and the capabilities the room matcher reads.

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use spacemark_geometry::{BoundingBox, Point3, SolidKey};

use crate::ids::{ElementId, LevelId, Phase, RoomId};

/// Per-phase values, e.g. the room an instance reports for each phase.
pub type PhaseMap<T> = FxHashMap<Phase, T>;

/// Parameter name door marks are written to.
pub const MARK_PARAMETER: &str = "Mark";

/// Where an element is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    Point(Point3<f64>),
    Curve {
        start: Point3<f64>,
        end: Point3<f64>,
    },
}

impl Location {
    /// Point used for level projection. Curves use their end point.
    pub fn anchor(&self) -> Point3<f64> {
        match *self {
            Location::Point(p) => p,
            Location::Curve { end, .. } => end,
        }
    }
}

/// What kind of element this is, with the room relationships the host model
/// stores for it.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Equipment, furniture and other family instances with a `room` slot.
    Instance { rooms: PhaseMap<RoomId> },
    /// Doors connect two rooms, recorded per phase.
    Door {
        to_room: PhaseMap<RoomId>,
        from_room: PhaseMap<RoomId>,
    },
    Wall,
    CurtainSystem,
    Annotation,
}

impl ElementKind {
    pub fn instance() -> Self {
        ElementKind::Instance {
            rooms: PhaseMap::default(),
        }
    }

    pub fn door() -> Self {
        ElementKind::Door {
            to_room: PhaseMap::default(),
            from_room: PhaseMap::default(),
        }
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        matches!(self, ElementKind::Door { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Instance { .. } => "instance",
            ElementKind::Door { .. } => "door",
            ElementKind::Wall => "wall",
            ElementKind::CurtainSystem => "curtain_system",
            ElementKind::Annotation => "annotation",
        }
    }
}

/// Capabilities the room matcher needs from an element.
///
/// Each accessor answers "not available" with `None` or an empty slice, so
/// the matcher never inspects element kinds itself.
pub trait GeometricElement {
    fn id(&self) -> ElementId;

    /// Bounding box in model coordinates. May be disabled.
    fn bounding_box(&self) -> Option<&BoundingBox>;

    fn solids(&self) -> &[SolidKey];

    /// Rooms the element itself reports for `phase`.
    ///
    /// `Some` only when every relationship slot of the element is filled for
    /// the phase (an instance's room; both sides of a door).
    fn self_reported_rooms(&self, phase: &Phase) -> Option<SmallVec<[RoomId; 2]>>;

    fn level(&self) -> Option<LevelId>;

    fn location(&self) -> Option<&Location>;
}

impl<T: GeometricElement + ?Sized> GeometricElement for &T {
    fn id(&self) -> ElementId {
        (**self).id()
    }

    fn bounding_box(&self) -> Option<&BoundingBox> {
        (**self).bounding_box()
    }

    fn solids(&self) -> &[SolidKey] {
        (**self).solids()
    }

    fn self_reported_rooms(&self, phase: &Phase) -> Option<SmallVec<[RoomId; 2]>> {
        (**self).self_reported_rooms(phase)
    }

    fn level(&self) -> Option<LevelId> {
        (**self).level()
    }

    fn location(&self) -> Option<&Location> {
        (**self).location()
    }
}

/// A building element stored in a [`crate::Document`].
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub kind: ElementKind,
    pub bounding_box: Option<BoundingBox>,
    pub solids: Vec<SolidKey>,
    pub level: Option<LevelId>,
    pub location: Option<Location>,
    /// Element this one is nested in or hosted by.
    pub host: Option<ElementId>,
    pub parameters: FxHashMap<String, String>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            name: String::new(),
            kind,
            bounding_box: None,
            solids: Vec::new(),
            level: None,
            location: None,
            host: None,
            parameters: FxHashMap::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn with_solids(mut self, solids: Vec<SolidKey>) -> Self {
        self.solids = solids;
        self
    }

    pub fn with_level(mut self, level: LevelId) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_host(mut self, host: ElementId) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Record the room an instance reports for `phase`. No-op for other kinds.
    pub fn with_room(mut self, phase: Phase, room: RoomId) -> Self {
        if let ElementKind::Instance { rooms } = &mut self.kind {
            rooms.insert(phase, room);
        }
        self
    }

    /// Record the rooms a door connects for `phase`. No-op for other kinds.
    pub fn with_door_rooms(
        mut self,
        phase: Phase,
        to_room: Option<RoomId>,
        from_room: Option<RoomId>,
    ) -> Self {
        if let ElementKind::Door {
            to_room: to,
            from_room: from,
        } = &mut self.kind
        {
            if let Some(room) = to_room {
                to.insert(phase.clone(), room);
            }
            if let Some(room) = from_room {
                from.insert(phase, room);
            }
        }
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

impl GeometricElement for Element {
    #[inline]
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    fn solids(&self) -> &[SolidKey] {
        &self.solids
    }

    fn self_reported_rooms(&self, phase: &Phase) -> Option<SmallVec<[RoomId; 2]>> {
        match &self.kind {
            ElementKind::Instance { rooms } => rooms.get(phase).map(|&room| smallvec![room]),
            ElementKind::Door { to_room, from_room } => {
                let (&to, &from) = (to_room.get(phase)?, from_room.get(phase)?);
                if to == from {
                    Some(smallvec![to])
                } else {
                    Some(smallvec![to, from])
                }
            }
            ElementKind::Wall | ElementKind::CurtainSystem | ElementKind::Annotation => None,
        }
    }

    fn level(&self) -> Option<LevelId> {
        self.level
    }

    fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}
