// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory model store.
//!
//! Entities are kept in insertion order (the order rooms are returned from
//! outline queries) with id indices on the side. Hosted elements are indexed
//! by their host so dependent lookups do not scan the model.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use spacemark_geometry::{GeometryKernel, Outline, Point3, SolidKey, VOLUME_TOLERANCE};

use crate::element::{Element, ElementKind, GeometricElement, MARK_PARAMETER};
use crate::error::{Error, Result};
use crate::ids::{ElementId, LevelId, Phase, RoomId};
use crate::link::LinkInstance;
use crate::room::{Level, Room};
use crate::store::{DoorModel, DoorRooms, ModelStore};

#[derive(Debug, Clone, Default)]
pub struct Document {
    name: String,
    phases: Vec<Phase>,
    levels: Vec<Level>,
    level_index: FxHashMap<LevelId, usize>,
    rooms: Vec<Room>,
    room_index: FxHashMap<RoomId, usize>,
    elements: Vec<Element>,
    element_index: FxHashMap<ElementId, usize>,
    /// host -> directly hosted elements
    dependents: FxHashMap<ElementId, SmallVec<[ElementId; 4]>>,
    links: Vec<LinkInstance>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a phase. Phases are kept in chronological (insertion) order.
    pub fn add_phase(&mut self, phase: Phase) {
        if !self.phases.contains(&phase) {
            self.phases.push(phase);
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Latest registered phase, the usual default for queries.
    pub fn last_phase(&self) -> Option<&Phase> {
        self.phases.last()
    }

    pub fn add_level(&mut self, level: Level) -> Result<()> {
        if self.level_index.contains_key(&level.id) {
            return Err(Error::DuplicateId(format!("level {}", level.id)));
        }
        self.level_index.insert(level.id, self.levels.len());
        self.levels.push(level);
        Ok(())
    }

    pub fn add_room(&mut self, room: Room) -> Result<()> {
        if self.room_index.contains_key(&room.id) {
            return Err(Error::DuplicateId(format!("room {}", room.id)));
        }
        self.add_phase(room.phase.clone());
        self.room_index.insert(room.id, self.rooms.len());
        self.rooms.push(room);
        Ok(())
    }

    pub fn add_element(&mut self, element: Element) -> Result<()> {
        if self.element_index.contains_key(&element.id) {
            return Err(Error::DuplicateId(format!("element {}", element.id)));
        }
        if let Some(level) = element.level {
            if !self.level_index.contains_key(&level) {
                return Err(Error::LevelNotFound(level));
            }
        }
        if let Some(host) = element.host {
            self.dependents.entry(host).or_default().push(element.id);
        }
        self.element_index.insert(element.id, self.elements.len());
        self.elements.push(element);
        Ok(())
    }

    pub fn add_link(&mut self, link: LinkInstance) {
        self.links.push(link);
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.level_index.get(&id).map(|&i| &self.levels[i])
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.room_index.get(&id).map(|&i| &self.rooms[i])
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.element_index.get(&id).map(|&i| &self.elements[i])
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.element_index.get(&id).map(|&i| &mut self.elements[i])
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn links(&self) -> &[LinkInstance] {
        &self.links
    }

    pub fn link(&self, name: &str) -> Option<&LinkInstance> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Ids of all doors, in model order.
    pub fn door_ids(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.kind.is_door())
            .map(|e| e.id)
            .collect()
    }

    /// Rooms belonging to `phase`, in model order.
    pub fn room_ids(&self, phase: &Phase) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| &r.phase == phase)
            .map(|r| r.id)
            .collect()
    }

    pub fn parameter(&self, element: ElementId, name: &str) -> Option<&str> {
        self.element(element)?.parameter(name)
    }

    pub fn set_parameter(&mut self, element: ElementId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(element)
            .ok_or(Error::ElementNotFound(element))?;
        element.parameters.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// All elements hosted by `element`, transitively, breadth first.
    pub fn dependents_of(&self, element: ElementId) -> Vec<ElementId> {
        let mut seen = FxHashSet::default();
        let mut queue = vec![element];
        let mut result = Vec::new();
        let mut head = 0;

        seen.insert(element);
        while head < queue.len() {
            let current = queue[head];
            head += 1;
            if let Some(children) = self.dependents.get(&current) {
                for &child in children {
                    if seen.insert(child) {
                        queue.push(child);
                        result.push(child);
                    }
                }
            }
        }
        result
    }
}

impl ModelStore for Document {
    type Element = Element;

    fn element(&self, id: ElementId) -> Option<&Element> {
        Document::element(self, id)
    }

    fn level(&self, id: LevelId) -> Option<&Level> {
        Document::level(self, id)
    }

    fn room(&self, id: RoomId) -> Option<&Room> {
        Document::room(self, id)
    }

    fn rooms_intersecting(
        &self,
        outline: &Outline,
        phase: &Phase,
        candidates: Option<&[RoomId]>,
    ) -> Vec<RoomId> {
        let allowed: Option<FxHashSet<RoomId>> = candidates.map(|c| c.iter().copied().collect());

        self.rooms
            .iter()
            .filter(|room| &room.phase == phase)
            .filter(|room| allowed.as_ref().map_or(true, |a| a.contains(&room.id)))
            .filter(|room| room.outline.as_ref().is_some_and(|o| o.intersects(outline)))
            .map(|room| room.id)
            .collect()
    }

    fn dependent_elements_intersecting<K>(
        &self,
        element: ElementId,
        solid: SolidKey,
        kernel: &K,
    ) -> Vec<ElementId>
    where
        K: GeometryKernel + ?Sized,
    {
        self.dependents_of(element)
            .into_iter()
            .filter(|&id| {
                let Some(dependent) = Document::element(self, id) else {
                    return false;
                };
                dependent.solids().iter().any(|&own| {
                    match kernel.intersection_volume(own, solid) {
                        Ok(volume) => volume > VOLUME_TOLERANCE,
                        Err(e) => {
                            tracing::warn!(
                                element = %id,
                                error = %e,
                                "Dependent element intersection failed"
                            );
                            false
                        }
                    }
                })
            })
            .collect()
    }
}

impl DoorModel for Document {
    fn door_rooms(&self, door: ElementId, phase: &Phase) -> Option<DoorRooms> {
        match &Document::element(self, door)?.kind {
            ElementKind::Door { to_room, from_room } => Some(DoorRooms {
                to_room: to_room.get(phase).copied(),
                from_room: from_room.get(phase).copied(),
            }),
            _ => None,
        }
    }

    fn room(&self, id: RoomId) -> Option<&Room> {
        Document::room(self, id)
    }

    fn door_center(&self, door: ElementId) -> Option<Point3<f64>> {
        let element = Document::element(self, door)?;
        element
            .location
            .as_ref()
            .map(|l| l.anchor())
            .or_else(|| element.bounding_box.map(|b| b.outline.center()))
    }

    fn mark(&self, door: ElementId) -> Option<&str> {
        self.parameter(door, MARK_PARAMETER)
    }

    fn set_mark(&mut self, door: ElementId, mark: &str) -> Result<()> {
        let element = self.element_mut(door).ok_or(Error::ElementNotFound(door))?;
        if !element.kind.is_door() {
            return Err(Error::NotADoor(door));
        }
        element
            .parameters
            .insert(MARK_PARAMETER.to_string(), mark.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacemark_geometry::{BoundingBox, BoxKernel};

    fn phase() -> Phase {
        Phase::from("New Construction")
    }

    fn boxed(min: [f64; 3], max: [f64; 3]) -> Outline {
        Outline::new(Point3::from(min), Point3::from(max))
    }

    fn room(kernel: &BoxKernel, id: u64, phase: Phase, min: [f64; 3], max: [f64; 3]) -> Room {
        let solid = kernel.insert_box(boxed(min, max));
        Room::new(RoomId(id), id.to_string(), phase)
            .with_geometry(kernel, vec![solid])
            .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut doc = Document::new("test");
        doc.add_level(Level::new(LevelId(1), "L1", 0.0)).unwrap();
        assert!(matches!(
            doc.add_level(Level::new(LevelId(1), "L1 again", 3.0)),
            Err(Error::DuplicateId(_))
        ));

        doc.add_element(Element::new(ElementId(1), ElementKind::Wall)).unwrap();
        assert!(doc.add_element(Element::new(ElementId(1), ElementKind::Wall)).is_err());
    }

    #[test]
    fn element_on_unknown_level_is_rejected() {
        let mut doc = Document::new("test");
        let element = Element::new(ElementId(1), ElementKind::Wall).with_level(LevelId(9));
        assert!(matches!(doc.add_element(element), Err(Error::LevelNotFound(_))));
    }

    #[test]
    fn rooms_intersecting_filters_phase_and_candidates() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        doc.add_room(room(&kernel, 1, phase(), [0.0, 0.0, 0.0], [5.0, 5.0, 3.0])).unwrap();
        doc.add_room(room(&kernel, 2, phase(), [5.0, 0.0, 0.0], [10.0, 5.0, 3.0])).unwrap();
        doc.add_room(room(&kernel, 3, Phase::from("Existing"), [0.0, 0.0, 0.0], [10.0, 5.0, 3.0]))
            .unwrap();

        let probe = boxed([4.0, 1.0, 0.0], [6.0, 2.0, 1.0]);
        assert_eq!(
            doc.rooms_intersecting(&probe, &phase(), None),
            vec![RoomId(1), RoomId(2)]
        );
        assert_eq!(
            doc.rooms_intersecting(&probe, &phase(), Some(&[RoomId(2)])),
            vec![RoomId(2)]
        );
        assert_eq!(doc.phases(), &[phase(), Phase::from("Existing")]);
    }

    #[test]
    fn dependents_are_collected_transitively() {
        let mut doc = Document::new("test");
        doc.add_element(Element::new(ElementId(1), ElementKind::instance())).unwrap();
        doc.add_element(Element::new(ElementId(2), ElementKind::instance()).with_host(ElementId(1)))
            .unwrap();
        doc.add_element(Element::new(ElementId(3), ElementKind::instance()).with_host(ElementId(2)))
            .unwrap();
        doc.add_element(Element::new(ElementId(4), ElementKind::Wall)).unwrap();

        assert_eq!(doc.dependents_of(ElementId(1)), vec![ElementId(2), ElementId(3)]);
        assert!(doc.dependents_of(ElementId(4)).is_empty());
    }

    #[test]
    fn dependent_intersection_uses_dependent_solids() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        let inside = kernel.insert_box(boxed([1.0, 1.0, 0.0], [2.0, 2.0, 1.0]));
        let outside = kernel.insert_box(boxed([20.0, 20.0, 0.0], [21.0, 21.0, 1.0]));
        doc.add_element(Element::new(ElementId(1), ElementKind::instance())).unwrap();
        doc.add_element(
            Element::new(ElementId(2), ElementKind::instance())
                .with_host(ElementId(1))
                .with_solids(vec![inside]),
        )
        .unwrap();
        doc.add_element(
            Element::new(ElementId(3), ElementKind::instance())
                .with_host(ElementId(1))
                .with_solids(vec![outside]),
        )
        .unwrap();

        let room_solid = kernel.insert_box(boxed([0.0, 0.0, 0.0], [5.0, 5.0, 3.0]));
        assert_eq!(
            doc.dependent_elements_intersecting(ElementId(1), room_solid, &kernel),
            vec![ElementId(2)]
        );
        assert_eq!(kernel.live_solids(), 3);
    }

    #[test]
    fn marks_are_written_to_doors_only() {
        let mut doc = Document::new("test");
        doc.add_element(Element::new(ElementId(1), ElementKind::door())).unwrap();
        doc.add_element(Element::new(ElementId(2), ElementKind::Wall)).unwrap();

        doc.set_mark(ElementId(1), "101A").unwrap();
        assert_eq!(doc.mark(ElementId(1)), Some("101A"));
        assert!(matches!(doc.set_mark(ElementId(2), "X"), Err(Error::NotADoor(_))));
        assert!(matches!(
            doc.set_mark(ElementId(9), "X"),
            Err(Error::ElementNotFound(_))
        ));
    }

    #[test]
    fn door_center_falls_back_to_bounding_box() {
        let mut doc = Document::new("test");
        doc.add_element(
            Element::new(ElementId(1), ElementKind::door())
                .with_bounding_box(BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0))),
        )
        .unwrap();
        assert_eq!(doc.door_center(ElementId(1)), Some(Point3::new(1.0, 1.0, 1.0)));
        assert!(doc.door_rooms(ElementId(1), &phase()).is_some());
    }
}
