// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room matching for freestanding elements.
//!
//! An element is matched to rooms by a series of tiers, cheapest first; the
//! first tier that yields rooms wins:
//!
//! 1. the rooms the element reports itself
//! 2. rooms whose outline intersects the element's grown outline (this only
//!    narrows the candidate set for the following tiers)
//! 3. rooms whose solids overlap the element's solids
//! 4. rooms whose solids overlap an element nested in or hosted by this one
//! 5. the single room overlapping the element's grown outline the most
//!
//! Geometry failures for one element/room pair are logged and count as "no
//! overlap"; nothing in here mutates the model.

use serde::{Deserialize, Serialize};
use spacemark_core::{ElementId, GeometricElement, LinkInstance, ModelStore, Phase, RoomId};
use spacemark_geometry::{
    make_solid, GeometryKernel, Outline, Point3, ScopedSolid, SolidKey, Transform, VOLUME_TOLERANCE,
};

use crate::options::ResolveOptions;

/// The tier that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    SelfReported,
    SolidIntersection,
    DependentElements,
    BoundingVolume,
}

/// Matched rooms and the tier that found them. `tier` is `None` when no
/// tier matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub rooms: Vec<RoomId>,
    pub tier: Option<Tier>,
}

impl Resolution {
    fn unmatched() -> Self {
        Self {
            rooms: Vec::new(),
            tier: None,
        }
    }

    fn matched(rooms: Vec<RoomId>, tier: Tier) -> Self {
        if rooms.is_empty() {
            Self::unmatched()
        } else {
            Self {
                rooms,
                tier: Some(tier),
            }
        }
    }
}

/// Matches elements of a host model to rooms, in the host itself or in a
/// linked document.
///
/// Holds only shared references, so one resolver can serve many threads when
/// the model and kernel are `Sync`.
pub struct RoomResolver<'a, M, K: ?Sized> {
    model: &'a M,
    kernel: &'a K,
}

impl<'a, M, K> RoomResolver<'a, M, K>
where
    M: ModelStore,
    K: GeometryKernel + ?Sized,
{
    pub fn new(model: &'a M, kernel: &'a K) -> Self {
        Self { model, kernel }
    }

    #[inline]
    pub fn model(&self) -> &'a M {
        self.model
    }

    #[inline]
    pub fn kernel(&self) -> &'a K {
        self.kernel
    }

    /// Rooms containing `element` in `phase`. Empty when nothing matched or
    /// the element has no usable bounding box.
    pub fn resolve_rooms<E>(
        &self,
        element: &E,
        phase: &Phase,
        candidates: Option<&[RoomId]>,
        options: &ResolveOptions,
    ) -> Vec<RoomId>
    where
        E: GeometricElement + ?Sized,
    {
        self.resolve(element, phase, candidates, options)
            .map(|r| r.rooms)
            .unwrap_or_default()
    }

    /// Like [`Self::resolve_rooms`], also reporting the winning tier.
    ///
    /// `None` means the element could not be evaluated (missing or disabled
    /// bounding box).
    pub fn resolve<E>(
        &self,
        element: &E,
        phase: &Phase,
        candidates: Option<&[RoomId]>,
        options: &ResolveOptions,
    ) -> Option<Resolution>
    where
        E: GeometricElement + ?Sized,
    {
        let id = element.id();

        if let Some(rooms) = element.self_reported_rooms(phase) {
            tracing::debug!(element = %id, rooms = rooms.len(), "Element reports its own rooms");
            return Some(Resolution::matched(rooms.to_vec(), Tier::SelfReported));
        }

        let outline = self.element_outline(element, options)?;
        let candidates = self.model.rooms_intersecting(&outline, phase, candidates);
        tracing::debug!(element = %id, candidates = candidates.len(), "Narrowed rooms by outline");
        if candidates.is_empty() {
            return Some(Resolution::unmatched());
        }

        let tiers = Tiers {
            kernel: self.kernel,
            rooms: self.model,
            host: self.model,
            element: id,
            room_to_host: None,
        };
        Some(tiers.run(element.solids(), &outline, &candidates))
    }

    /// Rooms of a linked document containing `element`.
    ///
    /// The element stays in host space; its outline and solids are mapped into
    /// the link for the room tests. Self-reported rooms do not apply since
    /// they always refer to the host's own rooms.
    pub fn resolve_rooms_in_link<E>(
        &self,
        element: &E,
        phase: &Phase,
        link: &LinkInstance,
        candidates: Option<&[RoomId]>,
        options: &ResolveOptions,
    ) -> Vec<RoomId>
    where
        E: GeometricElement + ?Sized,
    {
        self.resolve_in_link(element, phase, link, candidates, options)
            .map(|r| r.rooms)
            .unwrap_or_default()
    }

    pub fn resolve_in_link<E>(
        &self,
        element: &E,
        phase: &Phase,
        link: &LinkInstance,
        candidates: Option<&[RoomId]>,
        options: &ResolveOptions,
    ) -> Option<Resolution>
    where
        E: GeometricElement + ?Sized,
    {
        let id = element.id();
        let outline = link.outline_to_link(&self.element_outline(element, options)?);

        let rooms = link.document.as_ref();
        let candidates = rooms.rooms_intersecting(&outline, phase, candidates);
        tracing::debug!(
            element = %id,
            link = %link.name,
            candidates = candidates.len(),
            "Narrowed linked rooms by outline"
        );
        if candidates.is_empty() {
            return Some(Resolution::unmatched());
        }

        // Element solids moved into link space; released when this returns.
        let moved: Vec<ScopedSolid<'_, K>> = element
            .solids()
            .iter()
            .filter_map(|&solid| match self.kernel.transformed(solid, link.inverse()) {
                Ok(key) => Some(ScopedSolid::new(self.kernel, key)),
                Err(e) => {
                    tracing::warn!(element = %id, error = %e, "Could not move element solid into link");
                    None
                }
            })
            .collect();
        let solids: Vec<SolidKey> = moved.iter().map(ScopedSolid::key).collect();

        let tiers = Tiers {
            kernel: self.kernel,
            rooms,
            host: self.model,
            element: id,
            room_to_host: Some(link.transform()),
        };
        Some(tiers.run(&solids, &outline, &candidates))
    }

    /// Bounding box grown by the offset and stretched to the level elevation.
    fn element_outline<E>(&self, element: &E, options: &ResolveOptions) -> Option<Outline>
    where
        E: GeometricElement + ?Sized,
    {
        let Some(bbox) = element.bounding_box().and_then(|b| b.usable()) else {
            tracing::warn!(element = %element.id(), "Element has no usable bounding box");
            return None;
        };

        let mut outline = bbox.expanded(options.offset);
        if options.project_to_level {
            let level = element.level().and_then(|l| self.model.level(l));
            if let (Some(location), Some(level)) = (element.location(), level) {
                let anchor = location.anchor();
                outline.absorb_point(&Point3::new(anchor.x, anchor.y, level.elevation));
            }
        }
        Some(outline)
    }
}

/// Geometric tiers 3 to 5 over one room store.
///
/// `rooms` holds the candidate rooms and `host` the element; they differ for
/// linked documents, where `room_to_host` maps room solids back into host
/// space for the dependent-element query.
struct Tiers<'a, R, H, K: ?Sized> {
    kernel: &'a K,
    rooms: &'a R,
    host: &'a H,
    element: ElementId,
    room_to_host: Option<&'a Transform>,
}

impl<'a, R, H, K> Tiers<'a, R, H, K>
where
    R: ModelStore,
    H: ModelStore,
    K: GeometryKernel + ?Sized,
{
    fn run(&self, solids: &[SolidKey], outline: &Outline, candidates: &[RoomId]) -> Resolution {
        let rooms = self.solid_intersection(solids, candidates);
        if !rooms.is_empty() {
            tracing::debug!(element = %self.element, rooms = rooms.len(), "Matched by solid intersection");
            return Resolution::matched(rooms, Tier::SolidIntersection);
        }

        let rooms = self.dependent_elements(candidates);
        if !rooms.is_empty() {
            tracing::debug!(element = %self.element, rooms = rooms.len(), "Matched through dependent elements");
            return Resolution::matched(rooms, Tier::DependentElements);
        }

        let rooms = self.bounding_volume(outline, candidates);
        if !rooms.is_empty() {
            tracing::debug!(element = %self.element, "Matched by bounding volume");
            return Resolution::matched(rooms, Tier::BoundingVolume);
        }

        tracing::debug!(element = %self.element, "No room matched");
        Resolution::unmatched()
    }

    /// Volume shared by two solids, `None` when the kernel fails.
    fn overlap(&self, a: SolidKey, b: SolidKey) -> Option<f64> {
        match self.kernel.intersection_volume(a, b) {
            Ok(volume) => Some(volume),
            Err(e) => {
                tracing::warn!(element = %self.element, error = %e, "Solid intersection failed");
                None
            }
        }
    }

    fn solid_intersection(&self, solids: &[SolidKey], candidates: &[RoomId]) -> Vec<RoomId> {
        if solids.is_empty() {
            return Vec::new();
        }

        let mut matched = Vec::new();
        for &id in candidates {
            let Some(room) = self.rooms.room(id) else {
                continue;
            };
            let hit = room.solids.iter().any(|&room_solid| {
                solids.iter().any(|&solid| {
                    self.overlap(solid, room_solid)
                        .is_some_and(|v| v > VOLUME_TOLERANCE)
                })
            });
            if hit && !matched.contains(&id) {
                matched.push(id);
            }
        }
        matched
    }

    fn dependent_elements(&self, candidates: &[RoomId]) -> Vec<RoomId> {
        let mut matched = Vec::new();
        for &id in candidates {
            let Some(room) = self.rooms.room(id) else {
                continue;
            };
            let hit = room.solids.iter().any(|&room_solid| match self.room_to_host {
                None => !self
                    .host
                    .dependent_elements_intersecting(self.element, room_solid, self.kernel)
                    .is_empty(),
                Some(transform) => match self.kernel.transformed(room_solid, transform) {
                    Ok(key) => {
                        let moved = ScopedSolid::new(self.kernel, key);
                        !self
                            .host
                            .dependent_elements_intersecting(self.element, moved.key(), self.kernel)
                            .is_empty()
                    }
                    Err(e) => {
                        tracing::warn!(room = %id, error = %e, "Could not move room solid into host");
                        false
                    }
                },
            });
            if hit && !matched.contains(&id) {
                matched.push(id);
            }
        }
        matched
    }

    fn bounding_volume(&self, outline: &Outline, candidates: &[RoomId]) -> Vec<RoomId> {
        let coarse = match make_solid(self.kernel, &outline.min, &outline.max) {
            Ok(solid) => solid,
            Err(e) => {
                tracing::warn!(element = %self.element, error = %e, "Could not build bounding volume");
                return Vec::new();
            }
        };

        let mut best: Option<(RoomId, f64)> = None;
        for &id in candidates {
            let Some(room) = self.rooms.room(id) else {
                continue;
            };
            let volume: f64 = room
                .solids
                .iter()
                .filter_map(|&room_solid| self.overlap(coarse.key(), room_solid))
                .sum();
            if volume > VOLUME_TOLERANCE && best.map_or(true, |(_, v)| volume > v) {
                best = Some((id, volume));
            }
        }
        best.map(|(id, _)| vec![id]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacemark_core::{Document, Element, ElementKind, Level, LevelId, Location, Room};
    use spacemark_geometry::{BoundingBox, BoxKernel};

    fn phase() -> Phase {
        Phase::from("New Construction")
    }

    fn boxed(min: [f64; 3], max: [f64; 3]) -> Outline {
        Outline::new(Point3::from(min), Point3::from(max))
    }

    fn add_room(doc: &mut Document, kernel: &BoxKernel, id: u64, min: [f64; 3], max: [f64; 3]) {
        let solid = kernel.insert_box(boxed(min, max));
        let room = Room::new(RoomId(id), id.to_string(), phase())
            .with_geometry(kernel, vec![solid])
            .unwrap();
        doc.add_room(room).unwrap();
    }

    fn solid_element(kernel: &BoxKernel, id: u64, min: [f64; 3], max: [f64; 3]) -> Element {
        let solid = kernel.insert_box(boxed(min, max));
        Element::new(ElementId(id), ElementKind::instance())
            .with_bounding_box(BoundingBox::from(boxed(min, max)))
            .with_solids(vec![solid])
    }

    #[test]
    fn level_projection_reaches_room_below() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        doc.add_level(Level::new(LevelId(1), "L1", 0.0)).unwrap();
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);

        // ceiling-hung fixture floating above the room volume
        let fixture = Element::new(ElementId(10), ElementKind::instance())
            .with_bounding_box(BoundingBox::from(boxed([1.0, 1.0, 4.0], [2.0, 2.0, 4.5])))
            .with_level(LevelId(1))
            .with_location(Location::Point(Point3::new(1.5, 1.5, 4.0)));
        doc.add_element(fixture.clone()).unwrap();

        let resolver = RoomResolver::new(&doc, &kernel);
        let exact = ResolveOptions::exact();
        assert!(resolver.resolve_rooms(&fixture, &phase(), None, &exact).is_empty());

        let projected = ResolveOptions::exact().with_project_to_level(true);
        let resolution = resolver.resolve(&fixture, &phase(), None, &projected).unwrap();
        assert_eq!(resolution.rooms, vec![RoomId(1)]);
        assert_eq!(resolution.tier, Some(Tier::BoundingVolume));
    }

    #[test]
    fn solid_intersection_returns_every_overlapping_room() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);
        add_room(&mut doc, &kernel, 2, [5.0, 0.0, 0.0], [10.0, 5.0, 3.0]);

        let duct = solid_element(&kernel, 10, [4.0, 2.0, 2.0], [6.0, 3.0, 2.5]);
        let resolver = RoomResolver::new(&doc, &kernel);
        let resolution = resolver
            .resolve(&duct, &phase(), None, &ResolveOptions::exact())
            .unwrap();

        assert_eq!(resolution.rooms, vec![RoomId(1), RoomId(2)]);
        assert_eq!(resolution.tier, Some(Tier::SolidIntersection));
    }

    #[test]
    fn bounding_volume_keeps_the_largest_overlap_only() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);
        add_room(&mut doc, &kernel, 2, [5.0, 0.0, 0.0], [10.0, 5.0, 3.0]);

        // no solids: only the coarse volume can decide, and it leans into room 2
        let tag = Element::new(ElementId(10), ElementKind::instance())
            .with_bounding_box(BoundingBox::from(boxed([4.5, 1.0, 1.0], [7.0, 2.0, 2.0])));
        let resolver = RoomResolver::new(&doc, &kernel);
        let resolution = resolver
            .resolve(&tag, &phase(), None, &ResolveOptions::exact())
            .unwrap();

        assert_eq!(resolution.rooms, vec![RoomId(2)]);
        assert_eq!(resolution.tier, Some(Tier::BoundingVolume));
        assert_eq!(kernel.live_solids(), 2);
    }

    #[test]
    fn dependent_elements_match_when_host_has_no_solids() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);
        add_room(&mut doc, &kernel, 2, [5.0, 0.0, 0.0], [10.0, 5.0, 3.0]);

        let assembly = Element::new(ElementId(10), ElementKind::instance())
            .with_bounding_box(BoundingBox::from(boxed([3.0, 1.0, 0.0], [8.0, 2.0, 1.0])));
        doc.add_element(assembly.clone()).unwrap();
        doc.add_element(
            solid_element(&kernel, 11, [6.0, 1.0, 0.0], [7.0, 2.0, 1.0]).with_host(ElementId(10)),
        )
        .unwrap();

        let resolver = RoomResolver::new(&doc, &kernel);
        let resolution = resolver
            .resolve(&assembly, &phase(), None, &ResolveOptions::exact())
            .unwrap();
        assert_eq!(resolution.rooms, vec![RoomId(2)]);
        assert_eq!(resolution.tier, Some(Tier::DependentElements));
    }

    #[test]
    fn failing_pair_is_skipped_not_fatal() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);
        add_room(&mut doc, &kernel, 2, [5.0, 0.0, 0.0], [10.0, 5.0, 3.0]);
        let broken = doc.room(RoomId(1)).unwrap().solids[0];
        kernel.mark_unevaluable(broken);

        let duct = solid_element(&kernel, 10, [4.0, 2.0, 2.0], [6.0, 3.0, 2.5]);
        let resolver = RoomResolver::new(&doc, &kernel);
        let rooms = resolver.resolve_rooms(&duct, &phase(), None, &ResolveOptions::exact());

        assert_eq!(rooms, vec![RoomId(2)]);
        // room solids + element solid; every intermediate released
        assert_eq!(kernel.live_solids(), 3);
    }

    #[test]
    fn candidate_subset_limits_matches() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);
        add_room(&mut doc, &kernel, 2, [5.0, 0.0, 0.0], [10.0, 5.0, 3.0]);

        let duct = solid_element(&kernel, 10, [4.0, 2.0, 2.0], [6.0, 3.0, 2.5]);
        let resolver = RoomResolver::new(&doc, &kernel);
        let rooms = resolver.resolve_rooms(
            &duct,
            &phase(),
            Some(&[RoomId(2)]),
            &ResolveOptions::exact(),
        );
        assert_eq!(rooms, vec![RoomId(2)]);
    }

    #[test]
    fn rooms_of_other_phases_are_ignored() {
        let kernel = BoxKernel::new();
        let mut doc = Document::new("test");
        add_room(&mut doc, &kernel, 1, [0.0, 0.0, 0.0], [5.0, 5.0, 3.0]);

        let chair = solid_element(&kernel, 10, [1.0, 1.0, 0.0], [2.0, 2.0, 1.0]);
        let resolver = RoomResolver::new(&doc, &kernel);
        let rooms = resolver.resolve_rooms(
            &chair,
            &Phase::from("Existing"),
            None,
            &ResolveOptions::default(),
        );
        assert!(rooms.is_empty());
    }
}
