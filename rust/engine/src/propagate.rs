// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch matching and writing room numbers back onto elements.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spacemark_core::{Document, ElementId, GeometricElement, LinkInstance, ModelStore, Phase, RoomId};
use spacemark_geometry::GeometryKernel;

use crate::error::Result;
use crate::options::ResolveOptions;
use crate::resolver::{RoomResolver, Tier};

/// Rooms matched for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMatch {
    pub element: ElementId,
    pub rooms: Vec<RoomId>,
    pub tier: Option<Tier>,
    /// Room numbers joined for display, empty when nothing matched.
    pub label: String,
    /// False when the element could not be evaluated at all.
    pub evaluated: bool,
}

/// Room numbers joined by `", "`, skipping unknown rooms.
pub fn space_label<M: ModelStore + ?Sized>(model: &M, rooms: &[RoomId]) -> String {
    rooms
        .iter()
        .filter_map(|&id| model.room(id))
        .map(|room| room.number.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Match every element against the resolver's model, in parallel.
///
/// Results come back in the order of `elements`.
pub fn resolve_batch<M, K, E>(
    resolver: &RoomResolver<'_, M, K>,
    elements: &[E],
    phase: &Phase,
    candidates: Option<&[RoomId]>,
    options: &ResolveOptions,
) -> Vec<RoomMatch>
where
    M: ModelStore + Sync,
    K: GeometryKernel + Sync + ?Sized,
    E: GeometricElement + Sync,
{
    let matches: Vec<RoomMatch> = elements
        .par_iter()
        .map(|element| {
            let resolution = resolver.resolve(element, phase, candidates, options);
            to_match(element.id(), resolution, resolver.model())
        })
        .collect();
    log_batch(&matches, None);
    matches
}

/// Match every element against the rooms of a linked document.
pub fn resolve_batch_in_link<M, K, E>(
    resolver: &RoomResolver<'_, M, K>,
    elements: &[E],
    phase: &Phase,
    link: &LinkInstance,
    candidates: Option<&[RoomId]>,
    options: &ResolveOptions,
) -> Vec<RoomMatch>
where
    M: ModelStore + Sync,
    K: GeometryKernel + Sync + ?Sized,
    E: GeometricElement + Sync,
{
    let matches: Vec<RoomMatch> = elements
        .par_iter()
        .map(|element| {
            let resolution = resolver.resolve_in_link(element, phase, link, candidates, options);
            to_match(element.id(), resolution, link.document.as_ref())
        })
        .collect();
    log_batch(&matches, Some(&link.name));
    matches
}

fn to_match<M: ModelStore + ?Sized>(
    element: ElementId,
    resolution: Option<crate::resolver::Resolution>,
    rooms: &M,
) -> RoomMatch {
    match resolution {
        Some(r) => RoomMatch {
            element,
            label: space_label(rooms, &r.rooms),
            rooms: r.rooms,
            tier: r.tier,
            evaluated: true,
        },
        None => RoomMatch {
            element,
            rooms: Vec::new(),
            tier: None,
            label: String::new(),
            evaluated: false,
        },
    }
}

fn log_batch(matches: &[RoomMatch], link: Option<&str>) {
    let matched = matches.iter().filter(|m| !m.rooms.is_empty()).count();
    let skipped = matches.iter().filter(|m| !m.evaluated).count();
    tracing::info!(
        elements = matches.len(),
        matched,
        skipped,
        link = link.unwrap_or("-"),
        "Resolved element rooms"
    );
}

/// Write each match's label into `parameter`.
///
/// Elements without a match are left alone. With `blank_only`, existing
/// non-blank values are kept. Returns the number of values written.
pub fn assign_spaces(
    document: &mut Document,
    matches: &[RoomMatch],
    parameter: &str,
    blank_only: bool,
) -> Result<usize> {
    let mut written = 0;
    for m in matches {
        if m.label.is_empty() {
            continue;
        }
        if blank_only {
            let current = document.parameter(m.element, parameter).unwrap_or("");
            if !current.trim().is_empty() {
                tracing::debug!(element = %m.element, current, "Keeping existing space value");
                continue;
            }
        }
        document.set_parameter(m.element, parameter, &m.label)?;
        tracing::info!(element = %m.element, parameter, value = %m.label, "Space written");
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacemark_core::{Element, ElementKind, Room};
    use spacemark_geometry::{BoundingBox, BoxKernel, Outline, Point3};

    fn phase() -> Phase {
        Phase::from("New Construction")
    }

    fn model(kernel: &BoxKernel) -> Document {
        let mut doc = Document::new("test");
        for (id, x0) in [(1u64, 0.0), (2, 5.0)] {
            let solid = kernel.insert_box(Outline::new(
                Point3::new(x0, 0.0, 0.0),
                Point3::new(x0 + 5.0, 5.0, 3.0),
            ));
            let room = Room::new(RoomId(id), format!("10{id}"), phase())
                .with_geometry(kernel, vec![solid])
                .unwrap();
            doc.add_room(room).unwrap();
        }
        doc
    }

    fn equipment(kernel: &BoxKernel, id: u64, min: [f64; 3], max: [f64; 3]) -> Element {
        let outline = Outline::new(Point3::from(min), Point3::from(max));
        Element::new(ElementId(id), ElementKind::instance())
            .with_bounding_box(BoundingBox::from(outline))
            .with_solids(vec![kernel.insert_box(outline)])
    }

    #[test]
    fn label_joins_room_numbers() {
        let kernel = BoxKernel::new();
        let doc = model(&kernel);
        assert_eq!(space_label(&doc, &[RoomId(1), RoomId(2)]), "101, 102");
        assert_eq!(space_label(&doc, &[RoomId(9)]), "");
    }

    #[test]
    fn batch_keeps_element_order() {
        let kernel = BoxKernel::new();
        let mut doc = model(&kernel);
        let elements = vec![
            equipment(&kernel, 10, [6.0, 1.0, 0.0], [7.0, 2.0, 1.0]),
            equipment(&kernel, 11, [1.0, 1.0, 0.0], [2.0, 2.0, 1.0]),
            equipment(&kernel, 12, [4.0, 1.0, 0.0], [6.0, 2.0, 1.0]),
            Element::new(ElementId(13), ElementKind::Annotation),
        ];
        for e in &elements {
            doc.add_element(e.clone()).unwrap();
        }

        let resolver = RoomResolver::new(&doc, &kernel);
        let matches = resolve_batch(&resolver, &elements, &phase(), None, &ResolveOptions::exact());

        let labels: Vec<&str> = matches.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["102", "101", "101, 102", ""]);
        assert!(!matches[3].evaluated);
        assert_eq!(matches[0].tier, Some(Tier::SolidIntersection));
    }

    #[test]
    fn assign_spaces_respects_blank_only() {
        let kernel = BoxKernel::new();
        let mut doc = model(&kernel);
        let a = equipment(&kernel, 10, [1.0, 1.0, 0.0], [2.0, 2.0, 1.0]);
        let b = equipment(&kernel, 11, [6.0, 1.0, 0.0], [7.0, 2.0, 1.0]).with_parameter("Space", "Lobby");
        doc.add_element(a.clone()).unwrap();
        doc.add_element(b.clone()).unwrap();

        let matches = {
            let resolver = RoomResolver::new(&doc, &kernel);
            resolve_batch(&resolver, &[&a, &b], &phase(), None, &ResolveOptions::default())
        };

        assert_eq!(assign_spaces(&mut doc, &matches, "Space", true).unwrap(), 1);
        assert_eq!(doc.parameter(ElementId(10), "Space"), Some("101"));
        assert_eq!(doc.parameter(ElementId(11), "Space"), Some("Lobby"));

        assert_eq!(assign_spaces(&mut doc, &matches, "Space", false).unwrap(), 2);
        assert_eq!(doc.parameter(ElementId(11), "Space"), Some("102"));
    }
}
