// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON model snapshots.
//!
//! A snapshot is a plain description of a model: levels, rooms and elements
//! with their geometry given as disjoint axis-aligned boxes, plus linked
//! models embedded inline. Loading one materialises the boxes into a
//! [`BoxKernel`] and builds a [`Document`].
//!
//! ```json
//! {
//!   "phases": ["New Construction"],
//!   "levels": [{ "id": 1, "name": "L1", "elevation": 0.0 }],
//!   "rooms": [{
//!     "id": 10, "number": "101", "phase": "New Construction", "area": 20.0,
//!     "boxes": [{ "min": [0, 0, 0], "max": [5, 4, 3] }]
//!   }],
//!   "elements": [{
//!     "id": 100, "kind": { "type": "instance" }, "level": 1,
//!     "location": { "point": [1, 1, 0.5] },
//!     "boxes": [{ "min": [0.5, 0.5, 0], "max": [1.5, 1.5, 1] }]
//!   }]
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spacemark_geometry::{BoundingBox, BoxKernel, Outline, Point3, SolidKey, Transform, Vector3};

use crate::document::Document;
use crate::element::{Element, ElementKind, Location, PhaseMap};
use crate::error::{Error, Result};
use crate::ids::{ElementId, LevelId, Phase, RoomId};
use crate::link::LinkInstance;
use crate::room::{Level, Room};

/// Serializable description of a whole model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub levels: Vec<LevelSnapshot>,
    #[serde(default)]
    pub rooms: Vec<RoomSnapshot>,
    #[serde(default)]
    pub elements: Vec<ElementSnapshot>,
    #[serde(default)]
    pub links: Vec<LinkSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSnapshot {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl From<&Outline> for BoxSnapshot {
    fn from(outline: &Outline) -> Self {
        Self {
            min: outline.min.coords.into(),
            max: outline.max.coords.into(),
        }
    }
}

impl From<&BoxSnapshot> for Outline {
    fn from(b: &BoxSnapshot) -> Self {
        Outline::from_points(Point3::from(b.min), Point3::from(b.max))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub id: LevelId,
    #[serde(default)]
    pub name: String,
    pub elevation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub number: String,
    #[serde(default)]
    pub name: String,
    pub phase: Phase,
    #[serde(default)]
    pub area: f64,
    /// Defaults to the center of the room boxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 3]>,
    #[serde(default)]
    pub boxes: Vec<BoxSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KindSnapshot {
    Instance {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        rooms: BTreeMap<Phase, RoomId>,
    },
    Door {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        to_room: BTreeMap<Phase, RoomId>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        from_room: BTreeMap<Phase, RoomId>,
    },
    Wall,
    CurtainSystem,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxSnapshot {
    pub min: [f64; 3],
    pub max: [f64; 3],
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSnapshot {
    Point([f64; 3]),
    Curve { start: [f64; 3], end: [f64; 3] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    pub kind: KindSnapshot,
    /// Defaults to the bounds of `boxes` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBoxSnapshot>,
    #[serde(default)]
    pub boxes: Vec<BoxSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<ElementId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// Link placement: either a full column-major matrix or a translation with a
/// rotation about Z (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformSnapshot {
    Matrix {
        matrix: [f64; 16],
    },
    Placement {
        #[serde(default)]
        translation: [f64; 3],
        #[serde(default)]
        rotation_z: f64,
    },
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        TransformSnapshot::Placement {
            translation: [0.0; 3],
            rotation_z: 0.0,
        }
    }
}

impl TransformSnapshot {
    pub fn to_transform(&self) -> Transform {
        match *self {
            TransformSnapshot::Matrix { matrix } => Transform::from_column_slice(&matrix),
            TransformSnapshot::Placement {
                translation,
                rotation_z,
            } => Transform::from_translation_rotation_z(Vector3::from(translation), rotation_z),
        }
    }
}

impl From<&Transform> for TransformSnapshot {
    fn from(transform: &Transform) -> Self {
        let mut matrix = [0.0; 16];
        matrix.copy_from_slice(transform.matrix().as_slice());
        TransformSnapshot::Matrix { matrix }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub name: String,
    #[serde(default)]
    pub transform: TransformSnapshot,
    pub model: Box<ModelSnapshot>,
}

impl ModelSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

fn phase_map(values: &BTreeMap<Phase, RoomId>) -> PhaseMap<RoomId> {
    values.iter().map(|(p, r)| (p.clone(), *r)).collect()
}

fn sorted(values: &PhaseMap<RoomId>) -> BTreeMap<Phase, RoomId> {
    values.iter().map(|(p, r)| (p.clone(), *r)).collect()
}

fn solids_from_boxes(kernel: &BoxKernel, boxes: &[BoxSnapshot]) -> Vec<SolidKey> {
    if boxes.is_empty() {
        return Vec::new();
    }
    vec![kernel.insert_boxes(boxes.iter().map(Outline::from).collect())]
}

fn boxes_of(kernel: &BoxKernel, solids: &[SolidKey]) -> Result<Vec<BoxSnapshot>> {
    let mut boxes = Vec::new();
    for &solid in solids {
        boxes.extend(kernel.boxes(solid)?.iter().map(BoxSnapshot::from));
    }
    Ok(boxes)
}

impl Document {
    /// Build a document, materialising all geometry into `kernel`.
    pub fn from_snapshot(snapshot: &ModelSnapshot, kernel: &BoxKernel) -> Result<Self> {
        let mut doc = Document::new(snapshot.name.clone());

        for phase in &snapshot.phases {
            doc.add_phase(phase.clone());
        }
        for level in &snapshot.levels {
            doc.add_level(Level::new(level.id, level.name.clone(), level.elevation))?;
        }

        for rs in &snapshot.rooms {
            let solids = solids_from_boxes(kernel, &rs.boxes);
            let mut room = Room::new(rs.id, rs.number.clone(), rs.phase.clone())
                .with_name(rs.name.clone())
                .with_area(rs.area)
                .with_geometry(kernel, solids)?;
            room.location = match (rs.location, room.outline) {
                (Some(p), _) => Point3::from(p),
                (None, Some(outline)) => outline.center(),
                (None, None) => Point3::origin(),
            };
            doc.add_room(room)?;
        }

        for es in &snapshot.elements {
            doc.add_element(element_from_snapshot(es, kernel))?;
        }

        for ls in &snapshot.links {
            let linked = Document::from_snapshot(&ls.model, kernel)?;
            doc.add_link(LinkInstance::new(
                ls.name.clone(),
                Arc::new(linked),
                ls.transform.to_transform(),
            )?);
        }

        tracing::debug!(
            document = %doc.name(),
            levels = doc.levels().len(),
            rooms = doc.rooms().len(),
            elements = doc.elements().len(),
            links = doc.links().len(),
            "Loaded model snapshot"
        );

        Ok(doc)
    }

    pub fn from_json(json: &str, kernel: &BoxKernel) -> Result<Self> {
        Self::from_snapshot(&ModelSnapshot::from_json(json)?, kernel)
    }

    /// Describe the document, reading geometry back from `kernel`.
    pub fn to_snapshot(&self, kernel: &BoxKernel) -> Result<ModelSnapshot> {
        let levels = self
            .levels()
            .iter()
            .map(|l| LevelSnapshot {
                id: l.id,
                name: l.name.clone(),
                elevation: l.elevation,
            })
            .collect();

        let rooms = self
            .rooms()
            .iter()
            .map(|r| {
                Ok(RoomSnapshot {
                    id: r.id,
                    number: r.number.clone(),
                    name: r.name.clone(),
                    phase: r.phase.clone(),
                    area: r.area,
                    location: Some(r.location.coords.into()),
                    boxes: boxes_of(kernel, &r.solids)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let elements = self
            .elements()
            .iter()
            .map(|e| element_to_snapshot(e, kernel))
            .collect::<Result<Vec<_>>>()?;

        let links = self
            .links()
            .iter()
            .map(|l| {
                Ok(LinkSnapshot {
                    name: l.name.clone(),
                    transform: TransformSnapshot::from(l.transform()),
                    model: Box::new(l.document.to_snapshot(kernel)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ModelSnapshot {
            name: self.name().to_string(),
            phases: self.phases().to_vec(),
            levels,
            rooms,
            elements,
            links,
        })
    }

    pub fn to_json(&self, kernel: &BoxKernel) -> Result<String> {
        self.to_snapshot(kernel)?.to_json()
    }
}

fn element_from_snapshot(es: &ElementSnapshot, kernel: &BoxKernel) -> Element {
    let kind = match &es.kind {
        KindSnapshot::Instance { rooms } => ElementKind::Instance {
            rooms: phase_map(rooms),
        },
        KindSnapshot::Door { to_room, from_room } => ElementKind::Door {
            to_room: phase_map(to_room),
            from_room: phase_map(from_room),
        },
        KindSnapshot::Wall => ElementKind::Wall,
        KindSnapshot::CurtainSystem => ElementKind::CurtainSystem,
        KindSnapshot::Annotation => ElementKind::Annotation,
    };

    let bounding_box = match es.bounding_box {
        Some(b) => Some(BoundingBox {
            outline: Outline::new(Point3::from(b.min), Point3::from(b.max)),
            enabled: b.enabled,
        }),
        None => Outline::enclosing(
            es.boxes
                .iter()
                .flat_map(|b| [Point3::from(b.min), Point3::from(b.max)]),
        )
        .map(BoundingBox::from),
    };

    let location = es.location.map(|l| match l {
        LocationSnapshot::Point(p) => Location::Point(Point3::from(p)),
        LocationSnapshot::Curve { start, end } => Location::Curve {
            start: Point3::from(start),
            end: Point3::from(end),
        },
    });

    Element {
        id: es.id,
        name: es.name.clone(),
        kind,
        bounding_box,
        solids: solids_from_boxes(kernel, &es.boxes),
        level: es.level,
        location,
        host: es.host,
        parameters: es
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

fn element_to_snapshot(e: &Element, kernel: &BoxKernel) -> Result<ElementSnapshot> {
    let kind = match &e.kind {
        ElementKind::Instance { rooms } => KindSnapshot::Instance {
            rooms: sorted(rooms),
        },
        ElementKind::Door { to_room, from_room } => KindSnapshot::Door {
            to_room: sorted(to_room),
            from_room: sorted(from_room),
        },
        ElementKind::Wall => KindSnapshot::Wall,
        ElementKind::CurtainSystem => KindSnapshot::CurtainSystem,
        ElementKind::Annotation => KindSnapshot::Annotation,
    };

    Ok(ElementSnapshot {
        id: e.id,
        name: e.name.clone(),
        kind,
        bounding_box: e.bounding_box.map(|b| BoundingBoxSnapshot {
            min: b.outline.min.coords.into(),
            max: b.outline.max.coords.into(),
            enabled: b.enabled,
        }),
        boxes: boxes_of(kernel, &e.solids)?,
        level: e.level,
        location: e.location.map(|l| match l {
            Location::Point(p) => LocationSnapshot::Point(p.coords.into()),
            Location::Curve { start, end } => LocationSnapshot::Curve {
                start: start.coords.into(),
                end: end.coords.into(),
            },
        }),
        host: e.host,
        parameters: e
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}
