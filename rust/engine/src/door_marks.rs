// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door numbering from room connectivity.
//!
//! Doors take their mark from a room they open into. Rooms with few doors
//! are settled first: a room with a single door lends it its number, a room
//! with several doors numbers them with suffixes. Each numbered door is then
//! removed from every room it connects, which may leave other rooms with a
//! single remaining door, and so on.
//!
//! The pass works level by level: at level `i`, every room currently holding
//! exactly `i` un-numbered doors is settled, smallest room first. Within a
//! room, doors shared with busier rooms come first. The number of sweeps is
//! capped at twice the number of doors to label, so the pass always ends,
//! possibly leaving doors unmarked.

use std::f64::consts::TAU;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use spacemark_core::{DoorModel, ElementId, Phase, RoomId};
use spacemark_geometry::Point3;

use crate::error::{Error, Result};
use crate::options::MarkOptions;

/// A room and the doors still waiting for a mark.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDoors {
    pub room: RoomId,
    pub number: String,
    pub area: f64,
    pub location: Point3<f64>,
    /// Doors in first-encounter order.
    pub doors: Vec<ElementId>,
}

/// Room door lists at one level of the pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelSnapshot {
    rooms: Vec<RoomDoors>,
}

impl LevelSnapshot {
    pub fn rooms(&self) -> &[RoomDoors] {
        &self.rooms
    }

    /// Largest door count of any room.
    pub fn max_doors(&self) -> usize {
        self.rooms.iter().map(|r| r.doors.len()).max().unwrap_or(0)
    }

    /// Rooms holding exactly `count` doors, smallest area first. Rooms of
    /// equal area keep their order.
    pub fn eligible(&self, count: usize) -> Vec<&RoomDoors> {
        let mut eligible: Vec<&RoomDoors> =
            self.rooms.iter().filter(|r| r.doors.len() == count).collect();
        eligible.sort_by(|a, b| a.area.total_cmp(&b.area));
        eligible
    }

    /// Next snapshot with every numbered door removed.
    pub fn without(&self, numbered: &FxHashSet<ElementId>) -> LevelSnapshot {
        LevelSnapshot {
            rooms: self
                .rooms
                .iter()
                .map(|r| RoomDoors {
                    doors: r
                        .doors
                        .iter()
                        .copied()
                        .filter(|d| !numbered.contains(d))
                        .collect(),
                    ..r.clone()
                })
                .collect(),
        }
    }
}

/// Room/door graph for one phase.
#[derive(Debug, Clone, Default)]
pub struct DoorGraph {
    pub snapshot: LevelSnapshot,
    /// Sum of the door counts of all rooms a door connects.
    pub connectors: FxHashMap<ElementId, usize>,
}

impl DoorGraph {
    /// Build the graph from `doors`. Non-doors and repeated ids are skipped;
    /// a door connecting a room to itself is listed once for it.
    pub fn build<M: DoorModel + ?Sized>(model: &M, doors: &[ElementId], phase: &Phase) -> Self {
        let mut rooms: Vec<RoomDoors> = Vec::new();
        let mut index: FxHashMap<RoomId, usize> = FxHashMap::default();
        let mut seen: FxHashSet<ElementId> = FxHashSet::default();

        for &door in doors {
            if !seen.insert(door) {
                continue;
            }
            let Some(sides) = model.door_rooms(door, phase) else {
                tracing::debug!(door = %door, "Skipping element that is not a door");
                continue;
            };
            for room_id in sides.rooms() {
                let slot = match index.get(&room_id) {
                    Some(&slot) => slot,
                    None => {
                        let Some(room) = model.room(room_id) else {
                            tracing::warn!(door = %door, room = %room_id, "Door refers to a missing room");
                            continue;
                        };
                        rooms.push(RoomDoors {
                            room: room_id,
                            number: room.number.clone(),
                            area: room.area,
                            location: room.location,
                            doors: Vec::new(),
                        });
                        index.insert(room_id, rooms.len() - 1);
                        rooms.len() - 1
                    }
                };
                rooms[slot].doors.push(door);
            }
        }

        let mut connectors: FxHashMap<ElementId, usize> = FxHashMap::default();
        for room in &rooms {
            for &door in &room.doors {
                *connectors.entry(door).or_default() += room.doors.len();
            }
        }

        Self {
            snapshot: LevelSnapshot { rooms },
            connectors,
        }
    }

    fn score(&self, door: ElementId) -> usize {
        self.connectors.get(&door).copied().unwrap_or(0)
    }
}

/// A mark chosen for one door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAssignment {
    pub door: ElementId,
    pub room: RoomId,
    pub mark: String,
    /// Door count of the room when it was settled.
    pub level: usize,
    /// Direction from the door to the room's location, clockwise from +X as
    /// a fraction of a full turn. Informational only.
    pub bearing: Option<f64>,
}

/// Outcome of a numbering pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkPlan {
    /// Marks for the doors to label, in the order they were decided.
    pub assignments: Vec<MarkAssignment>,
    /// Doors to label that received no mark.
    pub unmarked: Vec<ElementId>,
    /// Sweeps that settled at least one room.
    pub units: usize,
    /// The sweep cap stopped the pass early.
    pub capped: bool,
}

impl MarkPlan {
    pub fn is_complete(&self) -> bool {
        self.unmarked.is_empty()
    }

    pub fn mark_of(&self, door: ElementId) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.door == door)
            .map(|a| a.mark.as_str())
    }
}

/// Fraction of a clockwise turn from +X to the direction `from -> to`.
fn bearing(from: &Point3<f64>, to: &Point3<f64>) -> Option<f64> {
    let d = to - from;
    if d.x == 0.0 && d.y == 0.0 {
        return None;
    }
    Some((-d.y.atan2(d.x)).rem_euclid(TAU) / TAU)
}

/// Decide marks for `doors_to_label` without writing them.
///
/// `all_doors` defines the connectivity graph and should include every door
/// of the phase; doors outside `doors_to_label` take part in the numbering
/// but are not reported.
pub fn plan_door_marks<M: DoorModel + ?Sized>(
    model: &M,
    doors_to_label: &[ElementId],
    phase: &Phase,
    all_doors: &[ElementId],
    options: &MarkOptions,
) -> MarkPlan {
    let graph = DoorGraph::build(model, all_doors, phase);
    let to_label: FxHashSet<ElementId> = doors_to_label.iter().copied().collect();
    let max_level = graph.snapshot.max_doors();
    let cap = 2 * doors_to_label.len();

    let mut plan = MarkPlan::default();
    let mut numbered: FxHashSet<ElementId> = FxHashSet::default();
    let mut snapshot = graph.snapshot.clone();
    let mut level = 1;

    while level <= max_level && plan.units < cap {
        let eligible = snapshot.eligible(level);
        if eligible.is_empty() {
            level += 1;
            continue;
        }

        for room in eligible {
            let mut pending: Vec<ElementId> = room
                .doors
                .iter()
                .copied()
                .filter(|d| !numbered.contains(d))
                .collect();
            pending.sort_by(|a, b| graph.score(*b).cmp(&graph.score(*a)));

            let single = pending.len() == 1;
            for (j, door) in pending.into_iter().enumerate() {
                let mark = if single {
                    options.single_mark(&room.number)
                } else {
                    options.indexed_mark(&room.number, j)
                };
                numbered.insert(door);

                if to_label.contains(&door) {
                    let bearing = model
                        .door_center(door)
                        .and_then(|c| bearing(&c, &room.location));
                    tracing::debug!(door = %door, room = %room.room, mark = %mark, level, "Door numbered");
                    plan.assignments.push(MarkAssignment {
                        door,
                        room: room.room,
                        mark,
                        level,
                        bearing,
                    });
                }
            }
        }

        snapshot = snapshot.without(&numbered);
        plan.units += 1;
    }

    // leaving the loop with levels to go means the cap stopped it
    plan.capped = level <= max_level;

    let mut reported: FxHashSet<ElementId> = FxHashSet::default();
    plan.unmarked = doors_to_label
        .iter()
        .copied()
        .filter(|d| !numbered.contains(d) && reported.insert(*d))
        .collect();

    if !plan.unmarked.is_empty() {
        tracing::warn!(
            unmarked = plan.unmarked.len(),
            capped = plan.capped,
            "Door numbering left doors without a mark"
        );
    }
    tracing::info!(
        marked = plan.assignments.len(),
        units = plan.units,
        max_level,
        "Door numbering planned"
    );

    plan
}

/// Number `doors_to_label` and write their marks.
///
/// Returns `doors_to_label`. A failed write is logged and leaves that door's
/// mark unchanged.
pub fn assign_door_marks<M: DoorModel + ?Sized>(
    model: &mut M,
    doors_to_label: &[ElementId],
    phase: &Phase,
    all_doors: &[ElementId],
    options: &MarkOptions,
) -> Vec<ElementId> {
    let plan = plan_door_marks(&*model, doors_to_label, phase, all_doors, options);
    for assignment in &plan.assignments {
        if let Err(e) = model.set_mark(assignment.door, &assignment.mark) {
            tracing::warn!(door = %assignment.door, error = %e, "Could not write door mark");
        }
    }
    doors_to_label.to_vec()
}

/// Check that every id is a door in `phase`'s model.
pub fn ensure_doors<M: DoorModel + ?Sized>(model: &M, doors: &[ElementId], phase: &Phase) -> Result<()> {
    match doors.iter().find(|&&d| model.door_rooms(d, phase).is_none()) {
        Some(&door) => Err(Error::NotADoor(door)),
        None => Ok(()),
    }
}
