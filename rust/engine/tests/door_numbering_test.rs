// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door numbering scenarios.

use spacemark_core::{Document, DoorModel, Element, ElementId, ElementKind, Phase, Room, RoomId};
use spacemark_engine::{assign_door_marks, plan_door_marks, MarkOptions};

fn phase() -> Phase {
    Phase::from("New Construction")
}

struct Plan {
    doc: Document,
}

impl Plan {
    fn new() -> Self {
        Self {
            doc: Document::new("doors"),
        }
    }

    fn room(mut self, id: u64, number: &str, area: f64) -> Self {
        self.doc
            .add_room(Room::new(RoomId(id), number, phase()).with_area(area))
            .unwrap();
        self
    }

    fn door(mut self, id: u64, to: u64, from: Option<u64>) -> Self {
        let door = Element::new(ElementId(id), ElementKind::door()).with_door_rooms(
            phase(),
            Some(RoomId(to)),
            from.map(RoomId),
        );
        self.doc.add_element(door).unwrap();
        self
    }

    fn build(self) -> Document {
        self.doc
    }
}

#[test]
fn shared_door_takes_number_of_room_settled_first() {
    // 101 has only the shared door D1; 102 has D1 and its own D2
    let mut doc = Plan::new()
        .room(1, "101", 100.0)
        .room(2, "102", 50.0)
        .door(1, 1, Some(2))
        .door(2, 2, None)
        .build();
    let doors = doc.door_ids();

    let labeled = assign_door_marks(&mut doc, &doors, &phase(), &doors, &MarkOptions::default());

    assert_eq!(labeled, doors);
    assert_eq!(doc.mark(ElementId(1)), Some("101"));
    assert_eq!(doc.mark(ElementId(2)), Some("102"));
}

#[test]
fn three_equal_doors_get_suffixes_in_list_order() {
    let mut doc = Plan::new()
        .room(1, "200", 200.0)
        .door(1, 1, None)
        .door(2, 1, None)
        .door(3, 1, None)
        .build();
    let doors = doc.door_ids();

    assign_door_marks(&mut doc, &doors, &phase(), &doors, &MarkOptions::default());

    assert_eq!(doc.mark(ElementId(1)), Some("200A"));
    assert_eq!(doc.mark(ElementId(2)), Some("200B"));
    assert_eq!(doc.mark(ElementId(3)), Some("200C"));
}

#[test]
fn prefix_and_separator_shape_marks() {
    let mut doc = Plan::new()
        .room(1, "300", 20.0)
        .room(2, "301", 10.0)
        .door(1, 1, None)
        .door(2, 1, None)
        .door(3, 2, None)
        .build();
    let doors = doc.door_ids();
    let options = MarkOptions {
        prefix: "D".into(),
        separator: ".".into(),
        ..MarkOptions::default()
    };

    assign_door_marks(&mut doc, &doors, &phase(), &doors, &options);

    assert_eq!(doc.mark(ElementId(1)), Some("D300.A"));
    assert_eq!(doc.mark(ElementId(2)), Some("D300.B"));
    assert_eq!(doc.mark(ElementId(3)), Some("D301"));
}

#[test]
fn numbering_twice_gives_identical_marks() {
    let mut doc = Plan::new()
        .room(1, "101", 30.0)
        .room(2, "102", 20.0)
        .room(3, "103", 10.0)
        .door(1, 1, Some(2))
        .door(2, 2, Some(3))
        .door(3, 3, None)
        .door(4, 1, None)
        .door(5, 1, None)
        .build();
    let doors = doc.door_ids();

    assign_door_marks(&mut doc, &doors, &phase(), &doors, &MarkOptions::default());
    let first: Vec<Option<String>> = doors
        .iter()
        .map(|&d| doc.mark(d).map(String::from))
        .collect();

    assign_door_marks(&mut doc, &doors, &phase(), &doors, &MarkOptions::default());
    let second: Vec<Option<String>> = doors
        .iter()
        .map(|&d| doc.mark(d).map(String::from))
        .collect();

    assert!(first.iter().all(Option::is_some));
    assert_eq!(first, second);
}

#[test]
fn only_requested_doors_are_written() {
    let mut doc = Plan::new()
        .room(1, "101", 100.0)
        .room(2, "102", 50.0)
        .door(1, 1, Some(2))
        .door(2, 2, None)
        .build();
    let all = doc.door_ids();

    let plan = plan_door_marks(&doc, &[ElementId(2)], &phase(), &all, &MarkOptions::default());
    assert_eq!(plan.assignments.len(), 1);
    assert_eq!(plan.mark_of(ElementId(2)), Some("102"));

    assign_door_marks(&mut doc, &[ElementId(2)], &phase(), &all, &MarkOptions::default());
    assert_eq!(doc.mark(ElementId(1)), None);
    assert_eq!(doc.mark(ElementId(2)), Some("102"));
}

#[test]
fn sweep_cap_stops_with_doors_unmarked() {
    // eight rooms in a row, a door between each neighbour pair
    let mut plan = Plan::new();
    for id in 1..=8u64 {
        plan = plan.room(id, &format!("{}", 100 + id), 10.0);
    }
    for id in 1..=7u64 {
        plan = plan.door(id, id, Some(id + 1));
    }
    let doc = plan.build();
    let all = doc.door_ids();

    // labeling only the middle door allows two sweeps, which settle the two
    // outermost doors on each side
    let result = plan_door_marks(&doc, &[ElementId(4)], &phase(), &all, &MarkOptions::default());

    assert_eq!(result.units, 2);
    assert!(result.capped);
    assert!(result.assignments.is_empty());
    assert_eq!(result.unmarked, vec![ElementId(4)]);
}

#[test]
fn room_passed_over_by_the_sweep_keeps_its_doors_unmarked() {
    // 100 starts with three doors; once 101 and 102 settle at level 2 it is
    // left with one, below the current level
    let doc = Plan::new()
        .room(1, "100", 10.0)
        .room(2, "101", 10.0)
        .room(3, "102", 10.0)
        .door(1, 1, Some(2))
        .door(2, 1, Some(3))
        .door(3, 1, None)
        .door(4, 2, None)
        .door(5, 3, None)
        .build();
    let doors = doc.door_ids();

    let plan = plan_door_marks(&doc, &doors, &phase(), &doors, &MarkOptions::default());

    assert!(!plan.capped);
    assert_eq!(plan.units, 1);
    assert_eq!(plan.unmarked, vec![ElementId(3)]);
    assert_eq!(plan.mark_of(ElementId(1)), Some("101A"));
    assert_eq!(plan.mark_of(ElementId(4)), Some("101B"));
}
