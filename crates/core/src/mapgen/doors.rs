//! Door derivation from the final occupancy grid.
//!
//! A side is open iff the neighbouring cell is occupied. A boss room only opens the side
//! facing the room it was expanded from, and its other neighbours keep their matching
//! side closed so every door stays paired.

use crate::types::{Direction, DoorSet, RoomId, RoomKind};

use super::attempt::Attempt;

pub(super) fn derive_doors(attempt: &Attempt) -> Vec<(RoomId, DoorSet)> {
    attempt.rooms().map(|(id, _)| (id, doors_for(attempt, id))).collect()
}

fn doors_for(attempt: &Attempt, id: RoomId) -> DoorSet {
    let room = attempt.room(id);
    if room.kind == RoomKind::Boss {
        return room.parent.map_or(DoorSet::empty(), Direction::door);
    }

    let mut doors = DoorSet::empty();
    for direction in Direction::ALL {
        let Some(neighbor_id) = attempt.grid().room_at(room.pos.step(direction)) else {
            continue;
        };
        let neighbor = attempt.room(neighbor_id);
        if neighbor.kind == RoomKind::Boss && neighbor.parent != Some(direction.opposite()) {
            continue;
        }
        doors |= direction.door();
    }
    doors
}
