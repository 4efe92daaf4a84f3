//! Structural checks a finished layout must pass.

use std::collections::{BTreeSet, VecDeque};

use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::types::{Direction, Pos, RoomKind};

use super::grid::in_bounds;
use super::model::Layout;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutViolation {
    #[error("room at {0:?} lies outside the grid")]
    OutOfBounds(Pos),

    #[error("room list is not sorted or repeats a position near {0:?}")]
    UnsortedRooms(Pos),

    #[error("{count} rooms outside the allowed range {min}..={max}")]
    RoomCount { count: usize, min: usize, max: usize },

    #[error("expected exactly one {kind} room, found {count}")]
    SingletonCount { kind: RoomKind, count: usize },

    #[error("start room at {actual:?} instead of {expected:?}")]
    StartMisplaced { expected: Pos, actual: Pos },

    #[error("{count} {kind} rooms exceed the budget of {max}")]
    OverBudget { kind: RoomKind, count: usize, max: u8 },

    #[error("required {0} room is missing")]
    MissingRequired(RoomKind),

    #[error("only {reachable} of {total} rooms are reachable from the start room")]
    Disconnected { reachable: usize, total: usize },

    #[error("room at {pos:?} has a {direction:?} door leading nowhere")]
    DanglingDoor { pos: Pos, direction: Direction },

    #[error("room at {pos:?} has no {direction:?} door toward its neighbour")]
    MissingDoor { pos: Pos, direction: Direction },

    #[error("door {direction:?} of room at {pos:?} is not matched on the other side")]
    UnpairedDoor { pos: Pos, direction: Direction },

    #[error("boss room at {pos:?} has {count} doors")]
    BossDoors { pos: Pos, count: usize },
}

pub fn verify_layout(layout: &Layout, config: &GeneratorConfig) -> Result<(), LayoutViolation> {
    check_positions(layout)?;
    check_counts(layout, config)?;
    check_connectivity(layout)?;
    check_doors(layout)
}

fn check_positions(layout: &Layout) -> Result<(), LayoutViolation> {
    for room in &layout.rooms {
        if !in_bounds(layout.width, layout.height, room.pos) {
            return Err(LayoutViolation::OutOfBounds(room.pos));
        }
    }
    for pair in layout.rooms.windows(2) {
        if pair[0].pos >= pair[1].pos {
            return Err(LayoutViolation::UnsortedRooms(pair[1].pos));
        }
    }
    Ok(())
}

fn check_counts(layout: &Layout, config: &GeneratorConfig) -> Result<(), LayoutViolation> {
    let count = layout.rooms.len();
    if count < config.min_rooms || count > config.max_rooms {
        return Err(LayoutViolation::RoomCount {
            count,
            min: config.min_rooms,
            max: config.max_rooms,
        });
    }

    for kind in [RoomKind::Start, RoomKind::Boss] {
        let count = layout.rooms_of_kind(kind).count();
        if count != 1 {
            return Err(LayoutViolation::SingletonCount { kind, count });
        }
    }
    if let Some(start) = layout.start()
        && start.pos != config.start_pos()
    {
        return Err(LayoutViolation::StartMisplaced {
            expected: config.start_pos(),
            actual: start.pos,
        });
    }

    for kind in [RoomKind::Treasure, RoomKind::Shop] {
        let count = layout.rooms_of_kind(kind).count();
        let max = config.max_per_floor(kind);
        if count > usize::from(max) {
            return Err(LayoutViolation::OverBudget { kind, count, max });
        }
        if count == 0 && config.is_required(kind) {
            return Err(LayoutViolation::MissingRequired(kind));
        }
    }
    Ok(())
}

/// Occupancy reachability, ignoring doors.
fn check_connectivity(layout: &Layout) -> Result<(), LayoutViolation> {
    let Some(start) = layout.start() else {
        return Ok(());
    };

    let mut open = VecDeque::from([start.pos]);
    let mut seen = BTreeSet::from([start.pos]);
    while let Some(pos) = open.pop_front() {
        for direction in Direction::ALL {
            let next = pos.step(direction);
            if layout.room_at(next).is_some() && seen.insert(next) {
                open.push_back(next);
            }
        }
    }

    if seen.len() != layout.rooms.len() {
        return Err(LayoutViolation::Disconnected {
            reachable: seen.len(),
            total: layout.rooms.len(),
        });
    }
    Ok(())
}

fn check_doors(layout: &Layout) -> Result<(), LayoutViolation> {
    for room in &layout.rooms {
        if room.kind == RoomKind::Boss && room.doors.count() != 1 {
            return Err(LayoutViolation::BossDoors { pos: room.pos, count: room.doors.count() });
        }

        for direction in Direction::ALL {
            let neighbor = layout.room_at(room.pos.step(direction));
            let has_door = room.doors.has(direction);
            match neighbor {
                None if has_door => {
                    return Err(LayoutViolation::DanglingDoor { pos: room.pos, direction });
                }
                None => {}
                Some(other) => {
                    if has_door != other.doors.has(direction.opposite()) {
                        return Err(LayoutViolation::UnpairedDoor { pos: room.pos, direction });
                    }
                    let touches_boss = room.kind == RoomKind::Boss || other.kind == RoomKind::Boss;
                    if !has_door && !touches_boss {
                        return Err(LayoutViolation::MissingDoor { pos: room.pos, direction });
                    }
                }
            }
        }
    }
    Ok(())
}
