//! Fixed-size occupancy grid; occupied cells point at their room.

use crate::types::{Direction, Pos, RoomId};

#[derive(Clone, Debug)]
pub(super) struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<RoomId>>,
}

impl Grid {
    pub(super) fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![None; width * height] }
    }

    pub(super) fn in_bounds(&self, pos: Pos) -> bool {
        in_bounds(self.width, self.height, pos)
    }

    pub(super) fn room_at(&self, pos: Pos) -> Option<RoomId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)]
    }

    pub(super) fn is_occupied(&self, pos: Pos) -> bool {
        self.room_at(pos).is_some()
    }

    pub(super) fn occupy(&mut self, pos: Pos, room: RoomId) {
        debug_assert!(self.in_bounds(pos));
        let index = self.index(pos);
        self.cells[index] = Some(room);
    }

    pub(super) fn occupied_neighbors(&self, pos: Pos) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |&direction| self.is_occupied(pos.step(direction)))
    }

    pub(super) fn occupied_neighbor_count(&self, pos: Pos) -> usize {
        self.occupied_neighbors(pos).count()
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

pub(super) fn in_bounds(width: usize, height: usize, pos: Pos) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height
}
