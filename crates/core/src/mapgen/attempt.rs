//! State of a single generation attempt: occupancy grid, placed rooms and the expansion frontier.
//! A fresh `Attempt` is built for every retry; nothing carries over between attempts.

use std::collections::VecDeque;

use rand_chacha::ChaCha8Rng;
use slotmap::SlotMap;

use crate::config::GeneratorConfig;
use crate::types::{Direction, Pos, RoomId, RoomKind};

use super::grid::Grid;
use super::placement::roll_special_kind;
use super::rules::ExpansionRules;
use super::seed::roll;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct RoomNode {
    pub(super) pos: Pos,
    pub(super) kind: RoomKind,
    /// Side facing the room this one was expanded from. `None` only for the start room.
    pub(super) parent: Option<Direction>,
    pub(super) children: u8,
}

pub(super) struct Attempt {
    grid: Grid,
    rooms: SlotMap<RoomId, RoomNode>,
    frontier: VecDeque<Pos>,
}

impl Attempt {
    pub(super) fn new(width: usize, height: usize, start_pos: Pos) -> Self {
        let mut attempt = Self {
            grid: Grid::new(width, height),
            rooms: SlotMap::with_key(),
            frontier: VecDeque::new(),
        };
        attempt.place(start_pos, RoomKind::Start, None);
        attempt
    }

    pub(super) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(super) fn room(&self, id: RoomId) -> &RoomNode {
        &self.rooms[id]
    }

    pub(super) fn rooms(&self) -> impl Iterator<Item = (RoomId, &RoomNode)> {
        self.rooms.iter()
    }

    pub(super) fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub(super) fn count_of(&self, kind: RoomKind) -> usize {
        self.rooms.values().filter(|room| room.kind == kind).count()
    }

    pub(super) fn is_stalled(&self, max_rooms: usize) -> bool {
        self.frontier.is_empty() || self.room_count() >= max_rooms
    }

    /// Pops one frontier cell and tries its four neighbours. Returns how many rooms were placed.
    pub(super) fn expand_next(
        &mut self,
        rng: &mut ChaCha8Rng,
        rules: &ExpansionRules,
        config: &GeneratorConfig,
    ) -> usize {
        let Some(pos) = self.frontier.pop_front() else {
            return 0;
        };
        // Bosses stay dead ends.
        if self.grid.room_at(pos).is_some_and(|id| self.rooms[id].kind == RoomKind::Boss) {
            return 0;
        }

        let mut placed = 0;
        for direction in Direction::ALL {
            let target = pos.step(direction);
            if self.try_place_neighbor(target, direction.opposite(), rng, rules, config).is_some() {
                placed += 1;
            }
        }
        placed
    }

    fn try_place_neighbor(
        &mut self,
        target: Pos,
        toward_parent: Direction,
        rng: &mut ChaCha8Rng,
        rules: &ExpansionRules,
        config: &GeneratorConfig,
    ) -> Option<RoomId> {
        if !self.grid.in_bounds(target)
            || self.grid.is_occupied(target)
            || self.room_count() >= rules.max_rooms
        {
            return None;
        }
        if roll(rng, rules.skip_chance) {
            return None;
        }
        if self.grid.occupied_neighbor_count(target) > rules.adjacency_cap {
            return None;
        }

        let id = self.place(target, RoomKind::Normal, Some(toward_parent));
        if let Some(kind) = roll_special_kind(self, id, rng, rules, config) {
            self.set_kind(id, kind);
        }
        Some(id)
    }

    /// Occupies `pos` and queues it for expansion.
    pub(super) fn place(&mut self, pos: Pos, kind: RoomKind, parent: Option<Direction>) -> RoomId {
        let id = self.rooms.insert(RoomNode { pos, kind, parent, children: 0 });
        self.grid.occupy(pos, id);
        self.frontier.push_back(pos);
        if let Some(parent_id) = parent.and_then(|direction| self.grid.room_at(pos.step(direction)))
        {
            self.rooms[parent_id].children += 1;
        }
        id
    }

    pub(super) fn set_kind(&mut self, id: RoomId, kind: RoomKind) {
        self.rooms[id].kind = kind;
    }

    /// Occupied non-start cells with exactly one occupied neighbour.
    pub(super) fn branch_ends(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|(_, room)| {
                room.kind != RoomKind::Start && self.grid.occupied_neighbor_count(room.pos) == 1
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub(super) fn missing_required_kinds(&self, config: &GeneratorConfig) -> Vec<RoomKind> {
        config
            .required_special_kinds()
            .into_iter()
            .filter(|&kind| self.count_of(kind) == 0)
            .collect()
    }
}
