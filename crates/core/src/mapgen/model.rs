//! Public data models for generated floors and rejected attempts.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Direction, DoorSet, Pos, RoomKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedRoom {
    pub pos: Pos,
    pub kind: RoomKind,
    pub doors: DoorSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    pub floor: u32,
    /// Run seed the floor seed was derived from.
    pub base_seed: u64,
    /// Floor seed the successful attempt ran with, after any perturbation.
    pub seed: u64,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Sorted by position; re-sorted when deserialized.
    #[serde(deserialize_with = "deserialize_sorted_rooms")]
    pub rooms: Vec<PlacedRoom>,
}

fn deserialize_sorted_rooms<'de, D>(deserializer: D) -> Result<Vec<PlacedRoom>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut rooms = Vec::<PlacedRoom>::deserialize(deserializer)?;
    rooms.sort_by_key(|room| room.pos);
    Ok(rooms)
}

impl Layout {
    /// Binary search over `rooms`, which must stay sorted by position.
    pub fn room_at(&self, pos: Pos) -> Option<&PlacedRoom> {
        self.rooms.binary_search_by_key(&pos, |room| room.pos).ok().map(|index| &self.rooms[index])
    }

    pub fn rooms_of_kind(&self, kind: RoomKind) -> impl Iterator<Item = &PlacedRoom> {
        self.rooms.iter().filter(move |room| room.kind == kind)
    }

    pub fn start(&self) -> Option<&PlacedRoom> {
        self.rooms_of_kind(RoomKind::Start).next()
    }

    pub fn boss(&self) -> Option<&PlacedRoom> {
        self.rooms_of_kind(RoomKind::Boss).next()
    }

    /// Each pair of rooms joined by a door, once, as `(from, direction, to)` with the
    /// direction always east or south.
    pub fn door_pairs(&self) -> Vec<(Pos, Direction, Pos)> {
        let mut pairs = Vec::new();
        for room in &self.rooms {
            for direction in [Direction::East, Direction::South] {
                if !room.doors.has(direction) {
                    continue;
                }
                let neighbor = room.pos.step(direction);
                if self.room_at(neighbor).is_some_and(|other| other.doors.has(direction.opposite()))
                {
                    pairs.push((room.pos, direction, neighbor));
                }
            }
        }
        pairs
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.floor.to_le_bytes());
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend(room.pos.y.to_le_bytes());
            bytes.extend(room.pos.x.to_le_bytes());
            bytes.push(match room.kind {
                RoomKind::Start => 0,
                RoomKind::Normal => 1,
                RoomKind::Boss => 2,
                RoomKind::Treasure => 3,
                RoomKind::Shop => 4,
            });
            bytes.push(room.doors.bits());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    TooFewRooms { room_count: usize, min_rooms: usize },
    MissingSpecialRooms(Vec<RoomKind>),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewRooms { room_count, min_rooms } => {
                write!(f, "too few rooms ({room_count} < {min_rooms})")
            }
            Self::MissingSpecialRooms(kinds) => {
                let names: Vec<&str> = kinds.iter().map(|kind| kind.as_ref()).collect();
                write!(f, "missing {}", names.join(", "))
            }
        }
    }
}

/// What a rejected attempt looked like when it was abandoned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptStats {
    pub seed: u64,
    pub regeneration_attempt: u32,
    pub room_count: usize,
    pub reason: RejectReason,
}

impl fmt::Display for AttemptStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed {} attempt {}: {} rooms, {}",
            self.seed, self.regeneration_attempt, self.room_count, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Layout {
        Layout {
            width: 3,
            height: 1,
            floor: 1,
            base_seed: 9,
            seed: 9,
            attempts: 1,
            rooms: vec![
                PlacedRoom { pos: Pos::new(0, 0), kind: RoomKind::Boss, doors: DoorSet::EAST },
                PlacedRoom {
                    pos: Pos::new(1, 0),
                    kind: RoomKind::Start,
                    doors: DoorSet::EAST | DoorSet::WEST,
                },
                PlacedRoom { pos: Pos::new(2, 0), kind: RoomKind::Treasure, doors: DoorSet::WEST },
            ],
        }
    }

    #[test]
    fn lookups_find_rooms_by_position_and_kind() {
        let layout = corridor();
        assert_eq!(layout.room_at(Pos::new(2, 0)).map(|room| room.kind), Some(RoomKind::Treasure));
        assert!(layout.room_at(Pos::new(2, 1)).is_none());
        assert_eq!(layout.start().map(|room| room.pos), Some(Pos::new(1, 0)));
        assert_eq!(layout.boss().map(|room| room.pos), Some(Pos::new(0, 0)));
    }

    #[test]
    fn deserialized_rooms_are_put_back_in_position_order() {
        let mut shuffled = corridor();
        shuffled.rooms.reverse();
        let json = serde_json::to_string(&shuffled).unwrap();

        let layout: Layout = serde_json::from_str(&json).unwrap();

        assert_eq!(layout, corridor());
        assert_eq!(layout.room_at(Pos::new(0, 0)).map(|room| room.kind), Some(RoomKind::Boss));
    }

    #[test]
    fn door_pairs_list_each_connection_once() {
        let pairs = corridor().door_pairs();
        assert_eq!(
            pairs,
            vec![
                (Pos::new(0, 0), Direction::East, Pos::new(1, 0)),
                (Pos::new(1, 0), Direction::East, Pos::new(2, 0)),
            ]
        );
    }

    #[test]
    fn fingerprint_tracks_room_kinds() {
        let layout = corridor();
        let mut retagged = layout.clone();
        retagged.rooms[2].kind = RoomKind::Shop;
        assert_eq!(layout.fingerprint(), corridor().fingerprint());
        assert_ne!(layout.fingerprint(), retagged.fingerprint());
    }

    #[test]
    fn attempt_stats_describe_the_rejection() {
        let stats = AttemptStats {
            seed: 42,
            regeneration_attempt: 3,
            room_count: 6,
            reason: RejectReason::MissingSpecialRooms(vec![RoomKind::Boss, RoomKind::Shop]),
        };
        assert_eq!(stats.to_string(), "seed 42 attempt 3: 6 rooms, missing boss, shop");
    }
}
