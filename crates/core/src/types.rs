use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct RoomId;
}

/// Grid coordinate of a room cell. Ordered row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self { y: self.y + dy, x: self.x + dx }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    /// `(dx, dy)` with `y` growing southwards.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    pub const fn door(self) -> DoorSet {
        match self {
            Self::North => DoorSet::NORTH,
            Self::East => DoorSet::EAST,
            Self::South => DoorSet::SOUTH,
            Self::West => DoorSet::WEST,
        }
    }
}

bitflags! {
    /// Open doors on the four sides of a room.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DoorSet: u8 {
        const NORTH = 1 << 0;
        const EAST  = 1 << 1;
        const SOUTH = 1 << 2;
        const WEST  = 1 << 3;
    }
}

impl DoorSet {
    pub fn has(self, direction: Direction) -> bool {
        self.contains(direction.door())
    }

    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }

    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |direction| self.has(*direction))
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoomKind {
    Start,
    Normal,
    Boss,
    Treasure,
    Shop,
}

impl RoomKind {
    pub const SPECIAL: [RoomKind; 3] = [RoomKind::Boss, RoomKind::Treasure, RoomKind::Shop];
}
