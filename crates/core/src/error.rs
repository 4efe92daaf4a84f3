//! Errors surfaced by configuration loading and floor generation.

use std::io;

use thiserror::Error;

use crate::mapgen::AttemptStats;
use crate::types::RoomKind;

/// A configuration that no generation attempt could satisfy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid of {width}x{height} is too large to address")]
    GridTooLarge { width: usize, height: usize },

    #[error("min_rooms must be at least 1")]
    ZeroMinRooms,

    #[error("min_rooms ({min}) exceeds max_rooms ({max})")]
    RoomRangeInverted { min: usize, max: usize },

    #[error("min_rooms ({min}) exceeds the {cells} cells of the grid")]
    MinRoomsExceedGrid { min: usize, cells: usize },

    #[error("no budget defined for the {0} room")]
    MissingBudget(RoomKind),

    #[error("{0} rooms cannot carry a budget")]
    UnbudgetedKind(RoomKind),

    #[error("budget for {0} is defined more than once")]
    DuplicateBudget(RoomKind),

    #[error("{kind} budget must allow exactly {expected} room(s), got {actual}")]
    FixedBudget { kind: RoomKind, expected: u8, actual: u8 },

    #[error("{0} is required but its budget allows zero rooms")]
    RequiredWithoutCapacity(RoomKind),

    #[error("{required} required rooms do not fit in max_rooms ({max})")]
    RequiredRoomsExceedMax { required: usize, max: usize },

    #[error("max_regeneration_attempts must be at least 1")]
    ZeroRegenerationAttempts,

    #[error("max_total_attempts must be at least 1")]
    ZeroTotalAttempts,

    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("floor numbers start at 1, got {0}")]
    InvalidFloor(u32),

    #[error("generation gave up after {attempts} rejected attempts (last: {last})")]
    Exhausted { attempts: u32, last: AttemptStats },

    #[error("generation was cancelled after {attempts} rejected attempts")]
    Cancelled { attempts: u32 },

    #[error("generation already finished")]
    AlreadyFinished,
}
