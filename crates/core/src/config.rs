//! Generator configuration: grid size, room-count bounds, per-kind budgets and retry limits.
//!
//! Loaded from TOML. Room budgets are an array of tables:
//!
//! ```toml
//! grid_width = 10
//! grid_height = 10
//! min_rooms = 10
//! max_rooms = 15
//!
//! [[rooms]]
//! kind = "start"
//! max_per_floor = 1
//!
//! [[rooms]]
//! kind = "boss"
//! max_per_floor = 1
//! required = true
//! visual = "rooms/boss_arena"
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Pos, RoomKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBudget {
    pub kind: RoomKind,
    pub max_per_floor: u8,
    #[serde(default)]
    pub required: bool,
    /// Opaque handle passed through to whatever instantiates the room visually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<String>,
}

impl RoomBudget {
    pub fn new(kind: RoomKind, max_per_floor: u8, required: bool) -> Self {
        Self { kind, max_per_floor, required, visual: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub min_rooms: usize,
    pub max_rooms: usize,
    /// Consecutive rejected attempts before the seed is perturbed.
    pub max_regeneration_attempts: u32,
    /// Rejected attempts after which generation gives up.
    pub max_total_attempts: u32,
    pub rooms: Vec<RoomBudget>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            min_rooms: 10,
            max_rooms: 15,
            max_regeneration_attempts: 5,
            max_total_attempts: 1_000,
            rooms: vec![
                RoomBudget::new(RoomKind::Start, 1, true),
                RoomBudget::new(RoomKind::Boss, 1, true),
                RoomBudget::new(RoomKind::Treasure, 1, true),
                RoomBudget::new(RoomKind::Shop, 1, true),
            ],
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// `None` when the grid is too large to address.
    pub fn cell_count(&self) -> Option<usize> {
        self.grid_width.checked_mul(self.grid_height)
    }

    /// Grid centre. Only in range for a config that passed [`Self::validate`].
    pub fn start_pos(&self) -> Pos {
        Pos::new((self.grid_width / 2) as i32, (self.grid_height / 2) as i32)
    }

    pub fn budget(&self, kind: RoomKind) -> Option<&RoomBudget> {
        self.rooms.iter().find(|budget| budget.kind == kind)
    }

    pub fn max_per_floor(&self, kind: RoomKind) -> u8 {
        self.budget(kind).map_or(0, |budget| budget.max_per_floor)
    }

    /// The boss is always required; other special kinds follow their budget.
    pub fn is_required(&self, kind: RoomKind) -> bool {
        match kind {
            RoomKind::Start | RoomKind::Boss => true,
            RoomKind::Normal => false,
            _ => self.budget(kind).is_some_and(|budget| budget.required),
        }
    }

    pub fn required_special_kinds(&self) -> Vec<RoomKind> {
        RoomKind::SPECIAL.into_iter().filter(|&kind| self.is_required(kind)).collect()
    }

    pub fn visual(&self, kind: RoomKind) -> Option<&str> {
        self.budget(kind).and_then(|budget| budget.visual.as_deref())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid { width: self.grid_width, height: self.grid_height });
        }
        let max_side = usize::try_from(i32::MAX).unwrap_or(usize::MAX);
        let cells = match self.cell_count() {
            Some(cells) if self.grid_width <= max_side && self.grid_height <= max_side => cells,
            _ => {
                return Err(ConfigError::GridTooLarge {
                    width: self.grid_width,
                    height: self.grid_height,
                });
            }
        };
        if self.min_rooms == 0 {
            return Err(ConfigError::ZeroMinRooms);
        }
        if self.min_rooms > self.max_rooms {
            return Err(ConfigError::RoomRangeInverted { min: self.min_rooms, max: self.max_rooms });
        }
        if self.min_rooms > cells {
            return Err(ConfigError::MinRoomsExceedGrid { min: self.min_rooms, cells });
        }
        if self.max_regeneration_attempts == 0 {
            return Err(ConfigError::ZeroRegenerationAttempts);
        }
        if self.max_total_attempts == 0 {
            return Err(ConfigError::ZeroTotalAttempts);
        }

        let mut seen = BTreeSet::new();
        for budget in &self.rooms {
            if budget.kind == RoomKind::Normal {
                return Err(ConfigError::UnbudgetedKind(RoomKind::Normal));
            }
            if !seen.insert(budget.kind) {
                return Err(ConfigError::DuplicateBudget(budget.kind));
            }
        }

        for kind in [RoomKind::Start, RoomKind::Boss] {
            let budget = self.budget(kind).ok_or(ConfigError::MissingBudget(kind))?;
            if budget.max_per_floor != 1 {
                return Err(ConfigError::FixedBudget {
                    kind,
                    expected: 1,
                    actual: budget.max_per_floor,
                });
            }
        }

        for kind in [RoomKind::Treasure, RoomKind::Shop] {
            if self.is_required(kind) && self.max_per_floor(kind) == 0 {
                return Err(ConfigError::RequiredWithoutCapacity(kind));
            }
        }

        let required = 1 + self.required_special_kinds().len();
        if required > self.max_rooms {
            return Err(ConfigError::RequiredRoomsExceedMax { required, max: self.max_rooms });
        }

        Ok(())
    }
}
