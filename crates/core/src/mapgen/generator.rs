//! Floor generation driver: expansion stepping, the termination check and the retry loop.
//!
//! Work can be spread across frames with [`DungeonGenerator::advance`] or run to completion
//! with [`DungeonGenerator::run`].

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::types::RoomKind;

use super::attempt::Attempt;
use super::doors::derive_doors;
use super::model::{AttemptStats, Layout, PlacedRoom, RejectReason};
use super::placement::place_missing_special_rooms;
use super::rules::ExpansionRules;
use super::seed::{derive_floor_seed, resolve_base_seed};

/// Frontier cells expanded per step when running to completion.
pub const STEP_BUDGET: u32 = 8;

#[derive(Clone, Debug)]
pub struct AdvanceResult {
    pub expanded_cells: u32,
    pub stop_reason: AdvanceStopReason,
}

#[derive(Clone, Debug)]
pub enum AdvanceStopReason {
    Finished(Box<Layout>),
    /// The attempt failed its termination check and a fresh one was started.
    AttemptRejected(AttemptStats),
    BudgetExhausted,
}

pub struct DungeonGenerator {
    config: GeneratorConfig,
    floor: u32,
    base_seed: u64,
    seed: u64,
    rng: ChaCha8Rng,
    regeneration_attempts: u32,
    total_attempts: u32,
    attempt: Attempt,
    finished: bool,
}

impl DungeonGenerator {
    /// A `base_seed` of 0 draws a fresh seed.
    pub fn new(
        config: GeneratorConfig,
        base_seed: u64,
        floor: u32,
    ) -> Result<Self, GenerationError> {
        config.validate()?;
        if floor == 0 {
            return Err(GenerationError::InvalidFloor(floor));
        }

        let base_seed = resolve_base_seed(base_seed);
        let seed = derive_floor_seed(base_seed, floor);
        let attempt = fresh_attempt(&config);
        debug!(base_seed, seed, floor, "starting floor generation");

        Ok(Self {
            config,
            floor,
            base_seed,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            regeneration_attempts: 0,
            total_attempts: 0,
            attempt,
            finished: false,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Seed of the running attempt; drifts from the floor seed after perturbation.
    pub fn current_seed(&self) -> u64 {
        self.seed
    }

    /// Consecutive rejected attempts since the last seed perturbation.
    pub fn regeneration_attempts(&self) -> u32 {
        self.regeneration_attempts
    }

    /// Rejected attempts since generation began.
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    pub fn room_count(&self) -> usize {
        self.attempt.room_count()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Expands up to `budget` frontier cells. Once expansion stalls the attempt is either
    /// accepted or rejected within the same call.
    pub fn advance(&mut self, budget: u32) -> Result<AdvanceResult, GenerationError> {
        if self.finished {
            return Err(GenerationError::AlreadyFinished);
        }

        let rules = ExpansionRules::for_attempt(self.regeneration_attempts, &self.config);
        let mut expanded_cells = 0;
        while expanded_cells < budget {
            if self.attempt.is_stalled(rules.max_rooms) {
                let stop_reason = self.conclude_attempt(&rules)?;
                return Ok(AdvanceResult { expanded_cells, stop_reason });
            }
            self.attempt.expand_next(&mut self.rng, &rules, &self.config);
            expanded_cells += 1;
        }

        Ok(AdvanceResult { expanded_cells, stop_reason: AdvanceStopReason::BudgetExhausted })
    }

    pub fn run(mut self, cancel: &CancelToken) -> Result<Layout, GenerationError> {
        loop {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled { attempts: self.total_attempts });
            }
            if let AdvanceStopReason::Finished(layout) = self.advance(STEP_BUDGET)?.stop_reason {
                return Ok(*layout);
            }
        }
    }

    fn conclude_attempt(
        &mut self,
        rules: &ExpansionRules,
    ) -> Result<AdvanceStopReason, GenerationError> {
        let room_count = self.attempt.room_count();
        if room_count < self.config.min_rooms {
            return self.reject(RejectReason::TooFewRooms {
                room_count,
                min_rooms: self.config.min_rooms,
            });
        }

        place_missing_special_rooms(&mut self.attempt, &mut self.rng, rules, &self.config);
        let missing = self.attempt.missing_required_kinds(&self.config);
        if !missing.is_empty() {
            return self.reject(RejectReason::MissingSpecialRooms(missing));
        }

        self.finished = true;
        let layout = self.build_layout();
        info!(
            floor = layout.floor,
            seed = layout.seed,
            rooms = layout.rooms.len(),
            attempts = layout.attempts,
            "floor generated"
        );
        Ok(AdvanceStopReason::Finished(Box::new(layout)))
    }

    fn reject(&mut self, reason: RejectReason) -> Result<AdvanceStopReason, GenerationError> {
        let stats = AttemptStats {
            seed: self.seed,
            regeneration_attempt: self.regeneration_attempts,
            room_count: self.attempt.room_count(),
            reason,
        };
        self.total_attempts += 1;
        debug!(total_attempts = self.total_attempts, "rejected attempt: {stats}");

        if self.total_attempts >= self.config.max_total_attempts {
            self.finished = true;
            return Err(GenerationError::Exhausted { attempts: self.total_attempts, last: stats });
        }

        self.regeneration_attempts += 1;
        if self.regeneration_attempts >= self.config.max_regeneration_attempts {
            let previous = self.seed;
            self.seed = self.seed.wrapping_add(u64::from(self.regeneration_attempts));
            self.rng = ChaCha8Rng::seed_from_u64(self.seed);
            self.regeneration_attempts = 0;
            warn!(previous, seed = self.seed, "perturbing seed after repeated failures");
        }

        self.attempt = fresh_attempt(&self.config);
        Ok(AdvanceStopReason::AttemptRejected(stats))
    }

    fn build_layout(&self) -> Layout {
        let mut rooms: Vec<PlacedRoom> = derive_doors(&self.attempt)
            .into_iter()
            .map(|(id, doors)| {
                let room = self.attempt.room(id);
                PlacedRoom { pos: room.pos, kind: room.kind, doors }
            })
            .collect();
        rooms.sort_by_key(|room| room.pos);

        debug_assert_eq!(rooms.iter().filter(|room| room.kind == RoomKind::Start).count(), 1);

        Layout {
            width: self.config.grid_width,
            height: self.config.grid_height,
            floor: self.floor,
            base_seed: self.base_seed,
            seed: self.seed,
            attempts: self.total_attempts + 1,
            rooms,
        }
    }
}

fn fresh_attempt(config: &GeneratorConfig) -> Attempt {
    Attempt::new(config.grid_width, config.grid_height, config.start_pos())
}
