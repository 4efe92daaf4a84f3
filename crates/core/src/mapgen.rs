//! Procedural room-graph generation split into coherent submodules.

pub mod model;

mod attempt;
mod doors;
mod generator;
mod grid;
mod placement;
mod rules;
mod seed;
mod verify;

pub use generator::{AdvanceResult, AdvanceStopReason, DungeonGenerator, STEP_BUDGET};
pub use model::{AttemptStats, Layout, PlacedRoom, RejectReason};
pub use seed::{FLOOR_SEED_STRIDE, derive_floor_seed, generate_runtime_seed, resolve_base_seed};
pub use verify::{LayoutViolation, verify_layout};

use crate::cancel::CancelToken;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;

pub fn generate(
    seed: u64,
    floor: u32,
    config: &GeneratorConfig,
) -> Result<Layout, GenerationError> {
    generate_with_cancel(seed, floor, config, &CancelToken::new())
}

pub fn generate_with_cancel(
    seed: u64,
    floor: u32,
    config: &GeneratorConfig,
    cancel: &CancelToken,
) -> Result<Layout, GenerationError> {
    DungeonGenerator::new(config.clone(), seed, floor)?.run(cancel)
}
