//! Expansion rules that loosen as consecutive regeneration attempts fail.

use crate::config::GeneratorConfig;

const BASE_SKIP_CHANCE: f64 = 0.5;
const SKIP_CHANCE_DECAY_PER_ATTEMPT: f64 = 0.1;
const BASE_SPECIAL_CHANCE: f64 = 0.2;
const SPECIAL_CHANCE_GROWTH_PER_ATTEMPT: f64 = 0.1;

const STRICT_ADJACENCY_CAP: usize = 1;
const RELAXED_ADJACENCY_CAP: usize = 2;
const RELAXED_ADJACENCY_AFTER_ATTEMPTS: u32 = 3;

pub(super) const LENIENT_BOSS_AFTER_ATTEMPTS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ExpansionRules {
    pub(super) max_rooms: usize,
    /// Chance that a valid neighbour is skipped anyway.
    pub(super) skip_chance: f64,
    /// Most occupied neighbours a new cell may already have.
    pub(super) adjacency_cap: usize,
    /// Chance that a freshly placed room is tagged as a special kind.
    pub(super) special_chance: f64,
    /// Boss tags and forced boss placement no longer need a branch end.
    pub(super) lenient_boss: bool,
}

impl ExpansionRules {
    pub(super) fn for_attempt(regeneration_attempts: u32, config: &GeneratorConfig) -> Self {
        let attempts = f64::from(regeneration_attempts);
        let adjacency_cap = if regeneration_attempts >= RELAXED_ADJACENCY_AFTER_ATTEMPTS {
            RELAXED_ADJACENCY_CAP
        } else {
            STRICT_ADJACENCY_CAP
        };

        Self {
            max_rooms: config.max_rooms,
            skip_chance: (BASE_SKIP_CHANCE - SKIP_CHANCE_DECAY_PER_ATTEMPT * attempts).max(0.0),
            adjacency_cap,
            special_chance: (BASE_SPECIAL_CHANCE + SPECIAL_CHANCE_GROWTH_PER_ATTEMPT * attempts)
                .min(1.0),
            lenient_boss: regeneration_attempts >= LENIENT_BOSS_AFTER_ATTEMPTS,
        }
    }
}
