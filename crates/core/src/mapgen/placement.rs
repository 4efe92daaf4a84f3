//! Special-room placement: the per-room roll during expansion and the pass that fills in
//! whatever is still missing once expansion stalls.

use rand_chacha::ChaCha8Rng;

use crate::config::GeneratorConfig;
use crate::types::{RoomId, RoomKind};

use super::attempt::Attempt;
use super::rules::ExpansionRules;
use super::seed::{pick_index, roll};

/// Special kinds that still have room left in their per-floor budget.
fn open_special_kinds(attempt: &Attempt, config: &GeneratorConfig) -> Vec<RoomKind> {
    RoomKind::SPECIAL
        .into_iter()
        .filter(|&kind| attempt.count_of(kind) < usize::from(config.max_per_floor(kind)))
        .collect()
}

/// Rolls whether a freshly placed room becomes special, and which kind.
///
/// A boss tag only sticks on a cell that currently looks like a branch end, unless the
/// rules are lenient.
pub(super) fn roll_special_kind(
    attempt: &Attempt,
    id: RoomId,
    rng: &mut ChaCha8Rng,
    rules: &ExpansionRules,
    config: &GeneratorConfig,
) -> Option<RoomKind> {
    if !roll(rng, rules.special_chance) {
        return None;
    }
    let candidates = open_special_kinds(attempt, config);
    if candidates.is_empty() {
        return None;
    }

    let kind = candidates[pick_index(rng, candidates.len())];
    if kind == RoomKind::Boss
        && !rules.lenient_boss
        && attempt.grid().occupied_neighbor_count(attempt.room(id).pos) != 1
    {
        return None;
    }
    Some(kind)
}

/// Places a boss on a branch end and treasure/shop rooms on interior cells, overwriting
/// normal rooms only. Leaves the attempt untouched where no candidate cell exists.
pub(super) fn place_missing_special_rooms(
    attempt: &mut Attempt,
    rng: &mut ChaCha8Rng,
    rules: &ExpansionRules,
    config: &GeneratorConfig,
) {
    let branch_ends = attempt.branch_ends();

    if attempt.count_of(RoomKind::Boss) == 0 {
        let mut candidates: Vec<RoomId> = branch_ends
            .iter()
            .copied()
            .filter(|&id| attempt.room(id).kind == RoomKind::Normal)
            .collect();
        if candidates.is_empty() && rules.lenient_boss {
            candidates = forced_boss_candidates(attempt);
        }
        if !candidates.is_empty() {
            let id = candidates[pick_index(rng, candidates.len())];
            attempt.set_kind(id, RoomKind::Boss);
        }
    }

    for kind in [RoomKind::Treasure, RoomKind::Shop] {
        if attempt.count_of(kind) > 0 || config.max_per_floor(kind) == 0 {
            continue;
        }
        let candidates: Vec<RoomId> = attempt
            .rooms()
            .filter(|(id, room)| room.kind == RoomKind::Normal && !branch_ends.contains(id))
            .map(|(id, _)| id)
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let id = candidates[pick_index(rng, candidates.len())];
        attempt.set_kind(id, kind);
    }
}

/// Normal rooms nothing was expanded from come first, so closing the boss's other
/// doors cannot strand them.
fn forced_boss_candidates(attempt: &Attempt) -> Vec<RoomId> {
    let normal_rooms = || attempt.rooms().filter(|(_, room)| room.kind == RoomKind::Normal);
    let leaves: Vec<RoomId> =
        normal_rooms().filter(|(_, room)| room.children == 0).map(|(id, _)| id).collect();
    if !leaves.is_empty() {
        return leaves;
    }
    normal_rooms().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::mapgen::doors::derive_doors;
    use crate::types::{Direction, Pos};

    fn rules_for(regeneration_attempts: u32) -> ExpansionRules {
        ExpansionRules::for_attempt(regeneration_attempts, &GeneratorConfig::default())
    }

    /// Start at (1,1) with a full 2x2 loop: no cell is a branch end.
    fn loop_attempt() -> Attempt {
        let mut attempt = Attempt::new(2, 2, Pos::new(1, 1));
        attempt.place(Pos::new(1, 0), RoomKind::Normal, Some(Direction::South));
        attempt.place(Pos::new(0, 1), RoomKind::Normal, Some(Direction::East));
        attempt.place(Pos::new(0, 0), RoomKind::Normal, Some(Direction::East));
        attempt
    }

    /// Start in the middle of a 5x1 strip with two rooms on each side.
    fn strip_attempt() -> Attempt {
        let mut attempt = Attempt::new(5, 1, Pos::new(2, 0));
        attempt.place(Pos::new(1, 0), RoomKind::Normal, Some(Direction::East));
        attempt.place(Pos::new(0, 0), RoomKind::Normal, Some(Direction::East));
        attempt.place(Pos::new(3, 0), RoomKind::Normal, Some(Direction::West));
        attempt.place(Pos::new(4, 0), RoomKind::Normal, Some(Direction::West));
        attempt
    }

    fn kind_at(attempt: &Attempt, pos: Pos) -> RoomKind {
        attempt.room(attempt.grid().room_at(pos).unwrap()).kind
    }

    #[test]
    fn boss_lands_on_a_branch_end_and_others_on_interior_cells() {
        let config = GeneratorConfig::default();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut attempt = strip_attempt();

            place_missing_special_rooms(&mut attempt, &mut rng, &rules_for(0), &config);

            let boss = [Pos::new(0, 0), Pos::new(4, 0)]
                .into_iter()
                .filter(|&pos| kind_at(&attempt, pos) == RoomKind::Boss)
                .count();
            assert_eq!(boss, 1, "seed={seed}");
            let interior = [kind_at(&attempt, Pos::new(1, 0)), kind_at(&attempt, Pos::new(3, 0))];
            assert!(interior.contains(&RoomKind::Treasure), "seed={seed}");
            assert!(interior.contains(&RoomKind::Shop), "seed={seed}");
            assert!(attempt.missing_required_kinds(&config).is_empty());
        }
    }

    #[test]
    fn boss_is_not_forced_before_lenient_attempts() {
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut attempt = loop_attempt();

        place_missing_special_rooms(&mut attempt, &mut rng, &rules_for(1), &config);

        assert_eq!(attempt.count_of(RoomKind::Boss), 0);
        assert_eq!(attempt.missing_required_kinds(&config), vec![RoomKind::Boss]);
    }

    #[test]
    fn forced_boss_lands_on_a_non_start_cell_with_one_door() {
        let config = GeneratorConfig::default();
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut attempt = loop_attempt();

            place_missing_special_rooms(&mut attempt, &mut rng, &rules_for(2), &config);

            assert_eq!(attempt.count_of(RoomKind::Boss), 1, "seed={seed}");
            assert_eq!(kind_at(&attempt, Pos::new(1, 1)), RoomKind::Start);
            // (1,0) has the corner as a child, so only the two leaves qualify.
            assert_ne!(kind_at(&attempt, Pos::new(1, 0)), RoomKind::Boss, "seed={seed}");

            let doors = derive_doors(&attempt);
            let boss_doors = doors
                .iter()
                .find(|(id, _)| attempt.room(*id).kind == RoomKind::Boss)
                .map(|(_, doors)| *doors)
                .unwrap();
            assert!(boss_doors.count() <= 1, "seed={seed}");
        }
    }

    #[test]
    fn roll_never_tags_when_chance_is_zero() {
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let attempt = strip_attempt();
        let id = attempt.grid().room_at(Pos::new(0, 0)).unwrap();
        let rules = ExpansionRules { special_chance: 0.0, ..rules_for(0) };

        for _ in 0..50 {
            assert_eq!(roll_special_kind(&attempt, id, &mut rng, &rules, &config), None);
        }
    }

    #[test]
    fn roll_skips_kinds_whose_budget_is_spent() {
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut attempt = strip_attempt();
        let boss = attempt.grid().room_at(Pos::new(4, 0)).unwrap();
        let shop = attempt.grid().room_at(Pos::new(3, 0)).unwrap();
        attempt.set_kind(boss, RoomKind::Boss);
        attempt.set_kind(shop, RoomKind::Shop);
        let id = attempt.grid().room_at(Pos::new(0, 0)).unwrap();
        let rules = ExpansionRules { special_chance: 1.0, ..rules_for(0) };

        for _ in 0..50 {
            assert_eq!(
                roll_special_kind(&attempt, id, &mut rng, &rules, &config),
                Some(RoomKind::Treasure)
            );
        }
    }

    #[test]
    fn boss_roll_is_discarded_on_cells_with_two_neighbors() {
        let config = GeneratorConfig::default();
        let mut attempt = strip_attempt();
        let treasure = attempt.grid().room_at(Pos::new(4, 0)).unwrap();
        let shop = attempt.grid().room_at(Pos::new(0, 0)).unwrap();
        attempt.set_kind(treasure, RoomKind::Treasure);
        attempt.set_kind(shop, RoomKind::Shop);
        // Only the boss is still open, and (1,0) touches two rooms.
        let interior = attempt.grid().room_at(Pos::new(1, 0)).unwrap();

        let strict = ExpansionRules { special_chance: 1.0, ..rules_for(0) };
        let lenient = ExpansionRules { special_chance: 1.0, ..rules_for(2) };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert_eq!(roll_special_kind(&attempt, interior, &mut rng, &strict, &config), None);
        assert_eq!(
            roll_special_kind(&attempt, interior, &mut rng, &lenient, &config),
            Some(RoomKind::Boss)
        );
    }
}
