//! Per-floor seed derivation, fresh-seed generation and PRNG roll helpers.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

/// Seed distance between consecutive floors of one run.
pub const FLOOR_SEED_STRIDE: u64 = 10_000;

/// `base_seed + (floor - 1) * 10000`, wrapping.
pub fn derive_floor_seed(base_seed: u64, floor: u32) -> u64 {
    let floor_offset = u64::from(floor.saturating_sub(1)).wrapping_mul(FLOOR_SEED_STRIDE);
    base_seed.wrapping_add(floor_offset)
}

static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A non-zero seed drawn from wall-clock time, process id and a call counter.
pub fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    match mix_seed(entropy) {
        0 => 1,
        seed => seed,
    }
}

/// Zero means "not yet assigned".
pub fn resolve_base_seed(seed: u64) -> u64 {
    if seed == 0 { generate_runtime_seed() } else { seed }
}

fn mix_seed(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

/// Uniform float in `[0, 1)` from the top 53 bits of one draw.
pub(super) fn unit_float(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
}

pub(super) fn roll(rng: &mut ChaCha8Rng, probability: f64) -> bool {
    unit_float(rng) < probability
}

pub(super) fn pick_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    #[test]
    fn floor_seed_steps_by_ten_thousand_per_floor() {
        assert_eq!(derive_floor_seed(42, 1), 42);
        assert_eq!(derive_floor_seed(42, 2), 10_042);
        assert_eq!(derive_floor_seed(7, 5), 40_007);
    }

    #[test]
    fn floor_seed_wraps_instead_of_overflowing() {
        assert_eq!(derive_floor_seed(u64::MAX, 2), FLOOR_SEED_STRIDE - 1);
    }

    #[test]
    fn zero_seed_resolves_to_a_fresh_non_zero_seed() {
        assert_ne!(resolve_base_seed(0), 0);
        assert_eq!(resolve_base_seed(1_234), 1_234);
    }

    #[test]
    fn generated_seed_changes_between_calls() {
        let first = generate_runtime_seed();
        let second = generate_runtime_seed();
        assert_ne!(first, second, "runtime seed generation should vary per call");
    }

    #[test]
    fn rolls_respect_probability_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            assert!(!roll(&mut rng, 0.0));
            assert!(roll(&mut rng, 1.0));
            let value = unit_float(&mut rng);
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn pick_index_stays_inside_requested_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        for len in 1..20 {
            assert!(pick_index(&mut rng, len) < len);
        }
    }
}
