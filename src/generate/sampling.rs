//! Random draws used by the generators.
//!
//! Every helper takes the RNG explicitly and clamps its parameters into the
//! distribution's valid domain, so no draw can fail at runtime.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, Poisson};

/// Build the generator RNG: reproducible when seeded, entropy-backed otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Clamp a probability into [0, 1]. NaN counts as 0.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// True with probability `p`, drawn as `uniform < p`.
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < clamp_probability(p)
}

/// Poisson count. Non-positive or non-finite rates yield 0 without drawing.
pub fn poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    if !lambda.is_finite() || lambda <= 0.0 {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => {
            let n: f64 = dist.sample(rng);
            n as u64
        }
        Err(_) => 0,
    }
}

/// Normal draw clamped into `[lo, hi]`.
pub fn clamped_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64, lo: f64, hi: f64) -> f64 {
    let value = match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    };
    value.clamp(lo, hi)
}

/// Uniform minute offset within an hour.
pub fn minute_offset<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(0..60)
}

/// Pick one option by weight. Unusable weights fall back to the first option.
///
/// Panics if `options` is empty.
pub fn weighted_choice<R: Rng + ?Sized, T: Copy>(rng: &mut R, options: &[(T, f64)]) -> T {
    match WeightedIndex::new(options.iter().map(|(_, w)| w.max(0.0))) {
        Ok(index) => options[index.sample(rng)].0,
        Err(_) => options[0].0,
    }
}
