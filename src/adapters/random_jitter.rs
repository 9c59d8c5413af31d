//! Jitter drawn from a seedable RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::traits::{JitterSource, JITTER_MAX, JITTER_MIN};

/// Uniform jitter in `[0.2, 0.5)`.
#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence, for tests and benchmarks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterSource for RandomJitter {
    fn factor(&mut self) -> f64 {
        self.rng.gen_range(JITTER_MIN..JITTER_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_stays_in_range() {
        let mut jitter = RandomJitter::new();
        for _ in 0..10_000 {
            let f = jitter.factor();
            assert!((JITTER_MIN..JITTER_MAX).contains(&f), "factor {}", f);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomJitter::seeded(7);
        let mut b = RandomJitter::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.factor(), b.factor());
        }
    }
}
