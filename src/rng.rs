use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounded integer dice for speed and position variance.
///
/// Seeded sources replay the exact same session, which is what the tests
/// lean on. The browser build draws from entropy (getrandom `js` feature).
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        RandomSource {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is present, entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Integer in `[offset, offset + range)`.
    /// - `range == 0` always yields `offset`
    pub fn int(&mut self, range: u32, offset: i32) -> i32 {
        if range == 0 {
            return offset;
        }
        offset + self.rng.gen_range(0..range) as i32
    }

    /// Integer in `[low, high]`, collapsing to `low` when the bounds cross.
    pub fn int_between(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Uniform index into a collection of `len` items
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_stays_within_offset_range() {
        let mut dice = RandomSource::seeded(7);
        for _ in 0..500 {
            let roll = dice.int(5, -2);
            assert!((-2..=2).contains(&roll), "roll was {}", roll);
        }
    }

    #[test]
    fn zero_range_is_the_offset() {
        let mut dice = RandomSource::seeded(7);
        assert_eq!(dice.int(0, 4), 4);
    }

    #[test]
    fn int_between_is_inclusive() {
        let mut dice = RandomSource::seeded(11);
        let rolls: Vec<u32> = (0..2_000).map(|_| dice.int_between(50, 52)).collect();
        assert!(rolls.contains(&50));
        assert!(rolls.contains(&52));
        assert!(rolls.iter().all(|speed| (50..=52).contains(speed)));
    }

    #[test]
    fn crossed_bounds_collapse_to_low() {
        let mut dice = RandomSource::seeded(11);
        assert_eq!(dice.int_between(70, 60), 70);
    }

    #[test]
    fn same_seed_same_session() {
        let mut a = RandomSource::seeded(42);
        let mut b = RandomSource::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.int(1000, 0), b.int(1000, 0));
        }
    }

    #[test]
    fn index_of_empty_is_none() {
        let mut dice = RandomSource::seeded(3);
        assert_eq!(dice.index(0), None);
        assert!(dice.index(4).unwrap() < 4);
    }
}
