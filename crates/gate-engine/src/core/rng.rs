//! Injectable randomness for sequence generation and board shuffles.
//!
//! Challenges only ever see `&mut dyn RandomSource`, so tests can seed a
//! deterministic [`Rng`] and hosts can plug in any generator they like.

/// Uniform integer generator.
pub trait RandomSource {
    /// Generate a random number in `[0, upper)`. Returns 0 when `upper` is 0.
    fn next_int(&mut self, upper: u32) -> u32;
}

/// Seedable pseudo-random number generator (xorshift64).
/// Deterministic, fast, no-std compatible.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for Rng {
    fn next_int(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(upper)) as u32
    }
}

#[cfg(feature = "chacha")]
impl RandomSource for rand_chacha::ChaCha8Rng {
    fn next_int(&mut self, upper: u32) -> u32 {
        use rand::Rng as _;
        if upper == 0 {
            return 0;
        }
        self.gen_range(0..upper)
    }
}

/// The generator hosts get by default: ChaCha8 when the `chacha` feature is
/// on, the built-in xorshift otherwise.
pub fn default_source(seed: u64) -> Box<dyn RandomSource> {
    #[cfg(feature = "chacha")]
    {
        use rand::SeedableRng;
        Box::new(rand_chacha::ChaCha8Rng::seed_from_u64(seed))
    }
    #[cfg(not(feature = "chacha"))]
    {
        Box::new(Rng::new(seed))
    }
}

/// Uniform in-place permutation (Fisher–Yates).
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_int(i as u32 + 1) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_deterministic() {
        let mut rng1 = Rng::new(42);
        let mut rng2 = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(rng1.next_int(1000), rng2.next_int(1000));
        }
    }

    #[test]
    fn rng_zero_seed_and_zero_bound_handled() {
        let mut rng = Rng::new(0);
        assert_eq!(rng.next_int(0), 0);
        assert!(rng.next_int(4) < 4);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Rng::new(7);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_handles_tiny_slices() {
        let mut rng = Rng::new(3);
        let mut empty: [u8; 0] = [];
        shuffle(&mut empty, &mut rng);
        let mut one = [9u8];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, [9]);
    }

    #[cfg(feature = "chacha")]
    #[test]
    fn chacha_source_is_seedable() {
        use rand::SeedableRng;
        let mut a = rand_chacha::ChaCha8Rng::seed_from_u64(99);
        let mut b = rand_chacha::ChaCha8Rng::seed_from_u64(99);
        for _ in 0..10 {
            let value = a.next_int(6);
            assert!(value < 6);
            assert_eq!(value, b.next_int(6));
        }
    }

    #[test]
    fn default_source_repeats_for_a_seed() {
        let mut a = default_source(5);
        let mut b = default_source(5);
        let first: Vec<u32> = (0..8).map(|_| a.next_int(100)).collect();
        let second: Vec<u32> = (0..8).map(|_| b.next_int(100)).collect();
        assert_eq!(first, second);
    }
}
