//! Run-scoped randomness.
//!
//! The core is the stock xorshift64* step (shift triple 12/25/27, Vigna's multiplier), reused
//! as is so sequences match other xorshift64* layouts for the same seed. Seeding, resets and
//! the draws below follow the option flow of a layout run.

use crate::options::LayoutOptions;

const XORSHIFT_MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// Seeded generator owned by the engine; every random decision of a run (scattering, rotation
/// picks) draws from it, so a fixed `random_seed` reproduces a run bit for bit.
#[derive(Debug, Clone)]
pub struct LayoutRng {
    seed: u64,
    state: u64,
}

impl LayoutRng {
    /// A zero seed would lock xorshift at zero, so it is bumped to one.
    pub fn new(seed: u64) -> Self {
        let seed = seed.max(1);
        Self { seed, state: seed }
    }

    pub fn from_options(options: &LayoutOptions) -> Self {
        Self::new(options.random_seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the sequence from the seed it was created with.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(XORSHIFT_MULTIPLIER)
    }

    /// Uniform sample from `[0, 1)` with 53 bits of precision.
    pub fn next_f64_unit(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }

    /// A point in the unit square, x drawn before y.
    pub fn next_unit_point(&mut self) -> (f64, f64) {
        let x = self.next_f64_unit();
        let y = self.next_f64_unit();
        (x, y)
    }

    /// Index in `0..upper`, chosen as `floor(unit * upper)`.
    pub fn next_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let v = self.next_f64_unit();
        let idx = (v * (upper as f64)).floor() as usize;
        idx.min(upper - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutRng;
    use crate::options::LayoutOptions;

    #[test]
    fn seed_one_produces_the_reference_sequence() {
        let mut rng = LayoutRng::new(1);
        let expected = [
            0.28083505005035947,
            0.6711372530266764,
            0.7258461452833668,
            0.303529299965799,
            0.056176763098259475,
        ];
        for (i, &e) in expected.iter().enumerate() {
            let v = rng.next_f64_unit();
            assert!(
                (v - e).abs() < 1e-15,
                "unexpected rng value at {i}: got {v}, expected {e}"
            );
        }
    }

    #[test]
    fn zero_seed_is_bumped() {
        let mut a = LayoutRng::new(0);
        let mut b = LayoutRng::new(1);
        assert_eq!(a.seed(), 1);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn options_seed_the_generator_and_reset_replays_it() {
        let options = LayoutOptions {
            random_seed: 42,
            ..LayoutOptions::default()
        };
        let mut rng = LayoutRng::from_options(&options);
        assert_eq!(rng.seed(), 42);
        let first = rng.next_unit_point();
        rng.next_u64();
        rng.reset();
        assert_eq!(rng.next_unit_point(), first);
    }

    #[test]
    fn next_usize_floors_the_unit_sample() {
        let mut rng = LayoutRng::new(1);
        assert_eq!(rng.next_usize(3), 0);
        assert_eq!(rng.next_usize(1), 0);
    }
}
