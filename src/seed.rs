//! Deterministic per-entity random streams.
//!
//! Every piece of procedural "flavor" in the engine (orbit eccentricity,
//! axial tilt, jitter, hot-spot placement) is drawn from a [`SeedRng`] keyed
//! by a stable entity identifier. Regenerating the same entity therefore
//! always produces the same values, across processes and platforms.
//!
//! # Example
//!
//! ```
//! use astrarium::seed::SeedRng;
//!
//! let mut a = SeedRng::new("galaxy/m31");
//! let mut b = SeedRng::new("galaxy/m31");
//! assert_eq!(a.value(), b.value());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    let mut hash = seed;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A reproducible random stream derived from a stable string identifier.
///
/// The stream is a pure function of the identifier and the draw index.
/// `ChaCha8Rng` is used rather than `SmallRng` because its output is
/// specified and stable across platforms and crate releases.
#[derive(Clone, Debug)]
pub struct SeedRng {
    base: u64,
    rng: ChaCha8Rng,
}

impl SeedRng {
    /// Create a stream for the given entity identifier.
    pub fn new(id: &str) -> Self {
        let base = fnv1a(FNV_OFFSET, id.as_bytes());
        Self {
            base,
            rng: ChaCha8Rng::seed_from_u64(base),
        }
    }

    /// Derive an independent sub-stream, e.g. one per orbiting body.
    ///
    /// Forking does not consume draws from the parent stream, so adding a
    /// fork never shifts values already derived elsewhere.
    pub fn fork(&self, label: &str) -> Self {
        let base = fnv1a(self.base, label.as_bytes());
        Self {
            base,
            rng: ChaCha8Rng::seed_from_u64(base),
        }
    }

    /// Next value in [0, 1).
    #[inline]
    pub fn value(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Next value in [min, max).
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.value()
    }

    /// Next value in [-1, 1).
    #[inline]
    pub fn signed(&mut self) -> f32 {
        self.value() * 2.0 - 1.0
    }

    /// Next index in [0, n). Returns 0 for an empty range.
    #[inline]
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            self.rng.gen_range(0..n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_ids_identical_streams() {
        let mut a = SeedRng::new("structure-42");
        let mut b = SeedRng::new("structure-42");
        for _ in 0..64 {
            assert_eq!(a.value().to_bits(), b.value().to_bits());
        }
    }

    #[test]
    fn test_different_ids_diverge() {
        let mut a = SeedRng::new("structure-42");
        let mut b = SeedRng::new("structure-43");
        let same = (0..16).filter(|_| a.value() == b.value()).count();
        assert!(same < 16);
    }

    #[test]
    fn test_fork_is_stable_and_independent() {
        let parent = SeedRng::new("system/sol");
        let mut f1 = parent.fork("planet-2");
        let mut f2 = SeedRng::new("system/sol").fork("planet-2");
        assert_eq!(f1.value().to_bits(), f2.value().to_bits());

        // Forking must not consume parent draws.
        let mut p1 = SeedRng::new("system/sol");
        let mut p2 = SeedRng::new("system/sol");
        let _ = p2.fork("anything");
        assert_eq!(p1.value().to_bits(), p2.value().to_bits());
    }

    #[test]
    fn test_value_range() {
        let mut rng = SeedRng::new("bounds");
        for _ in 0..1000 {
            let v = rng.value();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_range_and_signed() {
        let mut rng = SeedRng::new("ranges");
        for _ in 0..1000 {
            let v = rng.range(2.0, 5.0);
            assert!((2.0..5.0).contains(&v));
            let s = rng.signed();
            assert!((-1.0..1.0).contains(&s));
        }
    }
}
