use crate::Basis;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Bits and bases prepared by one party for a single protocol run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub bits: Vec<bool>,
    pub bases: Vec<Basis>,
}

/// Source of randomness for one protocol run.
///
/// Every random draw of a run (bits, bases, sample positions) goes through the
/// `Sampler` handed to it, so two runs never share state and a seeded sampler
/// replays a run exactly.
#[derive(Debug, Clone)]
pub struct Sampler<R = ThreadRng> {
    rng: R,
}

impl Sampler<ThreadRng> {
    /// Creates a `Sampler` backed by the thread-local generator.
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for Sampler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler<StdRng> {
    /// Creates a reproducible `Sampler` from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Sampler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// `n` independent fair bits.
    pub fn random_bits(&mut self, n: usize) -> Vec<bool> {
        (0..n).map(|_| self.rng.random_bool(0.5)).collect()
    }

    /// `n` independent, uniformly chosen bases.
    pub fn random_bases(&mut self, n: usize) -> Vec<Basis> {
        (0..n).map(|_| Basis::random(&mut self.rng)).collect()
    }

    /// Bits and bases for a sending party.
    pub fn party(&mut self, n: usize) -> Party {
        let bits = self.random_bits(n);
        let bases = self.random_bases(n);
        Party { bits, bases }
    }

    /// `count` positions drawn uniformly from `0..upper`, with replacement.
    ///
    /// Returns an empty selection when `upper` is zero.
    pub fn selection_indices(&mut self, count: usize, upper: usize) -> Vec<usize> {
        if upper == 0 {
            return Vec::new();
        }
        (0..count).map(|_| self.rng.random_range(0..upper)).collect()
    }

    /// Lends the generator, e.g. to build a channel from the same stream.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}
