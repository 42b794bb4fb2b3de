//! Naive baseline guide: every choice is an independent PRNG draw.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chooser::{ChoiceError, ChoiceResult, Chooser, Guide};
use crate::distributions::Discrete;

/// Guide that keeps no memory of past traversals.
///
/// Every `choose` resolves to a fresh uniform draw and `make_chooser`
/// always succeeds. Useful as a baseline for comparing the smarter
/// guides, and for getting used to the API without path selection
/// in the way.
#[derive(Debug)]
pub struct DefaultGuide {
    rng: ChaCha8Rng,
}

impl DefaultGuide {
    /// Guide seeded from the OS entropy source.
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Deterministic guide: identical seeds replay identical draws.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        DefaultGuide { rng }
    }
}

impl Default for DefaultGuide {
    fn default() -> Self {
        Self::new()
    }
}

impl Guide for DefaultGuide {
    type Chooser<'a> = DefaultChooser<'a>
    where
        Self: 'a;

    fn make_chooser(&mut self) -> Option<Self::Chooser<'_>> {
        Some(DefaultChooser { guide: self })
    }
}

/// Chooser handed out by [`DefaultGuide`].
#[derive(Debug)]
pub struct DefaultChooser<'a> {
    guide: &'a mut DefaultGuide,
}

impl Chooser for DefaultChooser<'_> {
    fn choose(&mut self, n: usize) -> ChoiceResult<usize> {
        if n == 0 {
            return Err(ChoiceError::EmptyChoice);
        }
        Ok(self.guide.rng.gen_range(0..n))
    }

    fn choose_weighted(&mut self, weights: &[u64]) -> ChoiceResult<usize> {
        let dist = Discrete::from_counts(weights)?;
        Ok(dist.sample(&mut self.guide.rng))
    }

    fn choose_unimportant(&mut self) -> u64 {
        self.guide.rng.gen()
    }
}
