//! Discrete probability distributions shared by the guides.

use rand::Rng;

use crate::chooser::{ChoiceError, ChoiceResult};

/// A discrete distribution over `0..n`, stored as normalized
/// probabilities.
///
/// Weights are treated as non-negative reals. Construction rejects empty
/// and all-zero weight vectors so the guides can report those as caller
/// API violations before any tree state is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrete {
    probabilities: Vec<f64>,
}

impl Discrete {
    /// Build a distribution from raw non-negative weights.
    pub fn new(weights: &[f64]) -> ChoiceResult<Self> {
        if weights.is_empty() {
            return Err(ChoiceError::EmptyChoice);
        }
        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(ChoiceError::DegenerateWeights);
        }
        Ok(Discrete {
            probabilities: weights.iter().map(|w| w / total).collect(),
        })
    }

    /// Build from the integer counts choosers accept.
    pub fn from_counts(weights: &[u64]) -> ChoiceResult<Self> {
        let weights: Vec<f64> = weights.iter().map(|&w| w as f64).collect();
        Self::new(&weights)
    }

    /// Normalized probability of each index.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Sample an index according to the stored probabilities.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let mut target = rng.gen::<f64>();
        for (i, p) in self.probabilities.iter().enumerate() {
            target -= p;
            if target < 0.0 && *p > 0.0 {
                return i;
            }
        }
        // Accumulated rounding can leave a sliver of target mass; land on
        // the last index that actually has probability.
        self.probabilities
            .iter()
            .rposition(|&p| p > 0.0)
            .unwrap_or(0)
    }
}
