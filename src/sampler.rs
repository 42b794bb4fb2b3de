//! Leaf-uniform sampling via per-subtree size estimates.
//!
//! The breadth-first guide covers shallow branches but its random tail
//! is biased toward regions with heavy branching. This guide keeps a
//! decision tree annotated with a rough count of leaves below each node
//! and reweights child selection by those counts, so the distribution of
//! reached leaves drifts toward uniform as the estimates improve.
//!
//! Core concepts:
//! - A node's prior over children is either the explicit weights it was
//!   first visited with or uniform.
//! - A traversal records its trail of visited nodes; dropping the
//!   chooser collapses the trail, refreshing ancestor size estimates.
//! - Landing on a never-entered child keeps the prior untouched; only
//!   revisits are reweighted.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chooser::{ChoiceError, ChoiceResult, Chooser, Guide};
use crate::distributions::Discrete;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
struct Node {
    /// One slot per alternative; `None` until the branch is entered.
    children: Vec<Option<NodeId>>,
    /// Prior over children, present iff the node was first visited with
    /// explicit weights.
    child_sampler: Option<Discrete>,
    /// Rough count of leaves below this node. Meaningful once the node
    /// has been visited or has terminated a traversal.
    size_estimate: f64,
    visited: bool,
}

impl Node {
    fn fresh() -> Self {
        Node {
            children: Vec::new(),
            child_sampler: None,
            size_estimate: 0.0,
            visited: false,
        }
    }

    /// Prior probability of child `slot`.
    fn weight(&self, slot: usize) -> f64 {
        debug_assert!(self.visited);
        match &self.child_sampler {
            Some(sampler) => sampler.probabilities()[slot],
            None => 1.0 / self.children.len() as f64,
        }
    }
}

/// Snapshot of the sampler's tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerStats {
    /// Nodes materialized so far, the root included.
    pub total_nodes: usize,
    /// Smallest size estimate in the tree; at least 1 after any
    /// completed traversal.
    pub min_size_estimate: f64,
}

/// Guide that reweights child selection by estimated subtree size so
/// leaf sampling tends toward uniform.
#[derive(Debug)]
pub struct WeightedSamplerGuide {
    nodes: Vec<Node>,
    rng: ChaCha8Rng,
}

impl WeightedSamplerGuide {
    /// Guide seeded from the OS entropy source.
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Deterministic guide: identical seeds sample identically.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        WeightedSamplerGuide {
            nodes: vec![Node::fresh()],
            rng,
        }
    }

    pub fn stats(&self) -> SamplerStats {
        let min_size_estimate = self
            .nodes
            .iter()
            .map(|node| node.size_estimate)
            .fold(f64::INFINITY, f64::min);
        SamplerStats {
            total_nodes: self.nodes.len(),
            min_size_estimate,
        }
    }

    /// Record a visit of `id` with arity `n`, installing the prior on
    /// first visit. Weights are ignored on revisit.
    fn visit(&mut self, id: NodeId, n: usize, weights: &[u64]) -> ChoiceResult<()> {
        debug_assert!(weights.is_empty() || weights.len() == n);
        let node = &mut self.nodes[id];
        if node.visited {
            if node.children.len() != n {
                return Err(ChoiceError::ArityMismatch {
                    expected: node.children.len(),
                    found: n,
                });
            }
            return Ok(());
        }
        node.children = vec![None; n];
        node.size_estimate = n as f64;
        node.visited = true;
        if !weights.is_empty() {
            node.child_sampler = Some(Discrete::from_counts(weights)?);
        }
        Ok(())
    }

    fn alloc_child(&mut self, parent: NodeId, slot: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::fresh());
        self.nodes[parent].children[slot] = Some(id);
        id
    }

    /// Per-slot selection weights for a revisit of `id`: each entered
    /// child counts its subtree size times its prior; never-entered
    /// children get no mass on this path.
    fn revisit_weights(&self, id: NodeId) -> Vec<f64> {
        let node = &self.nodes[id];
        node.children
            .iter()
            .enumerate()
            .map(|(slot, child)| match child {
                Some(child) => self.nodes[*child].size_estimate * node.weight(slot),
                None => 0.0,
            })
            .collect()
    }

    /// Prior mass sitting on the entered children of `id`: `occupied` is
    /// their total prior probability, `total` additionally weights each
    /// child by its current size estimate.
    ///
    /// The collapse update consumes `occupied` only.
    /// TODO: evaluate `total / occupied` (an importance-sampling leaf
    /// estimate) against the current update on heavily skewed trees.
    fn visited_child_mass(&self, id: NodeId) -> (f64, f64) {
        let node = &self.nodes[id];
        let mut occupied = 0.0;
        let mut total = 0.0;
        for (slot, child) in node.children.iter().enumerate() {
            if let Some(child) = child {
                let weight = node.weight(slot);
                occupied += weight;
                total += self.nodes[*child].size_estimate * weight;
            }
        }
        (occupied, total)
    }

    /// Fold a finished traversal back into the size estimates, deepest
    /// node first.
    fn collapse_trail(&mut self, trail: &mut Vec<NodeId>) {
        if let Some(deepest) = trail.pop() {
            // The node the traversal ended on counts as a single leaf.
            self.nodes[deepest].size_estimate = 1.0;
        }
        while let Some(&last) = trail.last() {
            let (occupied, _total) = self.visited_child_mass(last);
            let refreshed = self.nodes[last].children.len() as f64 / occupied;
            log::trace!("size estimate of node {last} refreshed to {refreshed}");
            self.nodes[last].size_estimate = refreshed;
            trail.pop();
        }
    }
}

impl Default for WeightedSamplerGuide {
    fn default() -> Self {
        Self::new()
    }
}

impl Guide for WeightedSamplerGuide {
    type Chooser<'a> = WeightedSamplerChooser<'a>
    where
        Self: 'a;

    fn make_chooser(&mut self) -> Option<Self::Chooser<'_>> {
        Some(WeightedSamplerChooser {
            trail: vec![ROOT],
            guide: self,
        })
    }
}

/// Chooser handed out by [`WeightedSamplerGuide`].
#[derive(Debug)]
pub struct WeightedSamplerChooser<'a> {
    guide: &'a mut WeightedSamplerGuide,
    /// Nodes visited this traversal, deepest last.
    trail: Vec<NodeId>,
}

impl WeightedSamplerChooser<'_> {
    fn choose_with_weights(&mut self, n: usize, weights: &[u64]) -> ChoiceResult<usize> {
        if n == 0 {
            return Err(ChoiceError::EmptyChoice);
        }
        let current = *self.trail.last().expect("trail holds at least the root");
        self.guide.visit(current, n, weights)?;

        // First pass samples the prior alone; landing on a never-entered
        // child keeps the prior distribution for fresh territory.
        let mut slot = match &self.guide.nodes[current].child_sampler {
            Some(sampler) => sampler.sample(&mut self.guide.rng),
            None => self.guide.rng.gen_range(0..n),
        };

        if self.guide.nodes[current].children[slot].is_some() {
            // Revisit: resample with entered children weighted by their
            // subtree size estimates.
            let reweighted = self.guide.revisit_weights(current);
            slot = Discrete::new(&reweighted)?.sample(&mut self.guide.rng);
        }

        let entered = self.guide.nodes[current].children[slot];
        let next = match entered {
            Some(next) => next,
            None => self.guide.alloc_child(current, slot),
        };
        self.trail.push(next);
        Ok(slot)
    }
}

impl Chooser for WeightedSamplerChooser<'_> {
    fn choose(&mut self, n: usize) -> ChoiceResult<usize> {
        self.choose_with_weights(n, &[])
    }

    fn choose_weighted(&mut self, weights: &[u64]) -> ChoiceResult<usize> {
        self.choose_with_weights(weights.len(), weights)
    }

    fn choose_unimportant(&mut self) -> u64 {
        self.guide.rng.gen()
    }
}

impl Drop for WeightedSamplerChooser<'_> {
    fn drop(&mut self) {
        self.guide.collapse_trail(&mut self.trail);
    }
}
