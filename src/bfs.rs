//! Breadth-first exhaustive exploration of the decision tree.
//!
//! The guide grows a decision tree across traversals. Each planned
//! traversal replays a saved prefix down to a frontier node, takes one
//! previously untaken branch there, and continues with random draws past
//! the frontier. The frontier queue drains lowest level first, so the
//! shallow decision space is covered before anything deeper, and
//! [`Guide::make_chooser`] reports exhaustion once every branch of the
//! space has been taken.
//!
//! Core concepts:
//! - Nodes live in an arena; parents own their child slots and the
//!   frontier queue holds arena ids only.
//! - A `None` child slot means the branch exists but has never been
//!   entered; a node stays on the frontier while it has one.
//! - The root carries a single child slot: the first decision of every
//!   traversal lives at `children[0]`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chooser::{ChoiceError, ChoiceResult, Chooser, Guide};
use crate::distributions::Discrete;
use crate::frontier::Frontier;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
struct Node {
    /// Back-link for replay-path reconstruction: the owning parent and
    /// the child slot this node occupies there. Absent at the root.
    parent: Option<(NodeId, usize)>,
    /// One slot per alternative, sized to the arity seen at first visit.
    children: Vec<Option<NodeId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Idle,
    Exhausted,
}

/// Snapshot of exploration progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfsStats {
    /// Nodes materialized so far, the root excluded.
    pub total_nodes: u64,
    /// Highest level fully drained from the frontier, if any level is.
    pub max_saved_level: Option<usize>,
    /// Frontier entries still waiting to be explored.
    pub frontier_len: usize,
}

/// Guide that explores the decision tree breadth-first, reverting to
/// random choices beyond the frontier.
#[derive(Debug)]
pub struct BfsGuide {
    nodes: Vec<Node>,
    frontier: Frontier<NodeId>,
    total_nodes: u64,
    max_saved_level: Option<usize>,
    state: State,
    rng: ChaCha8Rng,
}

impl BfsGuide {
    /// Guide seeded from the OS entropy source.
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Deterministic guide: identical seeds explore identically.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        let root = Node {
            parent: None,
            children: vec![None],
        };
        BfsGuide {
            nodes: vec![root],
            frontier: Frontier::new(),
            total_nodes: 0,
            max_saved_level: None,
            state: State::Fresh,
            rng,
        }
    }

    /// Count of materialized tree nodes, the root excluded.
    pub fn total_nodes(&self) -> u64 {
        self.total_nodes
    }

    /// Highest level fully drained from the frontier so far. The
    /// sequence of values observed across traversals never decreases.
    pub fn max_saved_level(&self) -> Option<usize> {
        self.max_saved_level
    }

    /// Whether every branch of the decision space has been taken.
    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    pub fn stats(&self) -> BfsStats {
        BfsStats {
            total_nodes: self.total_nodes,
            max_saved_level: self.max_saved_level,
            frontier_len: self.frontier.len(),
        }
    }

    fn alloc(&mut self, parent: Option<(NodeId, usize)>, arity: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent,
            children: vec![None; arity],
        });
        self.total_nodes += 1;
        id
    }

    /// Plan the next traversal from the head of the frontier, returning
    /// the replay stack. `None` means the tree is fully explored.
    ///
    /// The stack pops back-to-front: the deepest entry is the choice to
    /// make at the first decision point, the front entry is the untaken
    /// branch to take at the target node.
    fn plan_traversal(&mut self) -> Option<Vec<usize>> {
        let (target, level) = self.frontier.remove_head()?;
        debug_assert!(self.max_saved_level.map_or(true, |max| level >= max));
        if self.max_saved_level.map_or(true, |max| level > max) {
            log::debug!("fully explored up to level {level}");
        }
        self.max_saved_level = Some(level);

        let untaken: Vec<usize> = self.nodes[target]
            .children
            .iter()
            .enumerate()
            .filter_map(|(slot, child)| child.is_none().then_some(slot))
            .collect();
        // The frontier never holds a node without an untaken branch.
        debug_assert!(!untaken.is_empty());
        if untaken.len() > 1 {
            log::trace!("re-queueing node {target} at level {level}");
            self.frontier.insert(target, level);
        }

        let mut saved = vec![untaken[0]];
        let mut node = target;
        while let Some((parent, slot)) = self.nodes[node].parent {
            if parent == ROOT {
                break;
            }
            saved.push(slot);
            node = parent;
        }
        log::debug!(
            "planned traversal to node {target} at level {level}, taking branch {}",
            untaken[0]
        );
        Some(saved)
    }
}

impl Default for BfsGuide {
    fn default() -> Self {
        Self::new()
    }
}

impl Guide for BfsGuide {
    type Chooser<'a> = BfsChooser<'a>
    where
        Self: 'a;

    fn make_chooser(&mut self) -> Option<Self::Chooser<'_>> {
        match self.state {
            State::Exhausted => None,
            State::Fresh => {
                log::debug!("bootstrap traversal");
                self.state = State::Idle;
                Some(BfsChooser::begin(self, Vec::new()))
            }
            State::Idle => match self.plan_traversal() {
                Some(saved) => Some(BfsChooser::begin(self, saved)),
                None => {
                    log::debug!(
                        "decision tree fully explored, {} nodes total",
                        self.total_nodes
                    );
                    self.state = State::Exhausted;
                    None
                }
            },
        }
    }
}

/// Chooser for one breadth-first traversal: replays the saved prefix,
/// then draws randomly past the frontier.
#[derive(Debug)]
pub struct BfsChooser<'a> {
    guide: &'a mut BfsGuide,
    current: NodeId,
    last_choice: usize,
    level: usize,
    /// Reverse order so the next replay choice pops off the back.
    saved_choices: Vec<usize>,
    /// Set once an API violation has been reported; the traversal no
    /// longer describes a path and is not finalized.
    defunct: bool,
}

impl<'a> BfsChooser<'a> {
    fn begin(guide: &'a mut BfsGuide, saved_choices: Vec<usize>) -> Self {
        log::debug!("traversal start, total nodes = {}", guide.total_nodes);
        BfsChooser {
            guide,
            current: ROOT,
            last_choice: 0,
            level: 0,
            saved_choices,
            defunct: false,
        }
    }

    fn choose_internal(
        &mut self,
        n: usize,
        random_choice: impl FnOnce(&mut ChaCha8Rng) -> usize,
    ) -> ChoiceResult<usize> {
        let result = self.choose_step(n, random_choice);
        if result.is_err() {
            self.defunct = true;
        }
        result
    }

    fn choose_step(
        &mut self,
        n: usize,
        random_choice: impl FnOnce(&mut ChaCha8Rng) -> usize,
    ) -> ChoiceResult<usize> {
        if n == 0 {
            return Err(ChoiceError::EmptyChoice);
        }
        let existing = self.guide.nodes[self.current].children[self.last_choice];
        let (next, choice) = match existing {
            Some(next) => {
                // Known node: the caller must present the same arity it
                // did on first visit.
                let expected = self.guide.nodes[next].children.len();
                if expected != n {
                    return Err(ChoiceError::ArityMismatch { expected, found: n });
                }
                let choice = self
                    .saved_choices
                    .pop()
                    .expect("replay prefix exhausted at a known node");
                log::trace!("replaying choice {choice} at level {}", self.level);
                (next, choice)
            }
            None => {
                // Off the frontier: materialize the decision point and
                // fall back to a random draw.
                debug_assert!(self.saved_choices.is_empty());
                let id = self
                    .guide
                    .alloc(Some((self.current, self.last_choice)), n);
                self.guide.nodes[self.current].children[self.last_choice] = Some(id);
                let choice = random_choice(&mut self.guide.rng);
                if n > 1 {
                    log::trace!(
                        "frontier insert: node {id} at level {} with {n} branches",
                        self.level
                    );
                    self.guide.frontier.insert(id, self.level);
                }
                (id, choice)
            }
        };
        self.current = next;
        self.last_choice = choice;
        self.level += 1;
        Ok(choice)
    }
}

impl Chooser for BfsChooser<'_> {
    fn choose(&mut self, n: usize) -> ChoiceResult<usize> {
        self.choose_internal(n, |rng| rng.gen_range(0..n))
    }

    fn choose_weighted(&mut self, weights: &[u64]) -> ChoiceResult<usize> {
        // Weights shape the first-visit draw only; the tree records
        // nothing but the arity.
        let dist = Discrete::from_counts(weights).map_err(|err| {
            self.defunct = true;
            err
        })?;
        self.choose_internal(weights.len(), move |rng| dist.sample(rng))
    }

    fn choose_unimportant(&mut self) -> u64 {
        self.guide.rng.gen()
    }
}

impl Drop for BfsChooser<'_> {
    fn drop(&mut self) {
        if self.defunct {
            return;
        }
        debug_assert!(
            self.saved_choices.is_empty(),
            "traversal ended before its replay prefix was consumed"
        );
        if self.guide.nodes[self.current].children[self.last_choice].is_none() {
            // Terminal marker so the path just taken counts as explored.
            let id = self
                .guide
                .alloc(Some((self.current, self.last_choice)), 0);
            self.guide.nodes[self.current].children[self.last_choice] = Some(id);
        }
        log::debug!("traversal end, total nodes = {}", self.guide.total_nodes);
    }
}
