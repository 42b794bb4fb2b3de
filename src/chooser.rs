//! The generator-facing choice contract shared by every guide.
//!
//! A generator is ordinary imperative code that, at each decision point,
//! asks its [`Chooser`] for a small integer in `[0, n)`. A [`Guide`] hands
//! out one chooser per traversal and decides, across traversals, how those
//! integers are picked: independently at random, by replaying saved paths
//! through a decision tree, or by reweighted sampling.
//!
//! Core concepts:
//! - One chooser per traversal: a chooser mutably borrows its guide for
//!   its whole lifetime, so a second live chooser is a compile error.
//! - Disposal is finalization: dropping a chooser commits the traversal
//!   to the guide's tree, even when the generator stopped early.
//! - Exhaustion is not an error: a guide with nothing left to explore
//!   returns `None` from [`Guide::make_chooser`].

use thiserror::Error;

/// Result alias for fallible chooser operations.
pub type ChoiceResult<T> = Result<T, ChoiceError>;

/// Caller API violations reported by choosers.
///
/// These are fatal for the traversal that raised them: the choices made
/// so far no longer describe a path the guide can reason about, and the
/// driver is expected to stop rather than recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChoiceError {
    /// `choose` was asked to pick from an empty range.
    #[error("choose requires at least one alternative")]
    EmptyChoice,

    /// A decision point was revisited with a different number of
    /// alternatives than it was first seen with.
    #[error("decision point revisited with {found} alternatives, expected {expected}")]
    ArityMismatch {
        /// Arity recorded when the decision point was first reached.
        expected: usize,
        /// Arity presented by the current call.
        found: usize,
    },

    /// A weighted choice whose weights sum to zero.
    #[error("weighted choice requires at least one positive weight")]
    DegenerateWeights,
}

/// Per-traversal choice interface handed to a generator.
pub trait Chooser {
    /// Return a value in `[0, n)`. This is the primary decision point and
    /// the one the guide optimizes over; it may grow the guide's tree.
    fn choose(&mut self, n: usize) -> ChoiceResult<usize>;

    /// Binary choice; `choose(2)` read as a boolean.
    fn flip(&mut self) -> ChoiceResult<bool> {
        Ok(self.choose(2)? != 0)
    }

    /// Pick an index in `[0, weights.len())` with probability proportional
    /// to `weights`. Grows the tree like [`Chooser::choose`].
    fn choose_weighted(&mut self, weights: &[u64]) -> ChoiceResult<usize>;

    /// Full-width pseudo-random value that is never recorded in the
    /// decision tree.
    ///
    /// Contract: the returned value must not influence any subsequent
    /// `choose` call made by the generator. Use it for literal constants,
    /// identifier names, and other payload that does not steer control
    /// flow.
    fn choose_unimportant(&mut self) -> u64;
}

/// Strategy object that decides how choices are made across traversals
/// and owns whatever decision tree that takes.
pub trait Guide {
    /// Chooser type handed out for a single traversal; it borrows the
    /// guide until the traversal ends.
    type Chooser<'a>: Chooser
    where
        Self: 'a;

    /// Start a traversal.
    ///
    /// `None` means the decision space is exhausted; drivers stop on it.
    /// Guides that never exhaust always return `Some`.
    fn make_chooser(&mut self) -> Option<Self::Chooser<'_>>;
}
