//! Guided random choice for structured random generators.
//!
//! A generator is ordinary imperative code that asks a [`Chooser`] for a
//! small integer at each decision point. The guide behind the chooser
//! decides how those integers are picked across repeated runs, turning
//! one generator into a uniform sampler, an exhaustive breadth-first
//! enumerator, or a sampler that approaches uniformity over the leaves
//! of the implicit decision tree.
//!
//! Three guides share the [`Guide`]/[`Chooser`] contract:
//!
//! - [`DefaultGuide`] resolves every call with an independent PRNG draw
//!   and keeps no tree.
//! - [`BfsGuide`] grows a decision tree across traversals, replays saved
//!   prefixes down to a frontier of untaken branches, and signals
//!   exhaustion once every branch has been taken.
//! - [`WeightedSamplerGuide`] annotates its tree with per-subtree size
//!   estimates and reweights child selection toward leaf-uniform
//!   sampling.
//!
//! A driver asks its guide for one chooser per run and stops when
//! `make_chooser` returns `None`:
//!
//! ```
//! use choice_guide::{BfsGuide, Chooser, Guide};
//!
//! let mut guide = BfsGuide::with_seed(1);
//! let mut outcomes = Vec::new();
//! while let Some(mut chooser) = guide.make_chooser() {
//!     let mut value = 0;
//!     for _ in 0..3 {
//!         value = (value << 1) | chooser.choose(2)?;
//!     }
//!     outcomes.push(value);
//! }
//! assert_eq!(outcomes.len(), 8); // every 3-bit path, visited once
//! # Ok::<(), choice_guide::ChoiceError>(())
//! ```
//!
//! All randomness flows through one seedable ChaCha8 generator per
//! guide, so a fixed seed reproduces the full sequence of traversals
//! bit for bit. Queue activity, replay decisions, and level progression
//! are traced through the `log` facade at debug and trace level.

pub mod bfs;
pub mod chooser;
pub mod default;
pub mod distributions;
pub mod frontier;
pub mod sampler;

pub use bfs::{BfsChooser, BfsGuide, BfsStats};
pub use chooser::{ChoiceError, ChoiceResult, Chooser, Guide};
pub use default::{DefaultChooser, DefaultGuide};
pub use distributions::Discrete;
pub use frontier::Frontier;
pub use sampler::{SamplerStats, WeightedSamplerChooser, WeightedSamplerGuide};
