//! Core clue & search-radius generation engine.
//!
//! Converts one user buzz action into a price on the progressive curve,
//! a clue drawn from week-tiered pools, and (optionally) the next
//! generation of the user's shrinking search area. All durable state
//! lives behind the [`BuzzStore`] seam.

pub mod area;
pub mod clues;
pub mod engine;
pub mod error;
pub mod pricing;
pub mod traits;

pub use clues::{pool_size, select_clue, SelectedClue, MISLEADING_PROBABILITY};
pub use engine::{AreaOutcome, BuzzEngine, BuzzOutcome, BuzzRequest};
pub use error::{EngineError, Result};
pub use pricing::{price_cents, DAILY_BUZZ_CEILING};
pub use traits::{BuzzStore, Notifier};
