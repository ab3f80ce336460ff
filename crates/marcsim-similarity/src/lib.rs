//! marcsim similarity: normalization, comparators, checkers and the weighted engine.

pub mod checkers;
pub mod compare;
pub mod engine;
pub mod error;
pub mod identifiers;
pub mod normalize;
pub mod strategy;

pub use checkers::{CheckOutcome, CheckerKind, Verdict};
pub use engine::{CheckResult, Comparison, SimilarityEngine};
pub use error::{Result, SimilarityError};
pub use normalize::{Pipeline, Step};
pub use strategy::{Strategy, StrategyEntry};
