//! Prize tiers and bet scoring.

pub mod engine;
pub mod tier;

pub use engine::{score, score_detailed, BetScore, TierTally};
pub use tier::PrizeTier;
