//! Analyzers beyond simple column aggregates.

mod compliance;
mod pattern_match;
mod quantile;
mod standard_deviation;

pub use compliance::Compliance;
pub use pattern_match::PatternMatch;
pub use quantile::Quantile;
pub use standard_deviation::StandardDeviation;
