// Analyzer module: offer scoring, the comparison aggregate and recommendations.

pub mod comparison;
pub mod recommendation;
pub mod scoring;

// Re-export the main entry points for ease of use.
pub use comparison::{
    Comparison, ComparisonStats, FilterCriterion, SortCriterion, UnknownCriterion,
};
pub use recommendation::{Analysis, ReasonCode, Recommendation, analyze_all, analyze_offer, recommend};
