//! Schema quality scoring
//!
//! Deterministic scorers ([`structural`], [`cypher`]) are pure functions over a
//! [`GraphSchema`](crate::schema::GraphSchema). The [`socratic`] scorer asks an
//! external language model twelve yes/no questions, and [`quality`] folds all
//! five dimensions into one number.

pub mod cypher;
pub mod quality;
pub mod socratic;
pub mod structural;

pub use cypher::{score_cypher_quality, FORBIDDEN_KEYWORDS};
pub use quality::{QualityReport, QualityScorer, ScoreBreakdown};
pub use socratic::{LanguageModel, SocraticBreakdown, SocraticContext, SocraticScorer};
pub use structural::score_structural;

/// Round a score to 3 decimal places
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
