//! Five-dimension quality score for a synthesized schema
//!
//! Two dimensions are deterministic (structural validity, cypher quality) and
//! three come from Socratic LLM review (regulatory coverage, expert alignment,
//! completeness).

use crate::config::QualityWeights;
use crate::schema::{Finding, GraphSchema, SynthesisResult};
use crate::scoring::cypher::score_cypher_quality;
use crate::scoring::round3;
use crate::scoring::socratic::{LanguageModel, SocraticBreakdown, SocraticContext, SocraticScorer};
use crate::scoring::structural::score_structural;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-dimension scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub regulatory_coverage: f64,
    pub expert_alignment: f64,
    pub structural_validity: f64,
    pub completeness: f64,
    pub cypher_quality: f64,
}

impl ScoreBreakdown {
    /// Combine deterministic scores with a Socratic breakdown
    pub fn new(structural: f64, cypher: f64, socratic: SocraticBreakdown) -> Self {
        Self {
            regulatory_coverage: socratic.regulatory_coverage,
            expert_alignment: socratic.expert_alignment,
            structural_validity: structural,
            completeness: socratic.completeness,
            cypher_quality: cypher,
        }
    }

    /// Weighted sum, rounded to 3 decimals
    pub fn weighted(&self, weights: &QualityWeights) -> f64 {
        round3(
            self.regulatory_coverage * weights.regulatory_coverage
                + self.expert_alignment * weights.expert_alignment
                + self.structural_validity * weights.structural_validity
                + self.completeness * weights.completeness
                + self.cypher_quality * weights.cypher_quality,
        )
    }
}

/// Outcome of scoring one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall: f64,
    pub breakdown: ScoreBreakdown,
    /// Structural findings followed by cypher findings
    pub findings: Vec<Finding>,
}

/// Scores synthesis results on five weighted dimensions
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    weights: QualityWeights,
}

impl QualityScorer {
    pub fn new(weights: QualityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &QualityWeights {
        &self.weights
    }

    /// Score all five dimensions, asking `llm` the Socratic questions
    ///
    /// An LLM failure scores the three Socratic dimensions as 0.0.
    pub fn score(
        &self,
        synthesis: &SynthesisResult,
        ctx: &SocraticContext,
        llm: &dyn LanguageModel,
    ) -> QualityReport {
        let socratic = SocraticScorer::new(llm).score(synthesis, ctx);
        self.combine(&synthesis.graph_schema, socratic)
    }

    /// Combine the deterministic dimensions with an already computed Socratic breakdown
    pub(crate) fn combine(&self, schema: &GraphSchema, socratic: SocraticBreakdown) -> QualityReport {
        let (structural, mut findings) = score_structural(schema);
        let (cypher, cypher_findings) = score_cypher_quality(&schema.cypher_setup);
        findings.extend(cypher_findings);

        let breakdown = ScoreBreakdown::new(structural, cypher, socratic);
        let overall = breakdown.weighted(&self.weights);

        info!("Quality score {} ({:?})", overall, breakdown);

        QualityReport {
            overall,
            breakdown,
            findings,
        }
    }

    /// Score only the deterministic dimensions, without any LLM call
    ///
    /// The overall value is re-normalised by the structural and cypher weights
    /// so that a perfect schema still scores 1.0. The Socratic dimensions of
    /// the breakdown are left at 0.0.
    pub fn score_deterministic(&self, schema: &GraphSchema) -> QualityReport {
        let (structural, mut findings) = score_structural(schema);
        let (cypher, cypher_findings) = score_cypher_quality(&schema.cypher_setup);
        findings.extend(cypher_findings);

        let total_weight = self.weights.structural_validity + self.weights.cypher_quality;
        let overall = if total_weight > 0.0 {
            round3(
                (structural * self.weights.structural_validity
                    + cypher * self.weights.cypher_quality)
                    / total_weight,
            )
        } else {
            0.0
        };

        QualityReport {
            overall,
            breakdown: ScoreBreakdown::new(structural, cypher, SocraticBreakdown::zero()),
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KgError, Result};

    fn schema_with_cypher(cypher: &str) -> GraphSchema {
        GraphSchema {
            cypher_setup: cypher.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_weighted_uses_all_five_dimensions() {
        let breakdown = ScoreBreakdown {
            regulatory_coverage: 1.0,
            expert_alignment: 0.5,
            structural_validity: 1.0,
            completeness: 0.0,
            cypher_quality: 1.0,
        };
        // 0.25 + 0.125 + 0.20 + 0.0 + 0.10
        assert_eq!(breakdown.weighted(&QualityWeights::default()), 0.675);
    }

    #[test]
    fn test_deterministic_renormalises() {
        let scorer = QualityScorer::default();
        let report = scorer.score_deterministic(&schema_with_cypher(
            "CREATE CONSTRAINT x FOR (a:A) REQUIRE a.id IS UNIQUE; CREATE INDEX y FOR (a:A) ON (a.n)",
        ));
        assert_eq!(report.breakdown.cypher_quality, 1.0);
        let expected = round3(
            (report.breakdown.structural_validity * 0.20 + 0.10) / 0.30,
        );
        assert_eq!(report.overall, expected);
        assert_eq!(report.breakdown.regulatory_coverage, 0.0);
    }

    #[test]
    fn test_llm_failure_zeroes_socratic_dimensions() {
        let llm = |_: &str| -> Result<String> { Err(KgError::LlmError("offline".to_string())) };
        let synthesis = SynthesisResult::new("m", schema_with_cypher("CREATE INDEX y FOR (a:A) ON (a.n)"));
        let report = QualityScorer::default().score(&synthesis, &SocraticContext::default(), &llm);

        assert_eq!(report.breakdown.regulatory_coverage, 0.0);
        assert_eq!(report.breakdown.expert_alignment, 0.0);
        assert_eq!(report.breakdown.completeness, 0.0);
        assert_eq!(report.breakdown.cypher_quality, 0.5);
        assert!(report.overall <= 0.30);
    }
}
