//! Four-stage schema validation pipeline
//!
//! 1. SYNTACTIC: is the setup script safe? (gate)
//! 2. STRUCTURAL: are the required elements present and consistent?
//! 3. SEMANTIC: does the schema match the stored data?
//! 4. CYPHER: does the setup script declare constraints and indexes?
//!
//! Stages never fail on schema defects; they report findings instead.

use crate::config::ValidatorConfig;
use crate::schema::{
    Finding, GraphSchema, Neo4jInspector, SchemaDataSource, Stage, SynthesisResult,
    ValidationResult,
};
use crate::scoring::cypher::score_cypher_quality;
use crate::scoring::quality::QualityScorer;
use crate::scoring::round3;
use crate::scoring::socratic::{LanguageModel, SocraticContext, SocraticScorer};
use crate::scoring::structural::score_structural;
use crate::validation::semantic::validate_semantic;
use crate::validation::syntactic::validate_syntactic;
use tracing::{info, warn};

/// Validates candidate graph schemas
///
/// # Example
/// ```no_run
/// use gibsgraph_kg::{GraphSchema, SchemaValidator, ValidatorConfig};
///
/// # async fn run(schema: GraphSchema) {
/// let validator = SchemaValidator::new(ValidatorConfig::default());
/// let result = validator.validate(&schema).await;
/// println!("{} approved={}", result.overall_score, result.approved_for_training);
/// # }
/// ```
pub struct SchemaValidator<S: SchemaDataSource = Neo4jInspector> {
    config: ValidatorConfig,
    source: Option<S>,
}

impl SchemaValidator {
    /// Validator with no data source; the semantic stage is skipped
    pub fn new(config: ValidatorConfig) -> Self {
        Self::build(config, None)
    }
}

impl<S: SchemaDataSource> SchemaValidator<S> {
    /// Validator that checks schemas against `source`
    pub fn with_source(config: ValidatorConfig, source: S) -> Self {
        Self::build(config, Some(source))
    }

    fn build(config: ValidatorConfig, source: Option<S>) -> Self {
        if let Err(e) = config.validate() {
            warn!("Invalid validator configuration: {}", e);
        }
        Self { config, source }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run all four stages
    pub async fn validate(&self, schema: &GraphSchema) -> ValidationResult {
        let mut findings = Vec::new();

        let (syntactic, syntactic_findings) = validate_syntactic(schema);
        findings.extend(syntactic_findings);

        let (structural, structural_findings) = score_structural(schema);
        findings.extend(structural_findings);

        let (semantic, semantic_findings) =
            validate_semantic(schema, self.source.as_ref(), &self.config).await;
        findings.extend(semantic_findings);

        let (cypher, cypher_findings) = score_cypher_quality(&schema.cypher_setup);
        findings.extend(cypher_findings);

        let overall = self.compute_overall(syntactic, structural, semantic, cypher);
        let approved = self.approve(overall, &findings);

        info!(
            "Validation complete: overall={} syntactic={} structural={} semantic={} cypher={} approved={}",
            overall, syntactic, structural, semantic, cypher, approved
        );

        ValidationResult {
            syntactic,
            structural_score: structural,
            semantic_score: semantic,
            domain_score: cypher,
            overall_score: overall,
            findings,
            approved_for_training: approved,
        }
    }

    /// Run all four stages plus Socratic review by `llm`
    ///
    /// The overall score becomes the five-dimension quality score, still
    /// capped at `gate_cap` when the syntactic gate failed, and
    /// `domain_score` the regulatory coverage. Without a model this is
    /// exactly [`validate`](Self::validate).
    pub async fn validate_full(
        &self,
        synthesis: &SynthesisResult,
        ctx: &SocraticContext,
        llm: Option<&dyn LanguageModel>,
    ) -> ValidationResult {
        let base = self.validate(&synthesis.graph_schema).await;
        let Some(llm) = llm else {
            return base;
        };

        let (socratic, socratic_finding) = match SocraticScorer::new(llm).try_score(synthesis, ctx) {
            Ok(breakdown) => {
                let summary = format!(
                    "Socratic review: regulatory_coverage={} expert_alignment={} completeness={}",
                    breakdown.regulatory_coverage, breakdown.expert_alignment, breakdown.completeness
                );
                (breakdown, Finding::info(Stage::Socratic, summary))
            }
            Err(e) => {
                warn!("Socratic review failed: {}", e);
                (
                    Default::default(),
                    Finding::warning(Stage::Socratic, format!("Socratic review failed: {}", e)),
                )
            }
        };

        let report = QualityScorer::new(self.config.quality_weights)
            .combine(&synthesis.graph_schema, socratic);
        // A failed gate caps the folded score exactly as in compute_overall
        let overall = if base.syntactic {
            report.overall
        } else {
            self.config.gate_cap.min(report.overall)
        }
        .clamp(0.0, 1.0);

        let mut findings = base.findings;
        findings.push(socratic_finding);
        let approved = self.approve(overall, &findings);

        info!(
            "Full validation complete: overall={} approved={}",
            overall, approved
        );

        ValidationResult {
            syntactic: base.syntactic,
            structural_score: base.structural_score,
            semantic_score: base.semantic_score,
            domain_score: report.breakdown.regulatory_coverage,
            overall_score: overall,
            findings,
            approved_for_training: approved,
        }
    }

    /// Combine stage scores
    ///
    /// A failed syntactic gate caps the overall score at `gate_cap`;
    /// otherwise the stages are weighted.
    pub fn compute_overall(&self, syntactic: bool, structural: f64, semantic: f64, cypher: f64) -> f64 {
        let c = &self.config;
        let overall = if syntactic {
            round3(
                structural * c.structural_weight
                    + semantic * c.semantic_weight
                    + cypher * c.cypher_weight,
            )
        } else {
            round3(c.gate_cap.min((structural + semantic + cypher) / 3.0))
        };
        overall.clamp(0.0, 1.0)
    }

    fn approve(&self, overall: f64, findings: &[Finding]) -> bool {
        overall >= self.config.approval_threshold && !findings.iter().any(Finding::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SchemaValidator {
        SchemaValidator::new(ValidatorConfig::default())
    }

    #[test]
    fn test_compute_overall_weighted() {
        assert_eq!(validator().compute_overall(true, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(validator().compute_overall(true, 1.0, 0.0, 1.0), 0.65);
    }

    #[test]
    fn test_compute_overall_gate_cap() {
        assert_eq!(validator().compute_overall(false, 1.0, 1.0, 1.0), 0.3);
        assert_eq!(validator().compute_overall(false, 0.3, 0.0, 0.0), 0.1);
    }

    #[test]
    fn test_invalid_config_is_kept() {
        let config = ValidatorConfig {
            structural_weight: 0.9,
            ..Default::default()
        };
        let v = SchemaValidator::new(config);
        assert!(v.config().validate().is_err());
        assert_eq!(v.config().structural_weight, 0.9);
    }

    #[test]
    fn test_approval_needs_score_and_no_errors() {
        let v = validator();
        assert!(v.approve(0.7, &[Finding::warning(Stage::Structural, "w")]));
        assert!(!v.approve(0.69, &[]));
        assert!(!v.approve(1.0, &[Finding::error(Stage::Structural, "e")]));
    }
}
