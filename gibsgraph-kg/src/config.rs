//! Configuration for the Neo4j connection, the validation pipeline, and the pruner
//!
//! Every component receives its configuration by value at construction time.
//! There is no process-wide settings cache.

use crate::error::{KgError, Result};
use crate::retrieval::solver::PruningMode;
use serde::{Deserialize, Serialize};

/// URI schemes accepted by the Neo4j driver
const ALLOWED_SCHEMES: [&str; 4] = ["bolt://", "bolt+s://", "neo4j://", "neo4j+s://"];

/// Neo4j connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jSettings {
    pub uri: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
    /// Connection pool size
    pub max_connections: usize,
    /// Rows fetched per round-trip
    pub fetch_size: usize,
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 500,
        }
    }
}

impl Neo4jSettings {
    /// Load settings from the environment (and a `.env` file if present)
    ///
    /// Reads `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD` and `NEO4J_DATABASE`.
    /// The password has no default.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        let password = std::env::var("NEO4J_PASSWORD")
            .map_err(|_| KgError::ConfigError("NEO4J_PASSWORD is not set".to_string()))?;

        let settings = Self {
            uri: std::env::var("NEO4J_URI").unwrap_or(defaults.uri),
            username: std::env::var("NEO4J_USERNAME").unwrap_or(defaults.username),
            password,
            database: std::env::var("NEO4J_DATABASE").unwrap_or(defaults.database),
            ..defaults
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_SCHEMES.iter().any(|s| self.uri.starts_with(s)) {
            return Err(KgError::ConfigError(format!(
                "NEO4J_URI must start with one of {:?}",
                ALLOWED_SCHEMES
            )));
        }

        if self.max_connections == 0 {
            return Err(KgError::ConfigError(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Weights of the five quality dimensions used by the LLM-assisted score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub regulatory_coverage: f64,
    pub expert_alignment: f64,
    pub structural_validity: f64,
    pub completeness: f64,
    pub cypher_quality: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            regulatory_coverage: 0.25,
            expert_alignment: 0.25,
            structural_validity: 0.20,
            completeness: 0.20,
            cypher_quality: 0.10,
        }
    }
}

impl QualityWeights {
    pub fn total(&self) -> f64 {
        self.regulatory_coverage
            + self.expert_alignment
            + self.structural_validity
            + self.completeness
            + self.cypher_quality
    }

    fn as_array(&self) -> [f64; 5] {
        [
            self.regulatory_coverage,
            self.expert_alignment,
            self.structural_validity,
            self.completeness,
            self.cypher_quality,
        ]
    }
}

/// Configuration for the validation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Weight of the structural stage when the syntactic gate passes
    pub structural_weight: f64,
    /// Weight of the semantic stage when the syntactic gate passes
    pub semantic_weight: f64,
    /// Weight of the cypher (domain) stage when the syntactic gate passes
    pub cypher_weight: f64,
    /// Ceiling on the overall score when the syntactic gate fails
    pub gate_cap: f64,
    /// Minimum overall score for training approval
    pub approval_threshold: f64,
    /// Semantic score given to a schema that could not be checked against data
    pub unverified_semantic_score: f64,
    /// Weights of the LLM-assisted five-dimension score
    pub quality_weights: QualityWeights,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            structural_weight: 0.40,
            semantic_weight: 0.35,
            cypher_weight: 0.25,
            gate_cap: 0.3,
            approval_threshold: 0.70,
            // No benefit of the doubt for schemas never checked against data
            unverified_semantic_score: 0.0,
            quality_weights: QualityWeights::default(),
        }
    }
}

impl ValidatorConfig {
    /// Preset that scores unverified schemas as neutral (0.5) instead of 0.0
    pub fn lenient() -> Self {
        Self {
            unverified_semantic_score: 0.5,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        let unit = |v: f64| (0.0..=1.0).contains(&v);

        let stage_weights = [self.structural_weight, self.semantic_weight, self.cypher_weight];
        if !stage_weights.iter().all(|w| unit(*w)) {
            return Err("stage weights must be between 0.0 and 1.0".to_string());
        }

        if (stage_weights.iter().sum::<f64>() - 1.0).abs() > 1e-6 {
            return Err("stage weights must sum to 1.0".to_string());
        }

        if !unit(self.gate_cap) || !unit(self.approval_threshold) {
            return Err("gate_cap and approval_threshold must be between 0.0 and 1.0".to_string());
        }

        if !unit(self.unverified_semantic_score) {
            return Err("unverified_semantic_score must be between 0.0 and 1.0".to_string());
        }

        if !self.quality_weights.as_array().iter().all(|w| unit(*w)) {
            return Err("quality weights must be between 0.0 and 1.0".to_string());
        }

        if (self.quality_weights.total() - 1.0).abs() > 1e-6 {
            return Err("quality weights must sum to 1.0".to_string());
        }

        Ok(())
    }
}

/// Configuration for PCST subgraph pruning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrunerConfig {
    /// Target maximum number of nodes to keep
    pub max_nodes: usize,
    /// Uniform cost of every edge (higher = more aggressive pruning)
    pub edge_cost: f64,
    /// Added to the mean top-K prize to form the top-K boost multiplier
    pub boost_offset: f64,
    /// Pruning mode handed to the solver
    pub pruning: PruningMode,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            max_nodes: 20,
            edge_cost: 0.1,
            boost_offset: 1.0,
            pruning: PruningMode::Strong,
        }
    }
}

impl PrunerConfig {
    /// Create a new builder for pruner configuration
    pub fn builder() -> PrunerConfigBuilder {
        PrunerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_nodes == 0 {
            return Err("max_nodes must be greater than 0".to_string());
        }

        if !(self.edge_cost >= 0.0) {
            return Err("edge_cost must be non-negative".to_string());
        }

        if !(self.boost_offset >= 0.0) {
            return Err("boost_offset must be non-negative".to_string());
        }

        Ok(())
    }

    /// Small context window for chat answers
    pub fn compact() -> Self {
        Self {
            max_nodes: 10,
            edge_cost: 0.2,
            ..Default::default()
        }
    }

    /// Wide neighbourhoods for visualization
    pub fn wide() -> Self {
        Self {
            max_nodes: 50,
            edge_cost: 0.05,
            ..Default::default()
        }
    }
}

/// Builder for pruner configuration
#[derive(Debug, Default)]
pub struct PrunerConfigBuilder {
    max_nodes: Option<usize>,
    edge_cost: Option<f64>,
    boost_offset: Option<f64>,
    pruning: Option<PruningMode>,
}

impl PrunerConfigBuilder {
    /// Set the target maximum node count
    pub fn max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    /// Set the uniform edge cost
    pub fn edge_cost(mut self, cost: f64) -> Self {
        self.edge_cost = Some(cost);
        self
    }

    /// Set the top-K boost offset
    pub fn boost_offset(mut self, offset: f64) -> Self {
        self.boost_offset = Some(offset);
        self
    }

    /// Set the pruning mode
    pub fn pruning(mut self, mode: PruningMode) -> Self {
        self.pruning = Some(mode);
        self
    }

    /// Build the pruner configuration
    pub fn build(self) -> PrunerConfig {
        let defaults = PrunerConfig::default();

        PrunerConfig {
            max_nodes: self.max_nodes.unwrap_or(defaults.max_nodes),
            edge_cost: self.edge_cost.unwrap_or(defaults.edge_cost),
            boost_offset: self.boost_offset.unwrap_or(defaults.boost_offset),
            pruning: self.pruning.unwrap_or(defaults.pruning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validator_config() {
        let config = ValidatorConfig::default();
        assert_eq!(config.unverified_semantic_score, 0.0);
        assert_eq!(config.approval_threshold, 0.70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lenient_preset() {
        let config = ValidatorConfig::lenient();
        assert_eq!(config.unverified_semantic_score, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validator_config_validation() {
        let mut config = ValidatorConfig::default();
        config.structural_weight = 0.9;
        assert!(config.validate().is_err());

        let mut config = ValidatorConfig::default();
        config.gate_cap = 1.5;
        assert!(config.validate().is_err());

        let mut config = ValidatorConfig::default();
        config.quality_weights.cypher_quality = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quality_weights_sum_to_one() {
        assert!((QualityWeights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pruner_config_builder() {
        let config = PrunerConfig::builder()
            .max_nodes(5)
            .edge_cost(0.3)
            .pruning(PruningMode::Simple)
            .build();

        assert_eq!(config.max_nodes, 5);
        assert_eq!(config.edge_cost, 0.3);
        assert_eq!(config.boost_offset, 1.0);
        assert_eq!(config.pruning, PruningMode::Simple);
    }

    #[test]
    fn test_pruner_config_validation() {
        assert!(PrunerConfig::default().validate().is_ok());
        assert!(PrunerConfig::builder().max_nodes(0).build().validate().is_err());
        assert!(PrunerConfig::builder().edge_cost(-1.0).build().validate().is_err());
        assert!(PrunerConfig::builder().edge_cost(f64::NAN).build().validate().is_err());
    }

    #[test]
    fn test_pruner_presets() {
        assert_eq!(PrunerConfig::compact().max_nodes, 10);
        assert_eq!(PrunerConfig::wide().max_nodes, 50);
        assert_eq!(PrunerConfig::default().pruning, PruningMode::Strong);
    }

    #[test]
    fn test_settings_reject_http_scheme() {
        let settings = Neo4jSettings {
            uri: "http://localhost:7687".to_string(),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(KgError::ConfigError(_))));

        let settings = Neo4jSettings {
            uri: "neo4j+s://example.databases.neo4j.io".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }
}
