//! # GibsGraph Knowledge Graph (gibsgraph-kg)
//!
//! Quality gating for LLM-synthesized Neo4j schemas, and query-relevant
//! pruning of retrieved subgraphs.
//!
//! ## Features
//!
//! - Four-stage schema validation (syntactic gate, structural, semantic, cypher)
//! - Deterministic structural and Cypher scoring with severity-graded findings
//! - Optional Socratic LLM review folded into a five-dimension quality score
//! - Semantic checks against live data through a narrow, fakeable data source
//! - Prize-Collecting Steiner Tree pruning of retrieval subgraphs
//! - Injection guard for generated read queries
//!
//! ## Validating a Schema
//!
//! Without a data source the semantic stage is skipped and scored with
//! [`ValidatorConfig::unverified_semantic_score`].
//!
//! ```no_run
//! use gibsgraph_kg::{GraphSchema, SchemaValidator, ValidatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let schema: GraphSchema = serde_json::from_str(&std::fs::read_to_string("schema.json")?)?;
//!
//!     let validator = SchemaValidator::new(ValidatorConfig::default());
//!     let result = validator.validate(&schema).await;
//!
//!     println!("overall: {}", result.overall_score);
//!     for finding in &result.findings {
//!         println!("{}", finding);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Checking Against Stored Data
//!
//! ```no_run
//! use gibsgraph_kg::{GraphSchema, Neo4jClient, Neo4jSettings, SchemaValidator, ValidatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Neo4jClient::connect(&Neo4jSettings::from_env()?).await?;
//!     let validator = SchemaValidator::with_source(ValidatorConfig::default(), client.inspector());
//!
//!     let result = validator.validate(&GraphSchema::default()).await;
//!     println!("semantic: {}", result.semantic_score);
//!     Ok(())
//! }
//! ```
//!
//! ## Pruning a Subgraph
//!
//! ```no_run
//! use gibsgraph_kg::{PcstPruner, PrunerConfig, Subgraph};
//!
//! fn prune(subgraph: &Subgraph, embeddings: &[Vec<f64>], query: &[f64]) {
//!     let pruner = PcstPruner::new(PrunerConfig::compact());
//!     let pruned = pruner.prune(subgraph, embeddings, query);
//!     println!("kept {} of {} nodes", pruned.nodes.len(), subgraph.nodes.len());
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod retrieval;
pub mod schema;
pub mod scoring;
pub mod tools;
pub mod validation;

// Re-export main types for convenience
pub use config::{Neo4jSettings, PrunerConfig, PrunerConfigBuilder, QualityWeights, ValidatorConfig};
pub use connection::Neo4jClient;
pub use error::{KgError, Result};
pub use retrieval::{GraphEdge, GraphNode, PcstPruner, PcstSolver, PruningMode, Subgraph};
pub use schema::{
    Finding, GraphSchema, LabelCounts, Neo4jInspector, NodeSchema, RelationshipSchema,
    SchemaDataSource, Severity, Stage, SynthesisResult, ValidationResult,
};
pub use scoring::{
    score_cypher_quality, score_structural, LanguageModel, QualityReport, QualityScorer,
    SocraticContext,
};
pub use tools::CypherGuard;
pub use validation::{validate_semantic, validate_syntactic, SchemaValidator};
