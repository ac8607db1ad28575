//! Candidate graph schema model
//!
//! Defines the schema shapes produced by synthesis, the findings and results
//! produced by validation, and the read-only data-source seam used to check a
//! schema against a live database.

pub mod inspector;
pub mod types;

pub use inspector::{LabelCounts, Neo4jInspector, SchemaDataSource};
pub use types::{
    Finding, GraphSchema, NodeSchema, RelationshipSchema, Severity, Stage, SynthesisResult,
    ValidationResult,
};
