//! Type definitions for candidate graph schemas and validation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A node type in a candidate graph schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    /// Label, unique within the schema
    pub label: String,
    /// Declared property names
    pub properties: Vec<String>,
    /// Properties every instance must carry (should be a subset of `properties`)
    pub required_properties: Vec<String>,
    /// Human-readable description of the node type
    pub description: String,
    /// Research finding or expert pattern that requires this node
    pub justified_by: String,
}

impl NodeSchema {
    /// Create a node with the given label and no properties
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            properties: Vec::new(),
            required_properties: Vec::new(),
            description: String::new(),
            justified_by: String::new(),
        }
    }

    /// Set declared properties
    pub fn with_properties(mut self, properties: &[&str]) -> Self {
        self.properties = properties.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set required properties
    pub fn with_required(mut self, required: &[&str]) -> Self {
        self.required_properties = required.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the justification
    pub fn justified_by(mut self, justification: impl Into<String>) -> Self {
        self.justified_by = justification.into();
        self
    }

    /// Required properties that are not declared in `properties`
    pub fn undeclared_required(&self) -> Vec<&str> {
        let declared: BTreeSet<&str> = self.properties.iter().map(String::as_str).collect();
        self.required_properties
            .iter()
            .map(String::as_str)
            .filter(|p| !declared.contains(p))
            .collect()
    }
}

/// A relationship type in a candidate graph schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSchema {
    /// Relationship type name
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Label of the start node (must exist in the schema)
    pub from_label: String,
    /// Label of the end node (must exist in the schema)
    pub to_label: String,
    /// Declared property names
    pub properties: Vec<String>,
    /// Human-readable description
    pub description: String,
    /// Why the relationship points the way it does
    pub direction_rationale: String,
    /// Research finding or expert pattern that requires this relationship
    pub justified_by: String,
}

impl RelationshipSchema {
    /// Create a relationship `(from)-[:rel_type]->(to)` with empty text fields
    pub fn new(
        rel_type: impl Into<String>,
        from_label: impl Into<String>,
        to_label: impl Into<String>,
    ) -> Self {
        Self {
            rel_type: rel_type.into(),
            from_label: from_label.into(),
            to_label: to_label.into(),
            properties: Vec::new(),
            description: String::new(),
            direction_rationale: String::new(),
            justified_by: String::new(),
        }
    }

    /// Set declared properties
    pub fn with_properties(mut self, properties: &[&str]) -> Self {
        self.properties = properties.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the direction rationale
    pub fn with_direction_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.direction_rationale = rationale.into();
        self
    }

    /// Set the justification
    pub fn justified_by(mut self, justification: impl Into<String>) -> Self {
        self.justified_by = justification.into();
        self
    }
}

/// A complete candidate property-graph schema
///
/// Produced once by schema synthesis and treated as immutable while it is
/// validated. Nothing here guarantees internal consistency; detecting
/// inconsistencies is the validator's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSchema {
    pub nodes: Vec<NodeSchema>,
    pub relationships: Vec<RelationshipSchema>,
    /// Constraint declarations, e.g. `CREATE CONSTRAINT ... FOR (a:Account) REQUIRE ...`
    pub constraints: Vec<String>,
    /// Index declarations
    pub indexes: Vec<String>,
    /// Literal statements applying constraints and indexes
    pub cypher_setup: String,
}

impl GraphSchema {
    /// Set of node labels declared by the schema
    pub fn node_labels(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    /// Set of relationship types declared by the schema
    pub fn relationship_types(&self) -> BTreeSet<&str> {
        self.relationships.iter().map(|r| r.rel_type.as_str()).collect()
    }
}

/// Severity of a validation finding
///
/// ERROR blocks approval unconditionally, WARNING degrades the score,
/// INFO is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Validation stage that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Syntactic,
    Structural,
    Semantic,
    Cypher,
    Socratic,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Syntactic => "SYNTACTIC",
            Stage::Structural => "STRUCTURAL",
            Stage::Semantic => "SEMANTIC",
            Stage::Cypher => "CYPHER",
            Stage::Socratic => "SOCRATIC",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single immutable validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    severity: Severity,
    stage: Stage,
    message: String,
}

impl Finding {
    pub fn new(severity: Severity, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            severity,
            stage,
            message: message.into(),
        }
    }

    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, stage, message)
    }

    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, stage, message)
    }

    pub fn info(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, stage, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.stage, self.message)
    }
}

/// Result of one run of the four-stage validation pipeline
///
/// Created once per run and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the syntactic gate passed
    pub syntactic: bool,
    pub structural_score: f64,
    pub semantic_score: f64,
    pub domain_score: f64,
    pub overall_score: f64,
    /// Findings of every stage, in stage order
    pub findings: Vec<Finding>,
    pub approved_for_training: bool,
}

impl ValidationResult {
    /// ERROR findings (block approval)
    pub fn errors(&self) -> Vec<&Finding> {
        self.with_severity(Severity::Error)
    }

    /// WARNING findings (degrade score)
    pub fn warnings(&self) -> Vec<&Finding> {
        self.with_severity(Severity::Warning)
    }

    /// INFO findings (advisory)
    pub fn infos(&self) -> Vec<&Finding> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == severity)
            .collect()
    }
}

/// Output of one LLM synthesizing a graph schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Model that produced the schema
    pub model: String,
    pub synthesized_at: DateTime<Utc>,
    pub scenario: String,
    pub design_rationale: String,
    pub graph_schema: GraphSchema,
    /// Regulations the synthesizing model claims the schema covers
    pub regulatory_requirements: Vec<String>,
    pub expert_patterns_used: Vec<String>,
    pub findings_used: Vec<String>,
}

impl SynthesisResult {
    /// Wrap a schema with empty provenance
    pub fn new(model: impl Into<String>, graph_schema: GraphSchema) -> Self {
        Self {
            model: model.into(),
            synthesized_at: Utc::now(),
            scenario: String::new(),
            design_rationale: String::new(),
            graph_schema,
            regulatory_requirements: Vec::new(),
            expert_patterns_used: Vec::new(),
            findings_used: Vec::new(),
        }
    }

    /// Set claimed regulatory requirements
    pub fn with_regulations(mut self, regulations: &[&str]) -> Self {
        self.regulatory_requirements = regulations.iter().map(|r| r.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_display_includes_severity_and_stage() {
        let finding = Finding::warning(Stage::Structural, "test message");
        let rendered = finding.to_string();
        assert_eq!(rendered, "[WARNING] STRUCTURAL: test message");
    }

    #[test]
    fn test_severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Error).unwrap();
        assert_eq!(json, "\"error\"");
        let stage = serde_json::to_string(&Stage::Semantic).unwrap();
        assert_eq!(stage, "\"SEMANTIC\"");
    }

    #[test]
    fn test_undeclared_required() {
        let node = NodeSchema::new("Account")
            .with_properties(&["id", "iban"])
            .with_required(&["id", "opened_at"]);
        assert_eq!(node.undeclared_required(), vec!["opened_at"]);
    }

    #[test]
    fn test_relationship_type_serializes_as_type() {
        let rel = RelationshipSchema::new("SENT", "Account", "Transaction");
        let value = serde_json::to_value(&rel).unwrap();
        assert_eq!(value["type"], "SENT");
    }

    #[test]
    fn test_severity_views_partition_findings() {
        let result = ValidationResult {
            syntactic: true,
            structural_score: 1.0,
            semantic_score: 0.0,
            domain_score: 1.0,
            overall_score: 0.65,
            findings: vec![
                Finding::error(Stage::Syntactic, "a"),
                Finding::warning(Stage::Structural, "b"),
                Finding::info(Stage::Semantic, "c"),
                Finding::info(Stage::Cypher, "d"),
            ],
            approved_for_training: false,
        };

        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.infos().len(), 2);
        assert_eq!(
            result.errors().len() + result.warnings().len() + result.infos().len(),
            result.findings.len()
        );
    }
}
