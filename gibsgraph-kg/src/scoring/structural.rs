//! Deterministic structural scoring of a candidate schema
//!
//! A fixed battery of independent boolean checks, each worth the same.
//! Every "all X have Y" check is false over an empty collection so that an
//! empty schema scores near zero.

use crate::schema::{Finding, GraphSchema, Severity, Stage};
use crate::scoring::round3;
use std::collections::BTreeSet;
use tracing::debug;

/// Justifications must be longer than this to count as substantive
pub const MIN_JUSTIFICATION_LEN: usize = 20;

/// Severity reported when a structural check fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    /// Quality defect
    Quality,
    /// Internal inconsistency
    Consistency,
    /// Advisory
    Advisory,
}

impl CheckKind {
    fn severity(self) -> Severity {
        match self {
            CheckKind::Quality => Severity::Warning,
            CheckKind::Consistency => Severity::Error,
            CheckKind::Advisory => Severity::Info,
        }
    }
}

struct Check {
    name: &'static str,
    kind: CheckKind,
    passed: bool,
}

impl Check {
    fn new(name: &'static str, kind: CheckKind, passed: bool) -> Self {
        Self { name, kind, passed }
    }
}

/// Score the structure of a schema
///
/// Returns the fraction of passing checks (rounded to 3 decimals) and the
/// findings explaining every failure.
pub fn score_structural(schema: &GraphSchema) -> (f64, Vec<Finding>) {
    let nodes = &schema.nodes;
    let rels = &schema.relationships;
    let mut findings = Vec::new();
    let mut checks = Vec::with_capacity(12);

    // Minimum counts
    checks.push(Check::new("Has at least 3 node types", CheckKind::Quality, nodes.len() >= 3));
    checks.push(Check::new(
        "Has at least 2 relationship types",
        CheckKind::Quality,
        rels.len() >= 2,
    ));
    checks.push(Check::new(
        "Has at least 1 constraint",
        CheckKind::Quality,
        !schema.constraints.is_empty(),
    ));
    checks.push(Check::new(
        "Has at least 1 index",
        CheckKind::Quality,
        !schema.indexes.is_empty(),
    ));

    // Field presence, never vacuously true
    checks.push(Check::new(
        "All relationships have direction rationale",
        CheckKind::Quality,
        non_empty_all(rels, |r| has_text(&r.direction_rationale)),
    ));
    checks.push(Check::new(
        "All nodes have required properties",
        CheckKind::Quality,
        non_empty_all(nodes, |n| !n.required_properties.is_empty()),
    ));
    checks.push(Check::new(
        "All nodes justified by research/pattern",
        CheckKind::Quality,
        non_empty_all(nodes, |n| has_text(&n.justified_by)),
    ));
    checks.push(Check::new(
        "All relationships justified by research/pattern",
        CheckKind::Quality,
        non_empty_all(rels, |r| has_text(&r.justified_by)),
    ));

    // Only scored when there is something to justify
    if !nodes.is_empty() || !rels.is_empty() {
        let substantive = |text: &str| text.trim().chars().count() > MIN_JUSTIFICATION_LEN;
        checks.push(Check::new(
            "Justifications are substantive (>20 chars)",
            CheckKind::Advisory,
            nodes.iter().all(|n| substantive(&n.justified_by))
                && rels.iter().all(|r| substantive(&r.justified_by)),
        ));
    }

    // Consistency: required properties must be declared
    for node in nodes {
        let undeclared = node.undeclared_required();
        if !undeclared.is_empty() {
            findings.push(Finding::error(
                Stage::Structural,
                format!(
                    "Node '{}' requires undeclared properties {:?}",
                    node.label, undeclared
                ),
            ));
        }
    }
    checks.push(Check::new(
        "Required properties are subset of properties",
        CheckKind::Consistency,
        non_empty_all(nodes, |n| n.undeclared_required().is_empty()),
    ));

    // Consistency: relationship endpoints must reference declared labels
    let labels = schema.node_labels();
    let mut dangling = 0usize;
    for rel in rels {
        for (side, label) in [("from_label", &rel.from_label), ("to_label", &rel.to_label)] {
            if !labels.contains(label.as_str()) {
                dangling += 1;
                findings.push(Finding::error(
                    Stage::Structural,
                    format!("Dangling endpoint {}: {} '{}'", rel.rel_type, side, label),
                ));
            }
        }
    }
    checks.push(Check::new(
        "Relationship endpoints reference existing nodes",
        CheckKind::Consistency,
        dangling == 0,
    ));

    // Connectivity: taxonomy and lookup nodes may legitimately stand alone
    let connected: BTreeSet<&str> = rels
        .iter()
        .flat_map(|r| [r.from_label.as_str(), r.to_label.as_str()])
        .collect();
    let disconnected: Vec<&str> = labels.difference(&connected).copied().collect();
    let tolerated = (nodes.len() / 5).max(1);
    if !disconnected.is_empty() {
        findings.push(Finding::info(
            Stage::Structural,
            format!(
                "{} node types have no relationships: {:?}",
                disconnected.len(),
                disconnected
            ),
        ));
    }
    checks.push(Check::new(
        "Most nodes participate in relationships",
        CheckKind::Advisory,
        disconnected.len() <= tolerated,
    ));

    for check in checks.iter().filter(|c| !c.passed) {
        findings.push(Finding::new(
            check.kind.severity(),
            Stage::Structural,
            format!("{}: FAILED", check.name),
        ));
    }

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = round3(passed as f64 / checks.len() as f64);

    debug!(
        "Structural score {} ({}/{} checks passed)",
        score,
        passed,
        checks.len()
    );

    (score, findings)
}

fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

fn non_empty_all<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> bool {
    !items.is_empty() && items.iter().all(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeSchema, RelationshipSchema};

    fn node(label: &str) -> NodeSchema {
        NodeSchema::new(label)
            .with_properties(&["id", "name"])
            .with_required(&["id"])
            .with_description(format!("{} entity", label))
            .justified_by("Required by the primary compliance query pattern")
    }

    fn rel(rel_type: &str, from: &str, to: &str) -> RelationshipSchema {
        RelationshipSchema::new(rel_type, from, to)
            .with_direction_rationale("Actor points at the acted-upon entity")
            .justified_by("Fraud rings require sender to receiver paths")
    }

    fn good_schema() -> GraphSchema {
        GraphSchema {
            nodes: vec![node("Account"), node("Transaction"), node("Merchant")],
            relationships: vec![
                rel("SENT", "Account", "Transaction"),
                rel("RECEIVED_BY", "Transaction", "Merchant"),
            ],
            constraints: vec![
                "CREATE CONSTRAINT account_id FOR (a:Account) REQUIRE a.id IS UNIQUE".to_string(),
            ],
            indexes: vec!["CREATE INDEX tx_id FOR (t:Transaction) ON (t.id)".to_string()],
            cypher_setup: "CREATE CONSTRAINT account_id FOR (a:Account) REQUIRE a.id IS UNIQUE;\n\
                           CREATE INDEX tx_id FOR (t:Transaction) ON (t.id);"
                .to_string(),
        }
    }

    fn messages(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.message()).collect()
    }

    #[test]
    fn test_good_schema_scores_one() {
        let (score, findings) = score_structural(&good_schema());
        assert_eq!(score, 1.0);
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_empty_schema_scores_low() {
        let (score, findings) = score_structural(&GraphSchema::default());
        // Only endpoint integrity and connectivity pass, out of 11 checks
        assert_eq!(score, round3(2.0 / 11.0));
        assert!(score < 0.5);
        assert!(findings.len() >= 3);
    }

    #[test]
    fn test_empty_relationships_do_not_pass_direction_check() {
        let mut schema = good_schema();
        schema.relationships.clear();
        let (_, findings) = score_structural(&schema);
        assert!(messages(&findings)
            .iter()
            .any(|m| m.contains("direction rationale: FAILED")));
        assert!(messages(&findings)
            .iter()
            .any(|m| m.contains("All relationships justified")));
    }

    #[test]
    fn test_missing_direction_rationale_is_warning() {
        let mut schema = good_schema();
        schema.relationships[0].direction_rationale = String::new();
        let (score, findings) = score_structural(&schema);
        assert!(score < 1.0);
        let finding = findings
            .iter()
            .find(|f| f.message().contains("direction"))
            .unwrap();
        assert_eq!(finding.severity(), Severity::Warning);
    }

    #[test]
    fn test_two_nodes_is_not_enough() {
        let mut schema = good_schema();
        schema.nodes.pop();
        schema.relationships.pop();
        let (score, findings) = score_structural(&schema);
        assert!(score < 1.0);
        assert!(messages(&findings).iter().any(|m| m.contains("3 node")));
        assert!(messages(&findings).iter().any(|m| m.contains("2 relationship")));
    }

    #[test]
    fn test_dangling_endpoints_each_reported_as_error() {
        let mut schema = good_schema();
        schema.relationships.push(rel("OWNS", "Customer", "Ghost"));
        let (_, findings) = score_structural(&schema);

        let dangling: Vec<_> = findings
            .iter()
            .filter(|f| f.message().starts_with("Dangling endpoint"))
            .collect();
        assert_eq!(dangling.len(), 2);
        assert!(dangling.iter().all(|f| f.severity() == Severity::Error));
        assert!(dangling[0].message().contains("Customer"));
        assert!(dangling[1].message().contains("Ghost"));
        assert!(findings.iter().any(|f| f.severity() == Severity::Error
            && f.message() == "Relationship endpoints reference existing nodes: FAILED"));
    }

    #[test]
    fn test_finding_messages_are_ascii() {
        let mut schema = good_schema();
        schema.relationships.push(rel("OWNS", "Customer", "Ghost"));
        schema.nodes[0].justified_by = String::new();
        let (_, findings) = score_structural(&schema);
        assert!(!findings.is_empty());
        assert!(
            findings.iter().all(|f| f.message().is_ascii()),
            "non-ASCII message in {:?}",
            findings
        );
        assert!(messages(&findings).contains(&"Dangling endpoint OWNS: from_label 'Customer'"));
    }

    #[test]
    fn test_required_not_subset_is_error() {
        let mut schema = good_schema();
        schema.nodes[1].required_properties.push("amount".to_string());
        let (score, findings) = score_structural(&schema);
        assert!(score < 1.0);
        let errors: Vec<_> = findings.iter().filter(|f| f.is_error()).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message().contains("Transaction"));
        assert!(errors[0].message().contains("amount"));
    }

    #[test]
    fn test_short_justification_is_info() {
        let mut schema = good_schema();
        schema.nodes[0].justified_by = "needed".to_string();
        let (score, findings) = score_structural(&schema);
        assert!(score < 1.0);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity(), Severity::Info);
        assert!(findings[0].message().contains("substantive"));
    }

    #[test]
    fn test_one_disconnected_node_tolerated() {
        let mut schema = good_schema();
        schema.nodes.push(node("Country"));
        let (score, findings) = score_structural(&schema);
        // Listed as INFO, but the connectivity check still passes
        assert_eq!(score, 1.0);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity(), Severity::Info);
        assert!(findings[0].message().contains("Country"));
    }

    #[test]
    fn test_many_disconnected_nodes_fail_connectivity_as_info() {
        let mut schema = good_schema();
        schema.nodes.push(node("Country"));
        schema.nodes.push(node("Currency"));
        let (score, findings) = score_structural(&schema);
        assert!(score < 1.0);
        assert!(findings.iter().all(|f| f.severity() == Severity::Info));
        assert!(messages(&findings)
            .iter()
            .any(|m| m.contains("Most nodes participate in relationships: FAILED")));
    }
}
