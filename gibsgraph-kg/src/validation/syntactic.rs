//! Syntactic gate: is the setup script safe and internally consistent?

use crate::schema::{Finding, GraphSchema, Stage};
use crate::scoring::cypher::forbidden_keywords;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Labels too generic to carry domain meaning
pub const GENERIC_LABELS: [&str; 10] = [
    "Entity", "Object", "Item", "Thing", "Node", "Data", "Record", "Element", "Resource", "Entry",
];

fn constraint_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)FOR\s*\(\w+:(\w+)\)").expect("valid regex"))
}

/// Run the syntactic gate
///
/// Returns `false` if and only if at least one ERROR finding was produced.
/// Generic labels are reported as warnings and never close the gate.
pub fn validate_syntactic(schema: &GraphSchema) -> (bool, Vec<Finding>) {
    let mut findings = Vec::new();

    if schema.cypher_setup.trim().is_empty() {
        findings.push(Finding::error(Stage::Syntactic, "Cypher setup script is empty"));
        return (false, findings);
    }

    for keyword in forbidden_keywords(&schema.cypher_setup) {
        findings.push(Finding::error(
            Stage::Syntactic,
            format!("Forbidden keyword '{}' in Cypher setup", keyword),
        ));
    }

    // Constraints without a FOR (x:Label) clause are not checked
    let labels = schema.node_labels();
    for constraint in &schema.constraints {
        if let Some(caps) = constraint_label_pattern().captures(constraint) {
            let label = &caps[1];
            if !labels.contains(label) {
                findings.push(Finding::error(
                    Stage::Syntactic,
                    format!("Constraint references unknown label '{}'", label),
                ));
            }
        }
    }

    for node in &schema.nodes {
        if GENERIC_LABELS.contains(&node.label.as_str()) {
            findings.push(Finding::warning(
                Stage::Syntactic,
                format!("Generic label '{}', use a domain-specific name", node.label),
            ));
        }
    }

    let ok = !findings.iter().any(Finding::is_error);
    debug!("Syntactic gate {}", if ok { "passed" } else { "failed" });
    (ok, findings)
}
