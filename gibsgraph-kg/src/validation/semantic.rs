//! Semantic stage: does the schema match the data actually stored?

use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::schema::{Finding, GraphSchema, SchemaDataSource, Stage};
use crate::scoring::round3;
use tracing::{debug, warn};

/// Nodes of a label may be at most this orphaned
pub const MAX_ORPHAN_RATIO: f64 = 0.5;

/// Check a schema against a live data source
///
/// Without a data source the schema scores
/// [`ValidatorConfig::unverified_semantic_score`] with a single INFO finding.
/// A failing query aborts the stage with score 0.0 and one WARNING.
pub async fn validate_semantic<S: SchemaDataSource>(
    schema: &GraphSchema,
    source: Option<&S>,
    config: &ValidatorConfig,
) -> (f64, Vec<Finding>) {
    let Some(source) = source else {
        return (
            config.unverified_semantic_score,
            vec![Finding::info(
                Stage::Semantic,
                "No Neo4j data source, semantic validation skipped",
            )],
        );
    };

    match run_checks(schema, source).await {
        Ok((passed, total, findings)) => {
            let score = if total == 0 {
                0.0
            } else {
                round3(passed as f64 / total as f64)
            };
            debug!("Semantic score {} ({}/{} checks passed)", score, passed, total);
            (score, findings)
        }
        Err(e) => {
            warn!("Semantic validation aborted: {}", e);
            (
                0.0,
                vec![Finding::warning(
                    Stage::Semantic,
                    format!("Semantic query failed: {}", e),
                )],
            )
        }
    }
}

async fn run_checks<S: SchemaDataSource>(
    schema: &GraphSchema,
    source: &S,
) -> Result<(usize, usize, Vec<Finding>)> {
    let mut findings = Vec::new();
    let mut passed = 0usize;
    let mut total = 0usize;

    let db_labels = source.labels().await?;
    let db_rel_types = source.relationship_types().await?;

    let mut existing = Vec::new();
    for node in &schema.nodes {
        total += 1;
        if db_labels.contains(&node.label) {
            passed += 1;
            existing.push(node);
        } else {
            findings.push(Finding::warning(
                Stage::Semantic,
                format!("Label '{}' not found in database", node.label),
            ));
        }
    }

    for rel in &schema.relationships {
        total += 1;
        if db_rel_types.contains(&rel.rel_type) {
            passed += 1;
        } else {
            findings.push(Finding::warning(
                Stage::Semantic,
                format!("Relationship type '{}' not found in database", rel.rel_type),
            ));
        }
    }

    for node in &existing {
        total += 1;
        let counts = source.label_counts(&node.label).await?;
        if counts.total == 0 {
            findings.push(Finding::warning(
                Stage::Semantic,
                format!("Label '{}' has no instances", node.label),
            ));
        } else if counts.orphan_ratio() < MAX_ORPHAN_RATIO {
            passed += 1;
        } else {
            findings.push(Finding::warning(
                Stage::Semantic,
                format!(
                    "Label '{}' has orphan ratio {:.2} ({}/{} nodes without relationships)",
                    node.label,
                    counts.orphan_ratio(),
                    counts.orphans,
                    counts.total
                ),
            ));
        }
    }

    for node in &existing {
        for property in &node.required_properties {
            total += 1;
            let nulls = source.null_count(&node.label, property).await?;
            if nulls == 0 {
                passed += 1;
            } else {
                findings.push(Finding::warning(
                    Stage::Semantic,
                    format!(
                        "Required property '{}.{}' is null on {} nodes",
                        node.label, property, nulls
                    ),
                ));
            }
        }
    }

    Ok((passed, total, findings))
}
