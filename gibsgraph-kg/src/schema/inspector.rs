//! Read-only data-source seam for the semantic validation stage
//!
//! The semantic stage only needs four result shapes from a live database.
//! [`SchemaDataSource`] names them; [`Neo4jInspector`] answers them with
//! Cypher, and tests answer them from memory.

use crate::error::{KgError, Result};
use neo4rs::{query, Graph};
use std::collections::BTreeSet;
use std::future::Future;
use tracing::debug;

/// Node counts for one label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    /// Nodes carrying the label
    pub total: u64,
    /// Nodes carrying the label that have no relationships at all
    pub orphans: u64,
}

impl LabelCounts {
    /// Fraction of nodes with no relationships (0.0 when there are no nodes)
    pub fn orphan_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.orphans as f64 / self.total as f64
        }
    }
}

/// Query capability required by the semantic validator
pub trait SchemaDataSource: Send + Sync {
    /// Every node label present in the database
    fn labels(&self) -> impl Future<Output = Result<BTreeSet<String>>> + Send;

    /// Every relationship type present in the database
    fn relationship_types(&self) -> impl Future<Output = Result<BTreeSet<String>>> + Send;

    /// Total and orphan node counts for a label
    fn label_counts(&self, label: &str) -> impl Future<Output = Result<LabelCounts>> + Send;

    /// Number of `label` nodes where `property` is null
    fn null_count(&self, label: &str, property: &str)
        -> impl Future<Output = Result<u64>> + Send;
}

/// Quote an identifier for interpolation into Cypher
///
/// Labels and property keys cannot be query parameters.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// [`SchemaDataSource`] backed by a Neo4j database
#[derive(Clone)]
pub struct Neo4jInspector {
    graph: Graph,
}

impl Neo4jInspector {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    async fn collect_strings(&self, cypher: &str, column: &str) -> Result<BTreeSet<String>> {
        let mut result = self
            .graph
            .execute(query(cypher))
            .await
            .map_err(|e| KgError::QueryError(format!("Failed to run '{}': {}", cypher, e)))?;

        let mut values = BTreeSet::new();
        // Stream failures surface as driver errors
        while let Some(row) = result.next().await? {
            let value: String = row.get(column).map_err(|e| {
                KgError::QueryError(format!("Failed to extract {}: {}", column, e))
            })?;
            values.insert(value);
        }

        Ok(values)
    }

    async fn single_count(&self, cypher: String, column: &str) -> Result<i64> {
        let mut result = self
            .graph
            .execute(query(&cypher))
            .await
            .map_err(|e| KgError::QueryError(format!("Failed to run count query: {}", e)))?;

        let row = result
            .next()
            .await?
            .ok_or_else(|| KgError::QueryError("Count query returned no rows".to_string()))?;

        row.get::<i64>(column)
            .map_err(|e| KgError::QueryError(format!("Failed to extract {}: {}", column, e)))
    }
}

impl SchemaDataSource for Neo4jInspector {
    async fn labels(&self) -> Result<BTreeSet<String>> {
        debug!("Fetching database labels");
        self.collect_strings("CALL db.labels() YIELD label RETURN label", "label")
            .await
    }

    async fn relationship_types(&self) -> Result<BTreeSet<String>> {
        debug!("Fetching database relationship types");
        self.collect_strings(
            "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType",
            "relationshipType",
        )
        .await
    }

    async fn label_counts(&self, label: &str) -> Result<LabelCounts> {
        let label = quote_identifier(label);
        let total = self
            .single_count(format!("MATCH (n:{label}) RETURN count(n) AS total"), "total")
            .await?;
        let orphans = self
            .single_count(
                format!("MATCH (n:{label}) WHERE NOT (n)--() RETURN count(n) AS orphans"),
                "orphans",
            )
            .await?;

        Ok(LabelCounts {
            total: total.max(0) as u64,
            orphans: orphans.max(0) as u64,
        })
    }

    async fn null_count(&self, label: &str, property: &str) -> Result<u64> {
        let cypher = format!(
            "MATCH (n:{}) WHERE n.{} IS NULL RETURN count(n) AS nulls",
            quote_identifier(label),
            quote_identifier(property)
        );
        let nulls = self.single_count(cypher, "nulls").await?;
        Ok(nulls.max(0) as u64)
    }
}
