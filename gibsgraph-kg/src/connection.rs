//! Neo4j connection management
//!
//! Thin wrapper over a pooled `neo4rs::Graph`. The validation pipeline only
//! reads from the database, through [`Neo4jInspector`].

use crate::config::Neo4jSettings;
use crate::error::{KgError, Result};
use crate::schema::inspector::Neo4jInspector;
use neo4rs::{query, ConfigBuilder, Graph};
use tracing::{debug, info};

/// Neo4j client with connection pooling
pub struct Neo4jClient {
    graph: Graph,
    database: String,
}

impl Neo4jClient {
    /// Connect using explicit settings
    ///
    /// # Example
    /// ```no_run
    /// use gibsgraph_kg::{Neo4jClient, Neo4jSettings};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = Neo4jClient::connect(&Neo4jSettings::from_env()?).await?;
    ///     println!("healthy: {}", client.health_check().await?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(settings: &Neo4jSettings) -> Result<Self> {
        settings.validate()?;

        info!(
            "Connecting to Neo4j at {} (database: {})",
            settings.uri, settings.database
        );

        let config = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.username.as_str())
            .password(settings.password.as_str())
            .db(settings.database.as_str())
            .fetch_size(settings.fetch_size)
            .max_connections(settings.max_connections)
            .build()
            .map_err(|e| KgError::ConfigError(e.to_string()))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| KgError::ConnectionError(e.to_string()))?;

        info!("Successfully connected to Neo4j");

        Ok(Self {
            graph,
            database: settings.database.clone(),
        })
    }

    /// Simple health check using `RETURN 1`
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing simple health check (RETURN 1)");

        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| KgError::ConnectionError(e.to_string()))?;

        Ok(true)
    }

    /// Data source for the semantic validation stage
    pub fn inspector(&self) -> Neo4jInspector {
        Neo4jInspector::new(self.graph.clone())
    }

    /// Direct access to the underlying neo4rs graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}
