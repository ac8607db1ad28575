//! Retrieved neighbourhood subgraphs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String properties longer than this are left out of node text
pub const MAX_TEXT_PROPERTY_LEN: usize = 200;

/// Properties that never contribute to node text
const SKIPPED_KEYS: [&str; 2] = ["embedding", "vector"];

/// Properties placed first in node text, in this order
const PRIORITY_KEYS: [&str; 3] = ["name", "title", "description"];

/// A node of a retrieved subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Element id, unique within the subgraph
    pub id: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            id: id.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: Map::new(),
        }
    }

    /// Set a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Text used to embed this node
    ///
    /// Labels, then `name`, `title` and `description`, then every other
    /// short string property. Non-string properties are ignored.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();

        if !self.labels.is_empty() {
            parts.push(self.labels.join(" "));
        }

        for key in PRIORITY_KEYS {
            if let Some(Value::String(value)) = self.properties.get(key) {
                if !value.is_empty() {
                    parts.push(value.clone());
                }
            }
        }

        for (key, value) in &self.properties {
            if PRIORITY_KEYS.contains(&key.as_str()) || SKIPPED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Value::String(value) = value {
                let len = value.chars().count();
                if len > 0 && len <= MAX_TEXT_PROPERTY_LEN {
                    parts.push(value.clone());
                }
            }
        }

        parts.join(" ")
    }
}

/// A directed relationship of a retrieved subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Id of the start node
    pub start: String,
    /// Id of the end node
    pub end: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl GraphEdge {
    pub fn new(start: impl Into<String>, end: impl Into<String>, rel_type: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            rel_type: rel_type.into(),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Nodes and edges fetched around a query's anchor nodes
///
/// Edges may reference ids missing from `nodes`; consumers skip them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Subgraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Embedding text of every node, in node order
    pub fn node_texts(&self) -> Vec<String> {
        self.nodes.iter().map(GraphNode::text).collect()
    }

    /// Whether every edge connects two nodes of this subgraph
    pub fn is_closed(&self) -> bool {
        let ids: std::collections::HashSet<&str> =
            self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .all(|e| ids.contains(e.start.as_str()) && ids.contains(e.end.as_str()))
    }
}
