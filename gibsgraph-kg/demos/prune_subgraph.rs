//! Prunes a retrieved subgraph to its query-relevant core
//!
//! Embeddings here are toy two-dimensional vectors; the first axis means
//! "about payments" and the second "about everything else".

use gibsgraph_kg::{GraphEdge, GraphNode, PcstPruner, PrunerConfig, Subgraph};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut nodes = vec![GraphNode::new("bank", &["Bank"]).with_property("name", "Northwind Bank")];
    let mut embeddings = vec![vec![0.7, 0.7]];
    let mut edges = Vec::new();

    for i in 0..8 {
        let id = format!("payment-{}", i);
        nodes.push(
            GraphNode::new(&id, &["Payment"])
                .with_property("name", format!("Wire transfer {}", i))
                .with_property("amount", 1000 * (i + 1)),
        );
        embeddings.push(vec![0.95, 0.05]);
        edges.push(GraphEdge::new("bank", id, "PROCESSED"));
    }
    for i in 0..12 {
        let id = format!("branch-{}", i);
        nodes.push(GraphNode::new(&id, &["Branch"]).with_property("name", format!("Branch office {}", i)));
        embeddings.push(vec![0.1, 0.9]);
        edges.push(GraphEdge::new("bank", id, "OPERATES"));
    }
    // Retrieval can return edges to nodes outside the neighbourhood
    edges.push(GraphEdge::new("payment-0", "account-77", "DEBITED"));

    let subgraph = Subgraph::new(nodes, edges);
    let query = [1.0, 0.0];

    println!("1. Retrieved subgraph");
    println!("   {} nodes, {} edges\n", subgraph.nodes.len(), subgraph.edges.len());

    println!("2. Pruning with the compact preset...");
    let pruner = PcstPruner::new(PrunerConfig::compact());
    if !pruner.is_available() {
        println!("   No PCST solver compiled in; subgraph returned unchanged\n");
    }
    let pruned = pruner.prune(&subgraph, &embeddings, &query);
    println!(
        "   Kept {} nodes, {} edges\n",
        pruned.nodes.len(),
        pruned.edges.len()
    );

    println!("3. Context for the answer:");
    for text in pruned.node_texts() {
        println!("   - {}", text);
    }

    Ok(())
}
