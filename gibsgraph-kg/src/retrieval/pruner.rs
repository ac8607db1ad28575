//! PCST subgraph pruning
//!
//! Keeps the most query-relevant connected part of a retrieved neighbourhood.
//! Pruning never fails: every problem degrades to returning the input.

use crate::config::PrunerConfig;
use crate::retrieval::prizes::compute_node_prizes;
use crate::retrieval::solver::{PcstInstance, PcstSolver};
use crate::retrieval::subgraph::Subgraph;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "pcst")]
use crate::retrieval::solver::GoemansWilliamson;

/// Prunes subgraphs with a prize-collecting Steiner tree
#[derive(Clone)]
pub struct PcstPruner {
    config: PrunerConfig,
    solver: Option<Arc<dyn PcstSolver>>,
}

impl PcstPruner {
    /// Pruner using the built-in solver
    ///
    /// Without the `pcst` feature there is no solver and pruning is a no-op.
    pub fn new(config: PrunerConfig) -> Self {
        #[cfg(feature = "pcst")]
        let solver: Option<Arc<dyn PcstSolver>> = Some(Arc::new(GoemansWilliamson));
        #[cfg(not(feature = "pcst"))]
        let solver: Option<Arc<dyn PcstSolver>> = None;

        Self::build(config, solver)
    }

    /// Pruner with no solver; every call returns its input
    pub fn without_solver(config: PrunerConfig) -> Self {
        Self::build(config, None)
    }

    /// Pruner using a custom solver
    pub fn with_solver(config: PrunerConfig, solver: Arc<dyn PcstSolver>) -> Self {
        Self::build(config, Some(solver))
    }

    fn build(config: PrunerConfig, solver: Option<Arc<dyn PcstSolver>>) -> Self {
        if let Err(e) = config.validate() {
            warn!("Invalid pruner configuration: {}", e);
        }
        Self { config, solver }
    }

    pub fn config(&self) -> &PrunerConfig {
        &self.config
    }

    /// Whether a solver is available
    pub fn is_available(&self) -> bool {
        self.solver.is_some()
    }

    /// Prune `subgraph` to its most relevant connected part
    ///
    /// `node_embeddings` holds one embedding per node, in node order. Nodes
    /// without an embedding get prize 0.0. The input is returned borrowed
    /// when it already fits in `max_nodes`, when it is empty, when there is
    /// no solver, when `max_nodes` is 0, and when the solver fails.
    pub fn prune<'a>(
        &self,
        subgraph: &'a Subgraph,
        node_embeddings: &[Vec<f64>],
        query_embedding: &[f64],
    ) -> Cow<'a, Subgraph> {
        let max_nodes = self.config.max_nodes;
        let nodes = &subgraph.nodes;

        if nodes.is_empty() || nodes.len() <= max_nodes {
            return Cow::Borrowed(subgraph);
        }

        if max_nodes == 0 {
            warn!("max_nodes is 0, returning subgraph unpruned");
            return Cow::Borrowed(subgraph);
        }

        let Some(solver) = self.solver.as_ref() else {
            warn!("No PCST solver available, returning subgraph unpruned");
            return Cow::Borrowed(subgraph);
        };

        if node_embeddings.len() != nodes.len() {
            warn!(
                "Got {} embeddings for {} nodes; missing nodes get prize 0.0",
                node_embeddings.len(),
                nodes.len()
            );
        }

        let mut prizes = compute_node_prizes(node_embeddings, query_embedding);
        prizes.resize(nodes.len(), 0.0);

        // Steer the solver toward roughly max_nodes nodes
        let top_k = top_indices(&prizes, max_nodes);
        let boost = top_k.iter().map(|&i| prizes[i]).sum::<f64>() / top_k.len() as f64
            + self.config.boost_offset;
        for &i in &top_k {
            prizes[i] *= boost;
        }

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(i);
        }

        // Solver edge i is original edge edge_origin[i]
        let mut solver_edges = Vec::with_capacity(subgraph.edges.len());
        let mut edge_origin = Vec::with_capacity(subgraph.edges.len());
        for (orig, edge) in subgraph.edges.iter().enumerate() {
            if let (Some(&u), Some(&v)) = (index.get(edge.start.as_str()), index.get(edge.end.as_str())) {
                solver_edges.push((u, v));
                edge_origin.push(orig);
            }
        }

        if solver_edges.is_empty() {
            debug!("No edge connects two known nodes, keeping top {} by prize", max_nodes);
            let keep: HashSet<usize> = top_k.into_iter().collect();
            return Cow::Owned(Subgraph {
                nodes: select(nodes, &keep),
                edges: Vec::new(),
            });
        }

        let costs = vec![self.config.edge_cost; solver_edges.len()];
        let instance = PcstInstance::unrooted(&solver_edges, &prizes, &costs)
            .with_pruning(self.config.pruning);

        let solution = match solver.solve(&instance) {
            Ok(solution) if !solution.nodes.is_empty() => solution,
            Ok(_) => {
                warn!("PCST solver selected no nodes, returning subgraph unpruned");
                return Cow::Borrowed(subgraph);
            }
            Err(e) => {
                warn!("PCST solver failed, returning subgraph unpruned: {}", e);
                return Cow::Borrowed(subgraph);
            }
        };

        let selected_edges: HashSet<usize> = solution
            .edges
            .iter()
            .filter_map(|&e| edge_origin.get(e).copied())
            .collect();

        let mut keep: HashSet<usize> = solution.nodes.iter().copied().collect();
        for &e in &solution.edges {
            if let Some(&(u, v)) = solver_edges.get(e) {
                keep.insert(u);
                keep.insert(v);
            }
        }

        let pruned = Subgraph {
            nodes: select(nodes, &keep),
            edges: select(&subgraph.edges, &selected_edges),
        };

        info!(
            "PCST pruned subgraph: nodes {} -> {}, edges {} -> {}",
            nodes.len(),
            pruned.nodes.len(),
            subgraph.edges.len(),
            pruned.edges.len()
        );

        Cow::Owned(pruned)
    }
}

/// Indices of the `k` largest prizes; ties go to the lower index
fn top_indices(prizes: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..prizes.len()).collect();
    order.sort_by(|&a, &b| prizes[b].total_cmp(&prizes[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}

/// Clone the items whose index is in `keep`, preserving order
fn select<T: Clone>(items: &[T], keep: &HashSet<usize>) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, item)| item.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KgError, Result};
    use crate::retrieval::solver::PcstSolution;
    use crate::retrieval::subgraph::{GraphEdge, GraphNode};

    struct FailingSolver;

    impl PcstSolver for FailingSolver {
        fn solve(&self, _: &PcstInstance<'_>) -> Result<PcstSolution> {
            Err(KgError::SolverError("boom".to_string()))
        }
    }

    fn line(n: usize) -> Subgraph {
        Subgraph::new(
            (0..n).map(|i| GraphNode::new(i.to_string(), &["Thing"])).collect(),
            (1..n)
                .map(|i| GraphEdge::new((i - 1).to_string(), i.to_string(), "NEXT"))
                .collect(),
        )
    }

    fn config(max_nodes: usize) -> PrunerConfig {
        PrunerConfig::builder().max_nodes(max_nodes).build()
    }

    #[test]
    fn test_top_indices_ties_prefer_lower_index() {
        assert_eq!(top_indices(&[0.5, 0.9, 0.5, 0.1], 2), vec![1, 0]);
        assert_eq!(top_indices(&[0.1], 3), vec![0]);
    }

    #[test]
    fn test_under_max_returns_same_object() {
        let graph = line(3);
        let pruned = PcstPruner::new(config(5)).prune(&graph, &vec![vec![1.0]; 3], &[1.0]);
        assert!(matches!(pruned, Cow::Borrowed(g) if std::ptr::eq(g, &graph)));
    }

    #[test]
    fn test_exactly_max_returns_same_object() {
        let graph = line(5);
        let pruned = PcstPruner::new(config(5)).prune(&graph, &vec![vec![1.0, 0.0]; 5], &[1.0, 0.0]);
        assert!(matches!(pruned, Cow::Borrowed(g) if std::ptr::eq(g, &graph)));
    }

    #[test]
    fn test_empty_subgraph_returns_same_object() {
        let graph = Subgraph::default();
        let pruned = PcstPruner::new(config(0)).prune(&graph, &[], &[1.0, 0.0]);
        assert!(matches!(pruned, Cow::Borrowed(g) if std::ptr::eq(g, &graph)));
    }

    #[test]
    fn test_zero_max_nodes_returns_same_object() {
        let graph = line(4);
        let pruner = PcstPruner::new(config(0));
        assert!(pruner.config().validate().is_err());
        let pruned = pruner.prune(&graph, &vec![vec![1.0, 0.0]; 4], &[1.0, 0.0]);
        assert!(matches!(pruned, Cow::Borrowed(g) if std::ptr::eq(g, &graph)));
    }

    #[test]
    fn test_without_solver_returns_same_object() {
        let graph = line(25);
        let pruner = PcstPruner::without_solver(config(10));
        assert!(!pruner.is_available());
        let pruned = pruner.prune(&graph, &vec![vec![1.0, 0.0]; 25], &[1.0, 0.0]);
        assert!(matches!(pruned, Cow::Borrowed(g) if std::ptr::eq(g, &graph)));
    }

    #[test]
    fn test_solver_error_returns_input() {
        let graph = line(25);
        let pruner = PcstPruner::with_solver(config(10), Arc::new(FailingSolver));
        let pruned = pruner.prune(&graph, &vec![vec![1.0, 0.0]; 25], &[1.0, 0.0]);
        assert!(matches!(pruned, Cow::Borrowed(g) if std::ptr::eq(g, &graph)));
    }

    #[test]
    fn test_no_valid_edges_keeps_top_by_prize() {
        let mut graph = line(25);
        graph.edges = vec![GraphEdge::new("ghost_a", "ghost_b", "BROKEN")];
        let mut embeddings = vec![vec![0.01, 0.99]; 25];
        embeddings[7] = vec![0.99, 0.01];

        let pruner = PcstPruner::with_solver(config(10), Arc::new(FailingSolver));
        let pruned = pruner.prune(&graph, &embeddings, &[1.0, 0.0]);

        assert_eq!(pruned.nodes.len(), 10);
        assert!(pruned.edges.is_empty());
        assert!(pruned.nodes.iter().any(|n| n.id == "7"));
    }

    #[cfg(feature = "pcst")]
    #[test]
    fn test_missing_embeddings_get_zero_prize() {
        let graph = line(6);
        let pruned = PcstPruner::new(config(2)).prune(&graph, &[vec![1.0, 0.0], vec![1.0, 0.0]], &[1.0, 0.0]);
        let ids: Vec<&str> = pruned.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
        assert!(pruned.is_closed());
    }
}
