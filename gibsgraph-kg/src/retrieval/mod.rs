//! Retrieval-side subgraph handling
//!
//! Neighbourhood subgraphs fetched around a query can be far larger than an
//! answer needs. [`PcstPruner`] keeps the connected part most similar to the
//! query embedding.

pub mod prizes;
pub mod pruner;
pub mod solver;
pub mod subgraph;

pub use prizes::{compute_node_prizes, cosine_similarity};
pub use pruner::PcstPruner;
#[cfg(feature = "pcst")]
pub use solver::GoemansWilliamson;
pub use solver::{PcstInstance, PcstSolution, PcstSolver, PruningMode};
pub use subgraph::{GraphEdge, GraphNode, Subgraph};
