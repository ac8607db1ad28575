//! Prize-collecting Steiner tree solving
//!
//! [`PcstSolver`] is the seam between subgraph pruning and the combinatorial
//! solver. The built-in [`GoemansWilliamson`] solver (cargo feature `pcst`)
//! runs the classic moat-growing phase and then prunes the resulting forest.

use crate::error::{KgError, Result};
use serde::{Deserialize, Serialize};

#[cfg(feature = "pcst")]
use petgraph::unionfind::UnionFind;
#[cfg(feature = "pcst")]
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
#[cfg(feature = "pcst")]
use tracing::debug;

/// How the solver trims the trees found by the growth phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruningMode {
    /// Keep each tree as grown
    None,
    /// Repeatedly strip leaves whose prize does not pay for their edge
    Simple,
    /// Keep the most valuable subtree of each tree
    #[default]
    Strong,
}

/// One PCST problem over nodes `0..prizes.len()`
#[derive(Debug, Clone, Copy)]
pub struct PcstInstance<'a> {
    /// Undirected edges as node index pairs
    pub edges: &'a [(usize, usize)],
    /// Non-negative prize of every node
    pub prizes: &'a [f64],
    /// Non-negative cost of every edge
    pub costs: &'a [f64],
    /// Node that must be part of the solution, if any
    pub root: Option<usize>,
    /// Number of trees to return when unrooted
    pub num_clusters: usize,
    pub pruning: PruningMode,
}

impl<'a> PcstInstance<'a> {
    /// Unrooted single-tree instance with strong pruning
    pub fn unrooted(edges: &'a [(usize, usize)], prizes: &'a [f64], costs: &'a [f64]) -> Self {
        Self {
            edges,
            prizes,
            costs,
            root: None,
            num_clusters: 1,
            pruning: PruningMode::Strong,
        }
    }

    pub fn with_root(mut self, root: usize) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_num_clusters(mut self, num_clusters: usize) -> Self {
        self.num_clusters = num_clusters;
        self
    }

    pub fn with_pruning(mut self, pruning: PruningMode) -> Self {
        self.pruning = pruning;
        self
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    /// Check the instance is well formed
    pub fn validate(&self) -> Result<()> {
        let n = self.prizes.len();

        if self.costs.len() != self.edges.len() {
            return Err(KgError::SolverError(format!(
                "{} edges but {} costs",
                self.edges.len(),
                self.costs.len()
            )));
        }

        if let Some(&(u, v)) = self.edges.iter().find(|(u, v)| *u >= n || *v >= n) {
            return Err(KgError::SolverError(format!(
                "Edge ({}, {}) references a node outside 0..{}",
                u, v, n
            )));
        }

        if !self.prizes.iter().all(|p| p.is_finite() && *p >= 0.0) {
            return Err(KgError::SolverError(
                "Prizes must be finite and non-negative".to_string(),
            ));
        }

        if !self.costs.iter().all(|c| c.is_finite() && *c >= 0.0) {
            return Err(KgError::SolverError(
                "Costs must be finite and non-negative".to_string(),
            ));
        }

        match self.root {
            Some(root) if root >= n => Err(KgError::SolverError(format!(
                "Root {} is outside 0..{}",
                root, n
            ))),
            None if self.num_clusters == 0 => Err(KgError::SolverError(
                "An unrooted instance needs at least one cluster".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Selected node and edge indices, both ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcstSolution {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
}

/// A prize-collecting Steiner tree solver
pub trait PcstSolver: Send + Sync {
    /// Select a forest maximising collected prizes minus paid edge costs
    ///
    /// Every returned edge must connect two returned nodes.
    fn solve(&self, instance: &PcstInstance<'_>) -> Result<PcstSolution>;
}

/// Goemans–Williamson primal-dual PCST approximation
///
/// Self-loops are ignored. Edges parallel to a selected tree edge are
/// returned with it.
#[cfg(feature = "pcst")]
#[derive(Debug, Clone, Copy, Default)]
pub struct GoemansWilliamson;

#[cfg(feature = "pcst")]
impl PcstSolver for GoemansWilliamson {
    fn solve(&self, instance: &PcstInstance<'_>) -> Result<PcstSolution> {
        instance.validate()?;
        if instance.is_empty() {
            return Ok(PcstSolution::default());
        }

        let (clusters, forest) = grow(instance);

        // Group nodes and forest edges by final cluster
        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for node in 0..instance.len() {
            members.entry(clusters.find(node)).or_default().push(node);
        }
        let mut tree_edges: HashMap<usize, Vec<usize>> = HashMap::new();
        for &edge in &forest {
            let (u, _) = instance.edges[edge];
            tree_edges.entry(clusters.find(u)).or_default().push(edge);
        }

        let mut trees: Vec<Tree> = members
            .iter()
            .filter(|(_, nodes)| instance.root.map_or(true, |root| nodes.contains(&root)))
            .map(|(rep, nodes)| {
                let edges = tree_edges.get(rep).map(Vec::as_slice).unwrap_or(&[]);
                prune_tree(instance, nodes, edges)
            })
            .collect();

        trees.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.nodes.first().cmp(&b.nodes.first()))
        });
        trees.truncate(instance.num_clusters.max(1));

        let solution = assemble(instance, &trees);
        debug!(
            "PCST selected {} of {} nodes and {} of {} edges",
            solution.nodes.len(),
            instance.len(),
            solution.edges.len(),
            instance.edges.len()
        );
        Ok(solution)
    }
}

#[cfg(feature = "pcst")]
enum Event {
    Deactivate(usize),
    Tight(usize),
}

/// Moat-growing phase
///
/// Every active cluster grows at unit rate, paying towards the edges that
/// leave it, until its prize budget is spent. An edge whose cost is fully
/// paid merges its two clusters. Returns the final clusters and the edges
/// that merged them.
#[cfg(feature = "pcst")]
fn grow(instance: &PcstInstance<'_>) -> (UnionFind<usize>, Vec<usize>) {
    let n = instance.len();
    let edges = instance.edges;

    let mut clusters = UnionFind::new(n);
    let mut active: Vec<bool> = instance.prizes.iter().map(|p| *p > 0.0).collect();
    let mut budget = instance.prizes.to_vec();
    let mut rooted = vec![false; n];
    if let Some(root) = instance.root {
        active[root] = false;
        rooted[root] = true;
    }
    let mut paid = vec![0.0; edges.len()];
    let mut forest = Vec::new();
    let mut active_count = active.iter().filter(|a| **a).count();

    // The root's cluster never grows, so a rooted run ends when all others stop
    let target = if instance.root.is_some() {
        0
    } else {
        instance.num_clusters
    };

    while active_count > target {
        let mut next: Option<(f64, Event)> = None;
        let mut consider = |delta: f64, event: Event| {
            if next.as_ref().map_or(true, |(best, _)| delta < *best) {
                next = Some((delta, event));
            }
        };

        for v in 0..n {
            if active[v] && clusters.find(v) == v {
                consider(budget[v], Event::Deactivate(v));
            }
        }
        for (e, &(u, v)) in edges.iter().enumerate() {
            let (cu, cv) = (clusters.find(u), clusters.find(v));
            let rate = active[cu] as usize + active[cv] as usize;
            if cu != cv && rate > 0 {
                let remaining = (instance.costs[e] - paid[e]).max(0.0);
                consider(remaining / rate as f64, Event::Tight(e));
            }
        }

        let Some((delta, event)) = next else {
            break;
        };

        for v in 0..n {
            if active[v] && clusters.find(v) == v {
                budget[v] = (budget[v] - delta).max(0.0);
            }
        }
        for (e, &(u, v)) in edges.iter().enumerate() {
            let (cu, cv) = (clusters.find(u), clusters.find(v));
            if cu != cv {
                paid[e] += delta * (active[cu] as usize + active[cv] as usize) as f64;
            }
        }

        match event {
            Event::Deactivate(c) => {
                active[c] = false;
                active_count -= 1;
            }
            Event::Tight(e) => {
                let (u, v) = edges[e];
                let (cu, cv) = (clusters.find(u), clusters.find(v));
                let was_active = active[cu] as usize + active[cv] as usize;
                let has_root = rooted[cu] || rooted[cv];
                let merged_budget = budget[cu] + budget[cv];

                clusters.union(cu, cv);
                let c = clusters.find(cu);
                active[cu] = false;
                active[cv] = false;
                active[c] = !has_root;
                rooted[c] = has_root;
                budget[c] = merged_budget;

                active_count = active_count + active[c] as usize - was_active;
                forest.push(e);
            }
        }
    }

    (clusters, forest)
}

#[cfg(feature = "pcst")]
struct Tree {
    nodes: Vec<usize>,
    edges: Vec<usize>,
    /// Collected prizes minus paid edge costs
    value: f64,
}

#[cfg(feature = "pcst")]
type Adjacency = HashMap<usize, Vec<(usize, usize)>>;

#[cfg(feature = "pcst")]
fn adjacency(instance: &PcstInstance<'_>, edges: &[usize]) -> Adjacency {
    let mut adj: Adjacency = HashMap::new();
    for &e in edges {
        let (u, v) = instance.edges[e];
        adj.entry(u).or_default().push((v, e));
        adj.entry(v).or_default().push((u, e));
    }
    adj
}

/// Breadth-first order from `root` with each node's (parent, edge)
#[cfg(feature = "pcst")]
fn bfs(root: usize, adj: &Adjacency) -> (Vec<usize>, HashMap<usize, (usize, usize)>) {
    let mut order = vec![root];
    let mut parent = HashMap::new();
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(v) = queue.pop_front() {
        for &(w, e) in adj.get(&v).map(Vec::as_slice).unwrap_or(&[]) {
            if seen.insert(w) {
                parent.insert(w, (v, e));
                order.push(w);
                queue.push_back(w);
            }
        }
    }

    (order, parent)
}

/// Value of the best subtree hanging below each node when rooted at `order[0]`
#[cfg(feature = "pcst")]
fn subtree_values(
    instance: &PcstInstance<'_>,
    order: &[usize],
    parent: &HashMap<usize, (usize, usize)>,
) -> HashMap<usize, f64> {
    let mut down: HashMap<usize, f64> = order.iter().map(|&v| (v, instance.prizes[v])).collect();
    for &v in order.iter().rev() {
        if let Some(&(p, e)) = parent.get(&v) {
            let gain = down[&v] - instance.costs[e];
            if gain > 0.0 {
                *down.entry(p).or_default() += gain;
            }
        }
    }
    down
}

#[cfg(feature = "pcst")]
fn prune_tree(instance: &PcstInstance<'_>, nodes: &[usize], edges: &[usize]) -> Tree {
    let root = instance
        .root
        .filter(|r| nodes.contains(r))
        .unwrap_or(nodes[0]);

    let tree = match instance.pruning {
        PruningMode::None => Tree {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
            value: 0.0,
        },
        PruningMode::Simple => strip_leaves(instance, nodes, edges, root),
        PruningMode::Strong => strong_prune(instance, edges, root),
    };

    let value = tree.nodes.iter().map(|&v| instance.prizes[v]).sum::<f64>()
        - tree.edges.iter().map(|&e| instance.costs[e]).sum::<f64>();
    Tree { value, ..tree }
}

/// Remove leaves whose prize is below the cost of their edge until none remain
#[cfg(feature = "pcst")]
fn strip_leaves(instance: &PcstInstance<'_>, nodes: &[usize], edges: &[usize], root: usize) -> Tree {
    let adj = adjacency(instance, edges);
    let mut degree: HashMap<usize, usize> =
        nodes.iter().map(|v| (*v, adj.get(v).map_or(0, Vec::len))).collect();
    let mut removed_nodes = HashSet::new();
    let mut removed_edges = HashSet::new();
    let mut queue: VecDeque<usize> = nodes.iter().copied().filter(|v| degree[v] == 1).collect();

    while let Some(leaf) = queue.pop_front() {
        if leaf == root && instance.root.is_some() {
            continue;
        }
        if removed_nodes.len() + 1 >= nodes.len() || degree[&leaf] != 1 {
            continue;
        }
        let Some(&(next, e)) = adj[&leaf].iter().find(|(_, e)| !removed_edges.contains(e)) else {
            continue;
        };
        if instance.prizes[leaf] >= instance.costs[e] {
            continue;
        }

        removed_nodes.insert(leaf);
        removed_edges.insert(e);
        if let Some(d) = degree.get_mut(&leaf) {
            *d = 0;
        }
        if let Some(d) = degree.get_mut(&next) {
            *d -= 1;
            if *d == 1 {
                queue.push_back(next);
            }
        }
    }

    Tree {
        nodes: nodes.iter().copied().filter(|v| !removed_nodes.contains(v)).collect(),
        edges: edges.iter().copied().filter(|e| !removed_edges.contains(e)).collect(),
        value: 0.0,
    }
}

/// Keep the most valuable subtree
///
/// Unrooted trees are re-rooted at the node whose best containing subtree is
/// worth the most; ties go to the lowest node index.
#[cfg(feature = "pcst")]
fn strong_prune(instance: &PcstInstance<'_>, edges: &[usize], start: usize) -> Tree {
    let adj = adjacency(instance, edges);

    let root = if instance.root.is_some() {
        start
    } else {
        let (order, parent) = bfs(start, &adj);
        let down = subtree_values(instance, &order, &parent);

        // Value of the best subtree containing each node, top-down
        let mut full: HashMap<usize, f64> = HashMap::from([(start, down[&start])]);
        for &v in order.iter().skip(1) {
            let (p, e) = parent[&v];
            let cost = instance.costs[e];
            let without_v = full[&p] - (down[&v] - cost).max(0.0);
            full.insert(v, down[&v] + (without_v - cost).max(0.0));
        }

        let mut candidates = order.clone();
        candidates.sort_unstable();
        candidates
            .into_iter()
            .fold(None, |best: Option<usize>, v| match best {
                Some(b) if full[&b] >= full[&v] => Some(b),
                _ => Some(v),
            })
            .unwrap_or(start)
    };

    let (order, parent) = bfs(root, &adj);
    let down = subtree_values(instance, &order, &parent);

    let mut kept = HashSet::from([root]);
    let mut kept_edges = Vec::new();
    for &v in order.iter().skip(1) {
        let (p, e) = parent[&v];
        if kept.contains(&p) && down[&v] - instance.costs[e] > 0.0 {
            kept.insert(v);
            kept_edges.push(e);
        }
    }

    let mut nodes: Vec<usize> = kept.into_iter().collect();
    nodes.sort_unstable();
    Tree {
        nodes,
        edges: kept_edges,
        value: 0.0,
    }
}

/// Merge trees into one solution, adding edges parallel to kept tree edges
#[cfg(feature = "pcst")]
fn assemble(instance: &PcstInstance<'_>, trees: &[Tree]) -> PcstSolution {
    let mut nodes: Vec<usize> = trees.iter().flat_map(|t| t.nodes.iter().copied()).collect();
    nodes.sort_unstable();
    nodes.dedup();

    let selected: HashSet<usize> = trees.iter().flat_map(|t| t.edges.iter().copied()).collect();
    let pair = |(u, v): (usize, usize)| (u.min(v), u.max(v));
    let kept_pairs: HashSet<(usize, usize)> =
        selected.iter().map(|&e| pair(instance.edges[e])).collect();

    let edges = instance
        .edges
        .iter()
        .enumerate()
        .filter(|(e, &(u, v))| {
            selected.contains(e) || (u != v && kept_pairs.contains(&pair((u, v))))
        })
        .map(|(e, _)| e)
        .collect();

    PcstSolution { nodes, edges }
}
