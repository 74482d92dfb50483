//! Property dependency graph.
//!
//! An edge `p -> q` means computing `q` reads `p`. The graph is an explicit
//! DAG keyed by property name; ancestry and ordering queries go through
//! petgraph.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};

/// Directed acyclic graph over property names.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property node (no-op if present) and return its index.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Record that `to` reads `from`.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All property names, sorted.
    pub fn nodes(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Union of two graphs (nodes and edges of both).
    pub fn compose(&self, other: &DependencyGraph) -> DependencyGraph {
        let mut out = self.clone();
        for name in other.index.keys() {
            out.add_node(name);
        }
        for edge in other.graph.edge_indices() {
            if let Some((a, b)) = other.graph.edge_endpoints(edge) {
                out.add_edge(&other.graph[a], &other.graph[b]);
            }
        }
        out
    }

    /// Union of any number of graphs.
    pub fn compose_all<'a>(graphs: impl IntoIterator<Item = &'a DependencyGraph>) -> Self {
        graphs
            .into_iter()
            .fold(DependencyGraph::new(), |acc, g| acc.compose(g))
    }

    /// Subgraph induced by `names`; names absent from the graph are ignored.
    pub fn subgraph<S: AsRef<str>>(&self, names: &[S]) -> DependencyGraph {
        let keep: BTreeSet<&str> = names
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| self.contains(s))
            .collect();
        let mut out = DependencyGraph::new();
        for name in &keep {
            out.add_node(name);
        }
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                let (from, to) = (self.graph[a].as_str(), self.graph[b].as_str());
                if keep.contains(from) && keep.contains(to) {
                    out.add_edge(from, to);
                }
            }
        }
        out
    }

    /// Every property `name` transitively reads.
    pub fn ancestors(&self, name: &str) -> BTreeSet<String> {
        let Some(&start) = self.index.get(name) else {
            return BTreeSet::new();
        };
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut out = BTreeSet::new();
        while let Some(idx) = bfs.next(reversed) {
            if idx != start {
                out.insert(self.graph[idx].clone());
            }
        }
        out
    }

    /// Every property that transitively reads `name`.
    pub fn descendants(&self, name: &str) -> BTreeSet<String> {
        let Some(&start) = self.index.get(name) else {
            return BTreeSet::new();
        };
        let mut bfs = Bfs::new(&self.graph, start);
        let mut out = BTreeSet::new();
        while let Some(idx) = bfs.next(&self.graph) {
            if idx != start {
                out.insert(self.graph[idx].clone());
            }
        }
        out
    }

    /// Properties with no upstream dependency in this graph, sorted.
    pub fn roots(&self) -> Vec<String> {
        self.index
            .iter()
            .filter(|&(_, &idx)| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Dependency order (readers after what they read); None on a cycle.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|i| self.graph[i].clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DependencyGraph {
        // diameter -> area -> conductance <- diffusivity <- temperature
        let mut g = DependencyGraph::new();
        g.add_edge("pore.diameter", "throat.area");
        g.add_edge("throat.area", "throat.conductance");
        g.add_edge("pore.diffusivity", "throat.conductance");
        g.add_edge("pore.temperature", "pore.diffusivity");
        g
    }

    #[test]
    fn ancestors_and_descendants() {
        let g = sample();
        let anc = g.ancestors("throat.conductance");
        assert_eq!(anc.len(), 4);
        assert!(anc.contains("pore.temperature"));
        let desc = g.descendants("pore.temperature");
        assert_eq!(
            desc.into_iter().collect::<Vec<_>>(),
            vec!["pore.diffusivity".to_string(), "throat.conductance".to_string()]
        );
        assert!(g.ancestors("missing").is_empty());
    }

    #[test]
    fn induced_subgraph_roots() {
        let g = sample();
        let sub = g.subgraph(&["throat.area", "throat.conductance", "pore.diffusivity", "nope"]);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(
            sub.roots(),
            vec!["pore.diffusivity".to_string(), "throat.area".to_string()]
        );
    }

    #[test]
    fn topological_order_respects_edges() {
        let g = sample();
        let order = g.topological_order().unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("pore.temperature") < pos("pore.diffusivity"));
        assert!(pos("pore.diffusivity") < pos("throat.conductance"));
        assert!(pos("throat.area") < pos("throat.conductance"));
    }

    #[test]
    fn cycle_is_detected() {
        let mut g = sample();
        assert!(!g.is_cyclic());
        g.add_edge("throat.conductance", "pore.temperature");
        assert!(g.is_cyclic());
        assert!(g.topological_order().is_none());
    }

    #[test]
    fn compose_merges_nodes_and_edges() {
        let mut a = DependencyGraph::new();
        a.add_edge("pore.a", "pore.b");
        let mut b = DependencyGraph::new();
        b.add_edge("pore.b", "pore.c");
        b.add_node("pore.d");
        let c = DependencyGraph::compose_all([&a, &b]);
        assert_eq!(c.node_count(), 4);
        assert!(c.ancestors("pore.c").contains("pore.a"));
    }
}
