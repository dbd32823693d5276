//! Component dependency graph using `petgraph`.
//!
//! Builds a directed acyclic graph over [`ComponentKind`] nodes and
//! resolves the topological order a composition pass instantiates them in.

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use stratus_common::error::{Result, StratusError};
use stratus_common::types::ComponentKind;

/// A dependency graph of components.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: petgraph::Graph<ComponentKind, ()>,
    /// Node lookup by component.
    nodes: BTreeMap<ComponentKind, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            nodes: BTreeMap::new(),
        }
    }

    /// Builds the static topology: every component with the edges
    /// declared by [`ComponentKind::dependencies`].
    #[must_use]
    pub fn topology() -> Self {
        let mut graph = Self::new();
        for kind in ComponentKind::ALL {
            let _ = graph.add_component(kind);
        }
        for kind in ComponentKind::ALL {
            for &dep in kind.dependencies() {
                graph.add_dependency(kind, dep);
            }
        }
        graph
    }

    /// Adds a component node to the graph. Adding the same component twice
    /// returns the existing node.
    pub fn add_component(&mut self, kind: ComponentKind) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&kind) {
            return idx;
        }
        let idx = self.graph.add_node(kind);
        let _ = self.nodes.insert(kind, idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: ComponentKind, dependency: ComponentKind) {
        let dependent = self.add_component(dependent);
        let dependency = self.add_component(dependency);
        if self.graph.find_edge(dependency, dependent).is_none() {
            let _ = self.graph.add_edge(dependency, dependent, ());
        }
    }

    /// Returns the direct dependencies of `kind`, in declaration order.
    #[must_use]
    pub fn dependencies_of(&self, kind: ComponentKind) -> Vec<ComponentKind> {
        let Some(&idx) = self.nodes.get(&kind) else {
            return Vec::new();
        };
        let mut found: Vec<ComponentKind> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        found.sort_unstable();
        found
    }

    /// Returns whether `kind` is part of the graph.
    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.nodes.contains_key(&kind)
    }

    /// Number of components in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the graph has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a topological ordering of components for instantiation.
    ///
    /// Dependencies appear before the components that depend on them.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn resolve_order(&self) -> Result<Vec<ComponentKind>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).copied())
                .collect()),
            Err(cycle) => {
                let at = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map_or("unknown", |k| k.as_str());
                Err(StratusError::config(format!(
                    "cyclic dependency detected in component graph at {at}"
                )))
            }
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
