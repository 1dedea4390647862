use crate::graph::FilterGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use trailmap_core::{EdgeId, NodeId};

/// Id snapshot of part of a [`FilterGraph`], passed between filter stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGraph {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<EdgeId>,
}

impl SubGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_graph(graph: &FilterGraph) -> Self {
        Self {
            nodes: graph.nodes().iter().map(|node| node.id).collect(),
            edges: graph.edges().iter().map(|edge| edge.id).collect(),
        }
    }

    pub fn add_node(&mut self, id: NodeId) {
        self.nodes.insert(id);
    }

    pub fn add_edge(&mut self, id: EdgeId) {
        self.edges.insert(id);
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn add(&mut self, other: &SubGraph) {
        self.nodes.extend(other.nodes.iter().copied());
        self.edges.extend(other.edges.iter().copied());
    }

    pub fn subtract(&mut self, other: &SubGraph) {
        self.nodes.retain(|id| !other.nodes.contains(id));
        self.edges.retain(|id| !other.edges.contains(id));
    }

    /// Adds every edge of `graph` whose endpoints are both part of this sub graph.
    pub fn add_connecting_edges(&mut self, graph: &FilterGraph) {
        for edge in graph.edges() {
            if self.nodes.contains(&edge.source) && self.nodes.contains(&edge.target) {
                self.edges.insert(edge.id);
            }
        }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().collect()
    }
}
