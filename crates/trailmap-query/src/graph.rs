use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use trailmap_core::{EdgeId, EdgeKind, NodeId, NodeKind, TokenComponents};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub full_name: String,
    #[serde(default)]
    pub components: TokenComponents,
}

impl FilterNode {
    pub fn new(id: NodeId, kind: NodeKind, full_name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            full_name: full_name.into(),
            components: TokenComponents::default(),
        }
    }

    pub fn with_components(mut self, components: TokenComponents) -> Self {
        self.components = components;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEdge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub components: TokenComponents,
}

impl FilterEdge {
    pub fn new(id: EdgeId, kind: EdgeKind, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            kind,
            source,
            target,
            components: TokenComponents::default(),
        }
    }

    pub fn with_components(mut self, components: TokenComponents) -> Self {
        self.components = components;
        self
    }
}

/// Serialized form of a code graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterGraphInput {
    pub nodes: Vec<FilterNode>,
    #[serde(default)]
    pub edges: Vec<FilterEdge>,
}

/// Typed code graph the query filters run on.
///
/// Nodes and edges live in flat arenas; adjacency is kept per node as edge index lists.
/// `MEMBER` edges point from a parent to its child.
#[derive(Debug, Default)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
    edges: Vec<FilterEdge>,
    node_map: HashMap<NodeId, NodeIndex>,
    edge_map: HashMap<EdgeId, EdgeIndex>,
    outgoing: Vec<Vec<EdgeIndex>>,
    incoming: Vec<Vec<EdgeIndex>>,
}

impl From<FilterGraphInput> for FilterGraph {
    fn from(input: FilterGraphInput) -> Self {
        let mut graph = Self::new();
        for node in input.nodes {
            graph.add_node(node);
        }
        for edge in input.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless one with the same id exists already.
    pub fn add_node(&mut self, node: FilterNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node.id) {
            return index;
        }

        let index = NodeIndex(self.nodes.len());
        self.node_map.insert(node.id, index);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        index
    }

    /// Adds an edge between two known nodes. Edges with a missing endpoint are dropped.
    pub fn add_edge(&mut self, edge: FilterEdge) -> Option<EdgeIndex> {
        if let Some(&index) = self.edge_map.get(&edge.id) {
            return Some(index);
        }

        let (Some(&source), Some(&target)) =
            (self.node_map.get(&edge.source), self.node_map.get(&edge.target))
        else {
            tracing::warn!(
                "Dropping edge {} because node {} or {} is missing from the graph",
                edge.id,
                edge.source,
                edge.target
            );
            return None;
        };

        let index = EdgeIndex(self.edges.len());
        self.edge_map.insert(edge.id, index);
        self.edges.push(edge);
        self.outgoing[source.0].push(index);
        self.incoming[target.0].push(index);
        Some(index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FilterEdge] {
        &self.edges
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_map.get(&id).copied()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&FilterNode> {
        self.node_index(id).map(|index| &self.nodes[index.0])
    }

    pub fn edge_by_id(&self, id: EdgeId) -> Option<&FilterEdge> {
        self.edge_map.get(&id).map(|index| &self.edges[index.0])
    }

    pub fn outgoing_edges(&self, node: NodeIndex) -> impl Iterator<Item = &FilterEdge> {
        self.outgoing[node.0].iter().map(|&index| &self.edges[index.0])
    }

    pub fn incoming_edges(&self, node: NodeIndex) -> impl Iterator<Item = &FilterEdge> {
        self.incoming[node.0].iter().map(|&index| &self.edges[index.0])
    }

    /// Every edge touching the node, outgoing first.
    pub fn edges_of(&self, node: NodeIndex) -> impl Iterator<Item = &FilterEdge> {
        self.outgoing_edges(node).chain(self.incoming_edges(node))
    }

    /// First outgoing edge of the given kind.
    pub fn find_edge_of_kind(&self, node: NodeIndex, kind: EdgeKind) -> Option<&FilterEdge> {
        self.outgoing_edges(node).find(|edge| edge.kind == kind)
    }

    /// The edge that makes this node a member of its parent.
    pub fn member_edge(&self, node: NodeIndex) -> Option<&FilterEdge> {
        self.incoming_edges(node)
            .find(|edge| edge.kind == EdgeKind::MEMBER)
    }

    pub fn parent(&self, node: NodeIndex) -> Option<&FilterNode> {
        self.member_edge(node)
            .and_then(|edge| self.node_by_id(edge.source))
    }

    pub fn children(&self, node: NodeIndex) -> impl Iterator<Item = &FilterNode> {
        self.outgoing_edges(node)
            .filter(|edge| edge.kind == EdgeKind::MEMBER)
            .filter_map(|edge| self.node_by_id(edge.target))
    }
}

impl Index<NodeIndex> for FilterGraph {
    type Output = FilterNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for FilterGraph {
    type Output = FilterEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}
