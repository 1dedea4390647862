use crate::dummy::{DummyEdge, DummyNode};
use std::collections::{BTreeSet, HashMap, VecDeque};
use trailmap_core::{NodeId, Vec2i};

pub(crate) const VIRTUAL_NODE_NAME: &str = "<virtual>";

/// Node of the layered graph. Virtual nodes have no dummy node behind them.
#[derive(Debug, Clone)]
pub(crate) struct TrailNode {
    pub token_id: NodeId,
    pub name: String,
    pub dummy: Option<usize>,
    pub level: Option<usize>,
    pub size: Vec2i,
    pub position: Vec2i,
    pub incoming: BTreeSet<usize>,
    pub outgoing: BTreeSet<usize>,
}

impl TrailNode {
    fn new(token_id: NodeId, name: impl Into<String>, dummy: Option<usize>, size: Vec2i) -> Self {
        Self {
            token_id,
            name: name.into(),
            dummy,
            level: None,
            size,
            position: Vec2i::default(),
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.dummy.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TrailEdge {
    pub origin: usize,
    pub target: usize,
    /// Chain from the original origin towards the target.
    pub virtual_nodes: Vec<usize>,
    pub dummy_edges: Vec<usize>,
}

struct DfsFrame {
    node: usize,
    edges: Vec<usize>,
    next: usize,
}

/// Arena of trail nodes and edges. Nodes and edges refer to each other by index.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrailGraph {
    pub nodes: Vec<TrailNode>,
    pub edges: Vec<TrailEdge>,
    pub roots: Vec<usize>,
    by_token: HashMap<NodeId, usize>,
    by_pair: HashMap<(usize, usize), usize>,
}

impl TrailGraph {
    /// One trail node per visible top level dummy node. Edges attach to the top level
    /// ancestors of their endpoints. Hierarchy edges are added after all others.
    pub fn build(dummy_nodes: &[DummyNode], dummy_edges: &mut [DummyEdge], inverted: bool) -> Self {
        let mut graph = Self::default();

        for (index, dummy) in dummy_nodes.iter().enumerate() {
            if !dummy.visible {
                continue;
            }

            let trail_index = graph.nodes.len();
            graph
                .nodes
                .push(TrailNode::new(dummy.token_id, dummy.name.clone(), Some(index), dummy.size));

            for token_id in dummy.token_ids() {
                graph.by_token.entry(token_id).or_insert(trail_index);
            }

            if dummy.has_active_sub_node() {
                graph.roots.push(trail_index);
            }
        }

        for edge in dummy_edges.iter_mut() {
            edge.path.clear();
        }

        for hierarchy_pass in [false, true] {
            for (index, edge) in dummy_edges.iter().enumerate() {
                if edge.visible && edge.data.is_some() && edge.is_hierarchy() == hierarchy_pass {
                    graph.add_edge(index, edge, inverted);
                }
            }
        }

        if graph.roots.is_empty() && !graph.nodes.is_empty() {
            graph.roots = (0..graph.nodes.len())
                .filter(|&node| graph.nodes[node].incoming.is_empty())
                .collect();
            if graph.roots.is_empty() {
                graph.roots.push(0);
            }
            tracing::debug!(
                "No active node in trail, using {} fallback roots",
                graph.roots.len()
            );
        }

        graph
    }

    fn add_edge(&mut self, dummy_index: usize, dummy: &DummyEdge, inverted: bool) {
        let (Some(&owner), Some(&target)) = (
            self.by_token.get(&dummy.owner_id),
            self.by_token.get(&dummy.target_id),
        ) else {
            tracing::debug!(
                "Dropping trail edge {}: endpoint {} or {} is not visible",
                dummy.id,
                dummy.owner_id,
                dummy.target_id
            );
            return;
        };

        let (origin, target) = if dummy.is_hierarchy() != inverted {
            (target, owner)
        } else {
            (owner, target)
        };

        if origin == target {
            return;
        }

        let pair = (origin.min(target), origin.max(target));
        if let Some(&existing) = self.by_pair.get(&pair) {
            self.edges[existing].dummy_edges.push(dummy_index);
            return;
        }

        let edge = self.edges.len();
        self.edges.push(TrailEdge {
            origin,
            target,
            virtual_nodes: Vec::new(),
            dummy_edges: vec![dummy_index],
        });
        self.by_pair.insert(pair, edge);
        self.nodes[origin].outgoing.insert(edge);
        self.nodes[target].incoming.insert(edge);
    }

    /// Trail node a token id belongs to.
    pub fn node_of(&self, token_id: NodeId) -> Option<usize> {
        self.by_token.get(&token_id).copied()
    }

    pub fn level(&self, node: usize) -> usize {
        self.nodes[node].level.unwrap_or(0)
    }

    pub fn switch_edge(&mut self, edge: usize) {
        let TrailEdge { origin, target, .. } = self.edges[edge];

        self.nodes[origin].outgoing.remove(&edge);
        self.nodes[origin].incoming.insert(edge);
        self.nodes[target].incoming.remove(&edge);
        self.nodes[target].outgoing.insert(edge);

        let edge = &mut self.edges[edge];
        std::mem::swap(&mut edge.origin, &mut edge.target);
    }

    /// Points every root's incoming edges away from it, then reverses the back edges
    /// of a depth first search started at the roots and at every node left unvisited.
    pub fn make_acyclic(&mut self) {
        let roots: BTreeSet<usize> = self.roots.iter().copied().collect();
        for &root in &roots {
            let incoming: Vec<usize> = self.nodes[root].incoming.iter().copied().collect();
            for edge in incoming {
                if !roots.contains(&self.edges[edge].origin) {
                    self.switch_edge(edge);
                }
            }
        }

        let node_count = self.nodes.len();
        let mut visited = vec![false; node_count];
        let mut on_path = vec![false; node_count];
        let mut back_edges = Vec::new();

        let starts: Vec<usize> = self.roots.iter().copied().chain(0..node_count).collect();
        for start in starts {
            if visited[start] {
                continue;
            }

            visited[start] = true;
            on_path[start] = true;
            let mut stack = vec![self.frame(start)];

            while let Some(frame) = stack.last_mut() {
                let Some(&edge) = frame.edges.get(frame.next) else {
                    on_path[frame.node] = false;
                    stack.pop();
                    continue;
                };
                frame.next += 1;

                let target = self.edges[edge].target;
                if on_path[target] {
                    back_edges.push(edge);
                } else if !visited[target] {
                    visited[target] = true;
                    on_path[target] = true;
                    stack.push(self.frame(target));
                }
            }
        }

        for edge in back_edges {
            self.switch_edge(edge);
        }
    }

    fn frame(&self, node: usize) -> DfsFrame {
        DfsFrame {
            node,
            edges: self.nodes[node].outgoing.iter().copied().collect(),
            next: 0,
        }
    }

    /// Walks forward from the roots to the deepest frontier, then back along the recorded
    /// predecessors, giving that chain consecutive levels.
    pub fn assign_longest_path_levels(&mut self) {
        let mut frontier: BTreeSet<usize> = self.roots.iter().copied().collect();
        let mut predecessors: HashMap<usize, usize> = HashMap::new();
        let mut level = 0;

        while level < self.nodes.len() {
            let mut next = BTreeSet::new();
            for &node in &frontier {
                for &edge in &self.nodes[node].outgoing {
                    let target = self.edges[edge].target;
                    next.insert(target);
                    predecessors.insert(target, node);
                }
            }

            if next.is_empty() {
                break;
            }
            frontier = next;
            level += 1;
        }

        while !frontier.is_empty() {
            let mut previous = BTreeSet::new();
            for &node in &frontier {
                self.nodes[node].level = Some(level);
                if level > 0
                    && let Some(&predecessor) = predecessors.get(&node)
                {
                    previous.insert(predecessor);
                }
            }

            if level == 0 {
                break;
            }
            frontier = previous;
            level -= 1;
        }
    }

    /// Raises every node above all of its predecessors, in topological order. Nodes
    /// without a level and without predecessors start at 0.
    pub fn assign_remaining_levels(&mut self) {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|node| node.incoming.len()).collect();
        let mut queue: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&node| in_degree[node] == 0)
            .collect();

        let mut processed = 0;
        while let Some(node) = queue.pop_front() {
            processed += 1;

            let above_predecessors = self.nodes[node]
                .incoming
                .iter()
                .filter_map(|&edge| self.nodes[self.edges[edge].origin].level)
                .map(|level| level + 1)
                .max();
            self.nodes[node].level = Some(self.nodes[node].level.max(above_predecessors).unwrap_or(0));

            let targets: Vec<usize> = self.nodes[node]
                .outgoing
                .iter()
                .map(|&edge| self.edges[edge].target)
                .collect();
            for target in targets {
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    queue.push_back(target);
                }
            }
        }

        if processed < self.nodes.len() {
            tracing::debug!(
                "Trail graph still has a cycle, {} nodes left unordered",
                self.nodes.len() - processed
            );
            for node in &mut self.nodes {
                node.level.get_or_insert(0);
            }
        }
    }

    /// Splits every edge spanning several levels through a chain of virtual nodes, one
    /// per skipped level.
    pub fn add_virtual_nodes(&mut self, size: Vec2i) {
        for edge in 0..self.edges.len() {
            let origin_level = self.level(self.edges[edge].origin);
            let target_level = self.level(self.edges[edge].target);

            for level in origin_level + 1..target_level {
                let node = self.nodes.len();
                let mut virtual_node = TrailNode::new(NodeId::VIRTUAL, VIRTUAL_NODE_NAME, None, size);
                virtual_node.level = Some(level);
                self.nodes.push(virtual_node);

                let origin = self.edges[edge].origin;
                let link = self.edges.len();
                self.edges.push(TrailEdge {
                    origin,
                    target: node,
                    virtual_nodes: Vec::new(),
                    dummy_edges: Vec::new(),
                });

                self.nodes[origin].outgoing.remove(&edge);
                self.nodes[origin].outgoing.insert(link);
                self.nodes[node].incoming.insert(link);
                self.nodes[node].outgoing.insert(edge);

                self.edges[edge].origin = node;
                self.edges[edge].virtual_nodes.push(node);
            }
        }
    }

    pub fn log_graph(&self) {
        for node in self.nodes.iter().filter(|node| !node.is_virtual()) {
            tracing::trace!(
                "{}\t{:?}\t{}\t{}\t{}",
                node.token_id,
                node.level,
                node.incoming.len(),
                node.outgoing.len(),
                node.name
            );
        }
        for edge in &self.edges {
            tracing::trace!(
                "{}\t{}",
                self.nodes[edge.origin].name,
                self.nodes[edge.target].name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trailmap_core::{EdgeId, EdgeKind};

    fn dummy(id: i64) -> DummyNode {
        DummyNode::data(NodeId(id), format!("n{id}"), Vec2i::new(60, 20))
    }

    fn call(owner: i64, target: i64) -> DummyEdge {
        DummyEdge::new(EdgeId(owner * 100 + target), NodeId(owner), NodeId(target), EdgeKind::CALL)
    }

    fn build(count: i64, active: i64, pairs: &[(i64, i64)]) -> TrailGraph {
        let nodes: Vec<DummyNode> = (1..=count)
            .map(|id| {
                let mut node = dummy(id);
                node.active = id == active;
                node
            })
            .collect();
        let mut edges: Vec<DummyEdge> = pairs.iter().map(|&(a, b)| call(a, b)).collect();
        TrailGraph::build(&nodes, &mut edges, false)
    }

    fn has_cycle(graph: &TrailGraph) -> bool {
        let mut state = vec![0u8; graph.nodes.len()];
        fn visit(graph: &TrailGraph, node: usize, state: &mut [u8]) -> bool {
            state[node] = 1;
            for &edge in &graph.nodes[node].outgoing {
                let target = graph.edges[edge].target;
                if state[target] == 1 || (state[target] == 0 && visit(graph, target, state)) {
                    return true;
                }
            }
            state[node] = 2;
            false
        }
        (0..graph.nodes.len()).any(|node| state[node] == 0 && visit(graph, node, &mut state))
    }

    fn assert_levels_increase(graph: &TrailGraph) {
        for edge in &graph.edges {
            assert!(graph.level(edge.target) > graph.level(edge.origin));
        }
    }

    #[test]
    fn test_build_drops_self_loops_and_merges_parallel_edges() {
        let graph = build(3, 1, &[(1, 2), (2, 1), (2, 2), (2, 3), (3, 9)]);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].dummy_edges, vec![0, 1]);
        assert_eq!(graph.roots, vec![0]);
    }

    #[test]
    fn test_hierarchy_edges_point_backwards() {
        let nodes = vec![dummy(1), dummy(2)];
        let mut edges = vec![DummyEdge::new(EdgeId(1), NodeId(1), NodeId(2), EdgeKind::INHERITANCE)];
        let graph = TrailGraph::build(&nodes, &mut edges, false);
        assert_eq!((graph.edges[0].origin, graph.edges[0].target), (1, 0));

        let graph = TrailGraph::build(&nodes, &mut edges, true);
        assert_eq!((graph.edges[0].origin, graph.edges[0].target), (0, 1));
    }

    #[test]
    fn test_sub_node_edges_attach_to_top_level_nodes() {
        let member = dummy(11);
        let nodes = vec![dummy(1).with_sub_nodes(vec![member]), dummy(2)];
        let mut edges = vec![call(11, 2)];
        let graph = TrailGraph::build(&nodes, &mut edges, false);
        assert_eq!((graph.edges[0].origin, graph.edges[0].target), (0, 1));
    }

    #[test]
    fn test_fallback_roots_are_sources() {
        let graph = build(3, 0, &[(2, 1), (2, 3)]);
        assert_eq!(graph.roots, vec![1]);

        let graph = build(2, 0, &[(1, 2), (2, 1)]);
        assert_eq!(graph.roots, vec![0]);
    }

    #[test]
    fn test_make_acyclic_breaks_cycles() {
        let mut graph = build(4, 1, &[(1, 2), (2, 3), (3, 1), (3, 4), (4, 2)]);
        graph.make_acyclic();
        assert!(!has_cycle(&graph));
        assert!(graph.nodes[0].incoming.is_empty());
    }

    #[test]
    fn test_longest_path_levels() {
        let mut graph = build(4, 1, &[(1, 2), (2, 3), (1, 3), (1, 4)]);
        graph.make_acyclic();
        graph.assign_longest_path_levels();
        graph.assign_remaining_levels();

        let levels: Vec<usize> = (0..4).map(|node| graph.level(node)).collect();
        assert_eq!(levels, vec![0, 1, 2, 1]);
        assert_levels_increase(&graph);
    }

    #[test]
    fn test_virtual_nodes_split_long_edges() {
        let mut graph = build(4, 1, &[(1, 2), (2, 3), (3, 4), (1, 4)]);
        graph.make_acyclic();
        graph.assign_longest_path_levels();
        graph.assign_remaining_levels();
        graph.add_virtual_nodes(Vec2i::new(50, 20));

        assert_eq!(graph.nodes.len(), 6);
        let long_edge = graph
            .edges
            .iter()
            .find(|edge| !edge.virtual_nodes.is_empty())
            .unwrap();
        assert_eq!(long_edge.virtual_nodes.len(), 2);
        assert_eq!(graph.level(long_edge.virtual_nodes[0]), 1);
        assert_eq!(graph.level(long_edge.virtual_nodes[1]), 2);
        assert!(graph.nodes[long_edge.virtual_nodes[0]].is_virtual());
        assert_eq!(graph.nodes[long_edge.virtual_nodes[0]].name, VIRTUAL_NODE_NAME);

        for edge in &graph.edges {
            assert_eq!(graph.level(edge.target), graph.level(edge.origin) + 1);
        }
    }

    fn edge_lists() -> impl Strategy<Value = (i64, Vec<(i64, i64)>)> {
        (2i64..12).prop_flat_map(|count| {
            (
                Just(count),
                prop::collection::vec((1..=count, 1..=count), 0..30),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_levels_strictly_increase_along_edges((count, pairs) in edge_lists(), active in 0i64..12) {
            let mut graph = build(count, active, &pairs);
            graph.make_acyclic();
            prop_assert!(!has_cycle(&graph));

            graph.assign_longest_path_levels();
            graph.assign_remaining_levels();
            for edge in &graph.edges {
                prop_assert!(graph.level(edge.target) > graph.level(edge.origin));
            }
            prop_assert!(graph.nodes.iter().all(|node| node.level.is_some()));
        }
    }
}
