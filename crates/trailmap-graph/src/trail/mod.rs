//! Layered layout for call and inheritance trails.
//!
//! Top level nodes become columns ordered by their distance from the active node. Edges
//! spanning several columns are routed through virtual nodes whose rectangles end up in
//! the dummy edge's `path`.

mod graph;
mod placement;

use crate::dummy::{DummyEdge, DummyNode};
use graph::TrailGraph;
use placement::Axes;
use trailmap_core::{LayoutDirection, Rect, TrailLayoutConfig};

#[derive(Debug, Clone, Copy)]
pub struct TrailLayouter {
    direction: LayoutDirection,
    config: TrailLayoutConfig,
}

impl TrailLayouter {
    pub fn new(direction: LayoutDirection, config: TrailLayoutConfig) -> Self {
        Self { direction, config }
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Positions the visible top level nodes and writes waypoints to edges that cross
    /// more than one column. Returns the number of columns.
    pub fn layout_graph(&self, nodes: &mut [DummyNode], edges: &mut [DummyEdge]) -> usize {
        let inverted = self.direction.is_inverted();
        let mut graph = TrailGraph::build(nodes, edges, inverted);
        if graph.nodes.is_empty() {
            tracing::debug!("Trail layout without visible nodes");
            return 0;
        }

        graph.make_acyclic();
        graph.assign_longest_path_levels();
        graph.assign_remaining_levels();
        graph.add_virtual_nodes(self.config.virtual_node_size);
        graph.log_graph();

        let mut columns = placement::build_columns(&graph);
        placement::reduce_edge_crossings(&graph, &mut columns);
        placement::place_columns(
            &mut graph,
            &columns,
            &self.config,
            Axes {
                horizontal: self.direction.is_horizontal(),
            },
            inverted,
        );

        Self::retrieve_positions(&graph, nodes, edges);
        columns.len()
    }

    fn retrieve_positions(graph: &TrailGraph, nodes: &mut [DummyNode], edges: &mut [DummyEdge]) {
        for trail_node in &graph.nodes {
            if let Some(index) = trail_node.dummy {
                nodes[index].position = trail_node.position;
            }
        }

        for trail_edge in graph.edges.iter().filter(|edge| !edge.virtual_nodes.is_empty()) {
            let waypoints: Vec<Rect> = trail_edge
                .virtual_nodes
                .iter()
                .map(|&node| {
                    let node = &graph.nodes[node];
                    Rect::from_pos_size(node.position, node.size)
                })
                .collect();

            for &index in &trail_edge.dummy_edges {
                let dummy_edge = &mut edges[index];
                let forward = graph.node_of(dummy_edge.target_id) == Some(trail_edge.target);
                dummy_edge.path = if forward {
                    waypoints.clone()
                } else {
                    waypoints.iter().rev().copied().collect()
                };
            }
        }
    }
}
