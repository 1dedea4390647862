//! Synthetic graphs shared by the benches.

use trailmap_core::{AccessKind, EdgeId, EdgeKind, NodeId, NodeKind, TokenComponents, Vec2i};
use trailmap_graph::{DummyEdge, DummyNode};
use trailmap_query::{FilterEdge, FilterGraph, FilterGraphInput, FilterNode};

/// Nodes stacked in one column so that every neighbour pair overlaps.
pub fn overlapping_nodes(count: usize) -> Vec<DummyNode> {
    (0..count)
        .map(|i| {
            let mut node = DummyNode::data(
                NodeId(i as i64 + 1),
                format!("node_{i}"),
                Vec2i::new(60 + (i % 4) as i32 * 20, 30),
            );
            node.position = Vec2i::new((i % 7) as i32 * 25, (i / 7) as i32 * 20);
            node
        })
        .collect()
}

/// A layered call graph: `width` nodes per layer, each calling two nodes of the next
/// layer, plus one back edge per layer.
pub fn layered_call_graph(layers: usize, width: usize) -> (Vec<DummyNode>, Vec<DummyEdge>) {
    let id = |layer: usize, slot: usize| NodeId((layer * width + slot) as i64 + 1);

    let mut nodes = Vec::with_capacity(layers * width);
    for layer in 0..layers {
        for slot in 0..width {
            let mut node =
                DummyNode::data(id(layer, slot), format!("fn_{layer}_{slot}"), Vec2i::new(100, 30));
            node.active = layer == 0 && slot == 0;
            nodes.push(node);
        }
    }

    let mut edges = Vec::new();
    let mut next_edge = 1;
    let mut push = |edges: &mut Vec<DummyEdge>, from: NodeId, to: NodeId| {
        edges.push(DummyEdge::new(EdgeId(next_edge), from, to, EdgeKind::CALL));
        next_edge += 1;
    };
    for layer in 0..layers.saturating_sub(1) {
        for slot in 0..width {
            push(&mut edges, id(layer, slot), id(layer + 1, slot));
            push(&mut edges, id(layer, slot), id(layer + 1, (slot + 1) % width));
        }
        if layer > 0 {
            push(&mut edges, id(layer + 1, 0), id(layer, 0));
        }
    }
    (nodes, edges)
}

/// `classes` classes with `members` methods and fields each, and calls between them.
pub fn code_graph(classes: usize, members: usize) -> FilterGraph {
    let mut input = FilterGraphInput::default();
    let mut next_edge = 1;

    for class in 0..classes {
        let class_id = (class * (members + 1)) as i64 + 1;
        input.nodes.push(FilterNode::new(
            NodeId(class_id),
            NodeKind::CLASS,
            format!("Class{class}"),
        ));

        for member in 0..members {
            let member_id = class_id + member as i64 + 1;
            let kind = if member % 2 == 0 { NodeKind::METHOD } else { NodeKind::FIELD };
            let components = TokenComponents {
                is_const: member % 3 == 0,
                is_static: member % 5 == 0,
                ..TokenComponents::default()
            };
            input.nodes.push(
                FilterNode::new(NodeId(member_id), kind, format!("Class{class}::m{member}"))
                    .with_components(components),
            );

            let access = if member % 2 == 0 { AccessKind::Public } else { AccessKind::Private };
            input.edges.push(
                FilterEdge::new(EdgeId(next_edge), EdgeKind::MEMBER, NodeId(class_id), NodeId(member_id))
                    .with_components(TokenComponents::with_access(access)),
            );
            next_edge += 1;

            if kind == NodeKind::METHOD && class + 1 < classes {
                let callee = ((class + 1) * (members + 1)) as i64 + 1 + member as i64 + 1;
                input.edges.push(FilterEdge::new(
                    EdgeId(next_edge),
                    EdgeKind::CALL,
                    NodeId(member_id),
                    NodeId(callee),
                ));
                next_edge += 1;
            }
        }
    }
    FilterGraph::from(input)
}
