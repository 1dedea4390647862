//! Experimental layouts that ignore the grid: a spectral embedding of the top level graph
//! and a ring around the first node.

use crate::dummy::{DummyEdge, DummyNode};
use nalgebra::{DMatrix, SymmetricEigen};
use std::collections::HashMap;
use trailmap_core::{NodeId, SpectralConfig, Vec2f, Vec2i};

const EPSILON: f64 = 1e-9;

fn center_on(node: &mut DummyNode, center: Vec2f) {
    node.position = center.round() - node.size / 2;
}

fn visible_indices(nodes: &[DummyNode]) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.visible)
        .map(|(index, _)| index)
        .collect()
}

/// Puts the first visible node at the origin and the others on a circle around it, the
/// first of them at an angle of -1 rad. Positions are top-left corners.
pub fn layout_simple_ring(nodes: &mut [DummyNode], radius: f32) {
    let visible = visible_indices(nodes);
    let Some((&first, rest)) = visible.split_first() else {
        return;
    };

    nodes[first].position = Vec2i::default();

    let step = std::f32::consts::TAU / rest.len().max(1) as f32;
    for (k, &index) in rest.iter().enumerate() {
        let angle = -1.0 + k as f32 * step;
        nodes[index].position = (Vec2f::new(angle.cos(), angle.sin()) * radius).round();
    }
}

/// Places the visible top level nodes at the eigenvectors of the two smallest non-trivial
/// eigenvalues of the graph Laplacian. Small graphs fall back to the ring layout.
pub fn layout_spectral(nodes: &mut [DummyNode], edges: &[DummyEdge], config: &SpectralConfig) {
    let visible = visible_indices(nodes);
    let count = visible.len();
    if count < 3 {
        tracing::debug!("Spectral layout needs 3 nodes, got {}, using ring layout", count);
        layout_simple_ring(nodes, config.ring_radius);
        return;
    }

    let mut top_level: HashMap<NodeId, usize> = HashMap::new();
    for (row, &index) in visible.iter().enumerate() {
        for token_id in nodes[index].token_ids() {
            top_level.entry(token_id).or_insert(row);
        }
    }

    let mut laplacian = DMatrix::<f64>::zeros(count, count);
    for edge in edges.iter().filter(|edge| edge.visible) {
        let (Some(&a), Some(&b)) = (top_level.get(&edge.owner_id), top_level.get(&edge.target_id)) else {
            continue;
        };
        if a == b {
            continue;
        }

        let weight = edge.weight() as f64;
        laplacian[(a, b)] -= weight;
        laplacian[(b, a)] -= weight;
        laplacian[(a, a)] += weight;
        laplacian[(b, b)] += weight;
    }

    let eigen = SymmetricEigen::new(laplacian);
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let x = eigen.eigenvectors.column(order[1]);
    let y = eigen.eigenvectors.column(order[2]);
    let x_extent = x.amax();
    let y_extent = y.amax();

    let scale = f64::from(config.scale);
    for (row, &index) in visible.iter().enumerate() {
        let cx = if x_extent > EPSILON { x[row] / x_extent * scale } else { 0.0 };
        let cy = if y_extent > EPSILON { y[row] / y_extent * scale } else { 0.0 };
        center_on(&mut nodes[index], Vec2f::new(cx as f32, cy as f32));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmap_core::{EdgeId, EdgeKind};

    fn square(id: i64) -> DummyNode {
        DummyNode::data(NodeId(id), format!("n{id}"), Vec2i::new(20, 20))
    }

    fn center(node: &DummyNode) -> Vec2f {
        node.rect().center()
    }

    #[test]
    fn test_ring_with_five_nodes() {
        let mut nodes: Vec<DummyNode> = (1..=5).map(square).collect();
        layout_simple_ring(&mut nodes, 200.0);

        assert_eq!(nodes[0].position, Vec2i::new(0, 0));
        for node in &nodes[1..] {
            let distance = node.position.length();
            assert!((distance - 200.0).abs() < 1.0, "distance {distance}");
        }

        let first = nodes[1].position.to_f32();
        assert!((first.y.atan2(first.x) + 1.0).abs() < 0.01);
        // quarter turns apart
        let second = nodes[2].position.to_f32();
        assert!((second.y.atan2(second.x) - (std::f32::consts::FRAC_PI_2 - 1.0)).abs() < 0.01);
    }

    #[test]
    fn test_ring_skips_hidden_nodes() {
        let mut nodes: Vec<DummyNode> = (1..=3).map(square).collect();
        nodes[0].visible = false;
        nodes[0].position = Vec2i::new(99, 99);
        layout_simple_ring(&mut nodes, 100.0);

        assert_eq!(nodes[0].position, Vec2i::new(99, 99));
        assert_eq!(nodes[1].position, Vec2i::new(0, 0));
        assert!((nodes[2].position.length() - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_spectral_orders_a_path_along_one_axis() {
        let mut nodes: Vec<DummyNode> = (1..=5).map(square).collect();
        let edges: Vec<DummyEdge> = (1..5)
            .map(|id| DummyEdge::new(EdgeId(id), NodeId(id), NodeId(id + 1), EdgeKind::CALL))
            .collect();
        layout_spectral(&mut nodes, &edges, &SpectralConfig::default());

        let xs: Vec<f32> = nodes.iter().map(|node| center(node).x).collect();
        let increasing = xs.windows(2).all(|pair| pair[0] < pair[1]);
        let decreasing = xs.windows(2).all(|pair| pair[0] > pair[1]);
        assert!(increasing || decreasing, "{xs:?}");

        let max = xs.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
        assert!((max - 400.0).abs() < 1.5);
    }

    #[test]
    fn test_spectral_falls_back_to_ring() {
        let mut nodes: Vec<DummyNode> = (1..=2).map(square).collect();
        layout_spectral(&mut nodes, &[], &SpectralConfig::default());
        assert_eq!(nodes[0].position, Vec2i::new(0, 0));
        assert!((nodes[1].position.length() - 200.0).abs() < 1.0);
    }
}
