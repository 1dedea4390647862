use crate::dummy::DummyNode;
use serde::{Deserialize, Serialize};
use trailmap_core::config::round_to_multiple;
use trailmap_core::{GridConfig, Matrix, PostprocessConfig, Vec2f, Vec2i};

/// Outcome of one postprocessing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostprocessReport {
    /// Overlap passes that were run.
    pub iterations: usize,
    /// Whether any heat map cell is still covered by more than one node.
    pub overlap_remaining: bool,
    /// Nodes whose footprint lay outside the heat map during the last pass.
    pub skipped_nodes: usize,
}

/// Node area expressed in heat map cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Footprint {
    origin: Vec2i,
    size: Vec2i,
}

/// Per cell count of how many node footprints cover it. The map center is the
/// layout origin.
#[derive(Debug, Clone)]
struct HeatMap {
    cells: Matrix<u32>,
    divisor: i32,
    grid: GridConfig,
}

impl HeatMap {
    fn build(
        nodes: &[DummyNode],
        divisor: i32,
        max_node_size: i32,
        grid: GridConfig,
        config: &PostprocessConfig,
    ) -> Self {
        let extent = Self::extent(nodes.len(), divisor, max_node_size, config);

        let mut heat_map = Self {
            cells: Matrix::new(extent, extent),
            divisor,
            grid,
        };

        for node in nodes {
            let footprint = heat_map.footprint(node);
            if !heat_map.fits(&footprint) {
                tracing::debug!(
                    "Node {} at {} lies outside the heat map, not adding it",
                    node.token_id,
                    node.position
                );
                continue;
            }
            heat_map.modify(&footprint, 1);
        }

        heat_map
    }

    /// Edge length in cells, kept within the configured cell budget.
    fn extent(
        node_count: usize,
        divisor: i32,
        max_node_size: i32,
        config: &PostprocessConfig,
    ) -> usize {
        let base =
            (max_node_size.max(0) as usize).saturating_mul(node_count) / divisor.max(1) as usize;
        let wanted = base.saturating_mul(config.heat_map_scale);
        let max_cells = config.max_heat_map_cells.max(config.min_heat_map_cells);
        if wanted > max_cells {
            tracing::debug!(
                "Heat map of {} cells per side exceeds the budget, using {}",
                wanted,
                max_cells
            );
        }
        wanted.clamp(config.min_heat_map_cells, max_cells)
    }

    fn width(&self) -> i32 {
        self.cells.columns() as i32
    }

    fn height(&self) -> i32 {
        self.cells.rows() as i32
    }

    fn footprint(&self, node: &DummyNode) -> Footprint {
        Footprint {
            origin: Vec2i::new(
                node.position.x.div_euclid(self.divisor) + self.width() / 2,
                node.position.y.div_euclid(self.divisor) + self.height() / 2,
            ),
            size: Vec2i::new(
                self.grid.raster_cells(node.size.x),
                self.grid.raster_cells(node.size.y),
            ),
        }
    }

    fn fits(&self, footprint: &Footprint) -> bool {
        footprint.origin.x >= 0
            && footprint.origin.y >= 0
            && footprint.origin.x + footprint.size.x <= self.width()
            && footprint.origin.y + footprint.size.y <= self.height()
    }

    fn value(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 {
            return 0;
        }
        self.cells.value(x as usize, y as usize).unwrap_or(0)
    }

    fn modify(&mut self, footprint: &Footprint, delta: i32) {
        let mut went_out_of_range = false;
        for i in 0..footprint.size.x {
            for j in 0..footprint.size.y {
                let x = footprint.origin.x + i;
                let y = footprint.origin.y + j;
                if x < 0 || y < 0 {
                    went_out_of_range = true;
                    continue;
                }
                let Some(value) = self.cells.get_mut(x as usize, y as usize) else {
                    went_out_of_range = true;
                    continue;
                };
                *value = value.saturating_add_signed(delta);
            }
        }

        if went_out_of_range {
            tracing::debug!("Left heat map range while modifying {:?}", footprint);
        }
    }

    /// Direction away from the denser neighborhood, and whether the footprint covers a
    /// cell shared with another node. Cells on the map border are not inspected.
    fn gradient(&self, footprint: &Footprint) -> (Vec2f, bool) {
        let mut gradient = Vec2f::default();
        let mut overlap = false;
        let size = footprint.size;

        for i in 0..size.x {
            for j in 0..size.y {
                let x = footprint.origin.x + i;
                let y = footprint.origin.y + j;
                if x < 1 || x > self.width() - 2 || y < 1 || y > self.height() - 2 {
                    continue;
                }

                // weights emphasizing the footprint center
                let h_weight = Self::center_weight(i, size.x);
                let v_weight = Self::center_weight(j, size.y);

                let left = (self.value(x - 1, y) as f32 * h_weight).sqrt();
                let right = (self.value(x + 1, y) as f32 * h_weight).sqrt();
                let up = (self.value(x, y - 1) as f32 * v_weight).sqrt();
                let down = (self.value(x, y + 1) as f32 * v_weight).sqrt();

                gradient += Vec2f::new(left - right, up - down);

                if self.value(x, y) > 1 {
                    overlap = true;
                }
            }
        }

        (gradient, overlap)
    }

    fn center_weight(index: i32, extent: i32) -> f32 {
        let half = extent as f32 * 0.5;
        (half - ((index + 1) as f32 - half).abs()).max(1.0).floor()
    }

    fn has_overlap(&self) -> bool {
        self.cells.iter().any(|&value| value > 1)
    }
}

/// Spreads overlapping nodes apart on a coarse occupancy grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphPostprocessor {
    pub grid: GridConfig,
    pub config: PostprocessConfig,
}

impl GraphPostprocessor {
    const GRADIENT_EPSILON: f32 = 0.000_001;

    pub fn new(grid: GridConfig, config: PostprocessConfig) -> Self {
        Self { grid, config }
    }

    /// Pulls outliers toward the mass center, snaps every node to the raster and then
    /// moves nodes down the heat map gradient until nothing overlaps or the iteration
    /// cap is hit. Node sizes are rounded up to whole raster units.
    pub fn do_postprocessing(&self, nodes: &mut [DummyNode]) -> PostprocessReport {
        let unit = self.grid.raster_unit();
        for node in nodes.iter_mut() {
            let size = Vec2i::new(
                Self::round_up(node.size.x, unit),
                Self::round_up(node.size.y, unit),
            );
            node.set_size(size);
        }

        if nodes.len() < 2 {
            tracing::warn!(
                "Skipping postprocessing, need at least 2 nodes but got {}",
                nodes.len()
            );
            return PostprocessReport::default();
        }

        let mut divisor = i32::MAX;
        let mut max_node_size = 0;
        for node in nodes.iter() {
            for dimension in [node.size.x, node.size.y] {
                if dimension > 0 {
                    divisor = divisor.min(dimension);
                }
                max_node_size = max_node_size.max(dimension);
            }
        }
        let divisor = divisor.min(unit).max(1);

        let center = Self::center_of_mass(nodes);
        Self::resolve_outliers(nodes, center);

        for node in nodes.iter_mut() {
            node.position = self.grid.align_on_raster(node.position);
        }

        let mut heat_map =
            HeatMap::build(nodes, divisor, max_node_size, self.grid, &self.config);
        self.resolve_overlap(nodes, &mut heat_map)
    }

    fn round_up(value: i32, unit: i32) -> i32 {
        if value <= 0 {
            return 0;
        }
        ((value + unit - 1) / unit) * unit
    }

    /// Position average weighted by squared size. Without any mass the plain average
    /// is used.
    pub fn center_of_mass(nodes: &[DummyNode]) -> Vec2f {
        if nodes.is_empty() {
            return Vec2f::default();
        }

        let mut weighted = Vec2f::default();
        let mut total_mass = 0.0f32;
        for node in nodes {
            let mass = node.size.length_squared();
            weighted += node.position.to_f32() * mass;
            total_mass += mass;
        }

        if total_mass > 0.0 {
            weighted / total_mass
        } else {
            let sum = nodes
                .iter()
                .fold(Vec2f::default(), |sum, node| sum + node.position.to_f32());
            sum / nodes.len() as f32
        }
    }

    /// Far away nodes are pulled in harder than nodes already close to the center.
    fn resolve_outliers(nodes: &mut [DummyNode], center: Vec2f) {
        let max_dist = nodes
            .iter()
            .map(|node| (center - node.position.to_f32()).length())
            .fold(0.0f32, f32::max);

        if max_dist <= 0.0 {
            return;
        }

        for node in nodes.iter_mut() {
            let to_center = center - node.position.to_f32();
            let factor = (to_center.length() / max_dist).sqrt();
            node.position = (node.position.to_f32() + to_center * factor).round();
        }
    }

    fn resolve_overlap(
        &self,
        nodes: &mut [DummyNode],
        heat_map: &mut HeatMap,
    ) -> PostprocessReport {
        let divisor = heat_map.divisor;
        let max_offset = divisor as f32;
        let mut report = PostprocessReport::default();
        let mut overlap = true;

        while overlap && report.iterations < self.config.max_iterations {
            overlap = false;
            report.iterations += 1;
            report.skipped_nodes = 0;

            for node in nodes.iter_mut() {
                let footprint = heat_map.footprint(node);
                if !heat_map.fits(&footprint) {
                    tracing::debug!("Node {} is leaving the heat map area", node.token_id);
                    report.skipped_nodes += 1;
                    continue;
                }

                let (mut gradient, node_overlap) = heat_map.gradient(&footprint);
                overlap |= node_overlap;

                // a node lying exactly on top of another has no gradient
                if node_overlap && gradient.length_squared() <= Self::GRADIENT_EPSILON {
                    gradient = Self::radial_direction(node.position);
                }

                heat_map.modify(&footprint, -1);

                let offset = Vec2i::new(
                    (gradient.x * divisor as f32).clamp(-max_offset, max_offset) as i32,
                    (gradient.y * divisor as f32).clamp(-max_offset, max_offset) as i32,
                );
                let previous = node.position;
                let moved = node.position + offset;
                node.position = Vec2i::new(
                    round_to_multiple(moved.x, divisor),
                    round_to_multiple(moved.y, divisor),
                );

                let mut footprint = heat_map.footprint(node);
                if !heat_map.fits(&footprint) {
                    node.position = previous;
                    footprint = heat_map.footprint(node);
                }
                heat_map.modify(&footprint, 1);

                let (_, still_overlapping) = heat_map.gradient(&footprint);
                overlap |= still_overlapping;
            }
        }

        report.overlap_remaining = heat_map.has_overlap();
        report
    }

    /// Unit vector pointing away from the origin.
    fn radial_direction(position: Vec2i) -> Vec2f {
        if position == Vec2i::default() {
            Vec2f::new(1.0, 0.0)
        } else {
            position.normalized()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trailmap_core::NodeId;

    fn node(id: i64, x: i32, y: i32, w: i32, h: i32) -> DummyNode {
        DummyNode::data(NodeId(id), format!("n{id}"), Vec2i::new(w, h))
            .with_position(Vec2i::new(x, y))
    }

    fn overlapping_pairs(nodes: &[DummyNode]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for a in 0..nodes.len() {
            for b in a + 1..nodes.len() {
                if nodes[a].rect().intersects(&nodes[b].rect()) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    #[test]
    fn test_single_node_is_left_alone() {
        let mut nodes = vec![node(1, 7, 7, 30, 30)];
        let report = GraphPostprocessor::default().do_postprocessing(&mut nodes);
        assert_eq!(report, PostprocessReport::default());
        assert_eq!(nodes[0].position, Vec2i::new(7, 7));
    }

    #[test]
    fn test_center_of_mass_of_symmetric_nodes_is_symmetry_point() {
        let nodes = vec![
            node(1, -100, -50, 40, 40),
            node(2, 100, 50, 40, 40),
            node(3, -100, 50, 20, 20),
            node(4, 100, -50, 20, 20),
        ];
        let center = GraphPostprocessor::center_of_mass(&nodes);
        assert!(center.x.abs() < 1e-4);
        assert!(center.y.abs() < 1e-4);
    }

    #[test]
    fn test_heavier_nodes_pull_the_center() {
        let nodes = vec![node(1, 0, 0, 60, 60), node(2, 100, 0, 15, 15)];
        let center = GraphPostprocessor::center_of_mass(&nodes);
        assert!(center.x < 50.0);
    }

    #[test]
    fn test_sizes_are_rounded_up_to_the_raster() {
        let mut nodes = vec![node(1, 0, 0, 31, 1), node(2, 300, 0, 15, 0)];
        GraphPostprocessor::default().do_postprocessing(&mut nodes);
        assert_eq!(nodes[0].size, Vec2i::new(45, 15));
        assert_eq!(nodes[1].size, Vec2i::new(15, 0));
    }

    #[test]
    fn test_stacked_nodes_are_pulled_apart() {
        let mut nodes = vec![node(1, 0, 0, 45, 45), node(2, 15, 0, 45, 45)];
        let report = GraphPostprocessor::default().do_postprocessing(&mut nodes);

        assert!(report.iterations <= 10);
        assert!(!report.overlap_remaining);
        assert!(overlapping_pairs(&nodes).is_empty(), "{:?}", nodes);
        for node in &nodes {
            assert_eq!(node.position.x % 15, 0);
            assert_eq!(node.position.y % 15, 0);
        }
    }

    #[test]
    fn test_outliers_move_toward_the_center() {
        let mut nodes = vec![
            node(1, 0, 0, 30, 30),
            node(2, 60, 0, 30, 30),
            node(3, 3000, 0, 30, 30),
        ];
        GraphPostprocessor::default().do_postprocessing(&mut nodes);
        assert!(nodes[2].position.x < 3000);
    }

    #[test]
    fn test_heat_map_extent_stays_within_budget() {
        let config = PostprocessConfig::default();
        assert_eq!(HeatMap::extent(4, 15, 60, &config), 16);
        assert_eq!(HeatMap::extent(1, 15, 15, &config), 3);
        assert_eq!(HeatMap::extent(300, 15, 900, &config), 2048);

        let scaled = PostprocessConfig {
            heat_map_scale: 5,
            ..config
        };
        assert_eq!(HeatMap::extent(4, 15, 60, &scaled), 80);
        assert_eq!(HeatMap::extent(usize::MAX, 1, i32::MAX, &scaled), 2048);
    }

    #[test]
    fn test_large_graph_is_processed_within_budget() {
        let mut nodes: Vec<DummyNode> = (0..300)
            .map(|i| node(i + 1, 0, i as i32 * 90, 900, 60))
            .collect();
        let processor = GraphPostprocessor::default();
        let report = processor.do_postprocessing(&mut nodes);

        assert!(report.iterations >= 1);
        assert!(report.iterations <= processor.config.max_iterations);
        for node in &nodes {
            assert_eq!(node.position.x % 15, 0);
            assert_eq!(node.position.y % 15, 0);
        }
    }

    fn nodes_strategy() -> impl Strategy<Value = Vec<DummyNode>> {
        proptest::collection::vec((-300i32..300, -300i32..300, 5i32..90, 5i32..60), 2..12).prop_map(
            |specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y, w, h))| node(i as i64 + 1, x, y, w, h))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_postprocessing_terminates_within_iteration_cap(mut nodes in nodes_strategy()) {
            let processor = GraphPostprocessor::default();
            let report = processor.do_postprocessing(&mut nodes);
            prop_assert!(report.iterations >= 1);
            prop_assert!(report.iterations <= processor.config.max_iterations);
            for node in &nodes {
                prop_assert_eq!(node.position.x % 15, 0);
                prop_assert_eq!(node.position.y % 15, 0);
            }
        }
    }
}
