use crate::vector::Vec2i;
use serde::{Deserialize, Serialize};

/// Rounds `value` to the nearest multiple of `unit`. Remainders of exactly half a unit
/// round toward zero.
pub fn round_to_multiple(value: i32, unit: i32) -> i32 {
    if unit <= 0 {
        return value;
    }

    let mut quotient = value / unit;
    let remainder = value % unit;
    if remainder.abs() > unit / 2 {
        quotient += remainder.signum();
    }
    quotient * unit
}

/// The raster every layout snaps to: a cell followed by padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: i32,
    pub cell_padding: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            cell_padding: Self::DEFAULT_CELL_PADDING,
        }
    }
}

impl GridConfig {
    pub const DEFAULT_CELL_SIZE: i32 = 5;
    pub const DEFAULT_CELL_PADDING: i32 = 10;

    /// Distance between two neighboring raster positions.
    pub fn raster_unit(&self) -> i32 {
        (self.cell_size + self.cell_padding).max(1)
    }

    /// Snaps to the nearest raster position. Plain `(pos / unit) * unit` would truncate
    /// toward zero instead.
    pub fn align_on_raster(&self, position: Vec2i) -> Vec2i {
        let unit = self.raster_unit();
        Vec2i::new(
            round_to_multiple(position.x, unit),
            round_to_multiple(position.y, unit),
        )
    }

    /// Rounds away from zero to a multiple of the raster unit.
    pub fn to_grid_offset(&self, x: i32) -> i32 {
        let unit = self.raster_unit();
        if x > 0 {
            ((x + unit - 1) / unit) * unit
        } else {
            x.div_euclid(unit) * unit
        }
    }

    pub fn to_grid_size(&self, x: i32) -> i32 {
        self.cell_size + self.to_grid_offset(x - self.cell_size)
    }

    pub fn to_grid_gap(&self, x: i32) -> i32 {
        self.cell_padding + self.to_grid_offset(x - self.cell_padding)
    }

    /// Number of grid cells a length of `size` pixels covers.
    pub fn raster_cells(&self, size: i32) -> i32 {
        let mut remaining = size;
        let mut cells = 0;
        while remaining > 0 {
            remaining -= self.cell_size.max(1);
            if remaining > 0 {
                remaining -= self.cell_padding;
            }
            cells += 1;
        }
        cells
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub max_iterations: usize,
    /// Multiplier on `max_node_size * node_count / divisor` for the heat map edge length.
    pub heat_map_scale: usize,
    /// Smallest edge length of the heat map, in cells.
    pub min_heat_map_cells: usize,
    /// Largest edge length of the heat map, in cells. Nodes beyond it are not moved.
    pub max_heat_map_cells: usize,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            heat_map_scale: 1,
            min_heat_map_cells: 3,
            max_heat_map_cells: 2048,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub max_columns: usize,
    pub square_attempts: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            max_columns: 10,
            square_attempts: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Horizontal gap between bucket columns before grid rounding.
    pub column_gap: i32,
    /// Vertical gap between bucket rows before grid rounding.
    pub row_gap: i32,
    /// Gap between the wrapped node columns inside one bucket.
    pub inner_column_gap: i32,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            column_gap: 110,
            row_gap: 70,
            inner_column_gap: 45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailLayoutConfig {
    pub node_gap: i32,
    pub column_gap: i32,
    pub virtual_node_size: Vec2i,
}

impl Default for TrailLayoutConfig {
    fn default() -> Self {
        Self {
            node_gap: 30,
            column_gap: 150,
            virtual_node_size: Vec2i::new(50, 20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Half extent of the area the eigenvector coordinates are scaled to.
    pub scale: f32,
    pub ring_radius: f32,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            scale: 400.0,
            ring_radius: 200.0,
        }
    }
}

/// Every tunable of the layout engine. Deserializing a partial document keeps the
/// defaults for whatever it leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub grid: GridConfig,
    pub postprocess: PostprocessConfig,
    pub list: ListConfig,
    pub bucket: BucketConfig,
    pub trail: TrailLayoutConfig,
    pub spectral: SpectralConfig,
    pub view_size: Vec2i,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            postprocess: PostprocessConfig::default(),
            list: ListConfig::default(),
            bucket: BucketConfig::default(),
            trail: TrailLayoutConfig::default(),
            spectral: SpectralConfig::default(),
            view_size: Vec2i::new(1200, 800),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_align_on_raster_rounds_to_nearest_unit() {
        let grid = GridConfig::default();
        assert_eq!(grid.raster_unit(), 15);
        assert_eq!(grid.align_on_raster(Vec2i::new(7, 8)), Vec2i::new(0, 15));
        assert_eq!(grid.align_on_raster(Vec2i::new(-7, -8)), Vec2i::new(0, -15));
        assert_eq!(grid.align_on_raster(Vec2i::new(37, 45)), Vec2i::new(30, 45));
    }

    #[test]
    fn test_grid_offset_rounds_away_from_zero() {
        let grid = GridConfig::default();
        assert_eq!(grid.to_grid_offset(1), 15);
        assert_eq!(grid.to_grid_offset(15), 15);
        assert_eq!(grid.to_grid_offset(16), 30);
        assert_eq!(grid.to_grid_offset(0), 0);
        assert_eq!(grid.to_grid_offset(-1), -15);
        assert_eq!(grid.to_grid_offset(-15), -15);
    }

    #[test]
    fn test_grid_size_and_gap() {
        let grid = GridConfig::default();
        assert_eq!(grid.to_grid_size(20), 20);
        assert_eq!(grid.to_grid_size(21), 35);
        assert_eq!(grid.to_grid_gap(110), 115);
        assert_eq!(grid.to_grid_gap(70), 70);
    }

    #[test]
    fn test_raster_cells() {
        let grid = GridConfig::default();
        assert_eq!(grid.raster_cells(0), 0);
        assert_eq!(grid.raster_cells(5), 1);
        assert_eq!(grid.raster_cells(15), 1);
        assert_eq!(grid.raster_cells(20), 2);
        assert_eq!(grid.raster_cells(45), 3);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "trail": { "column_gap": 90 } }"#).unwrap();
        assert_eq!(config.trail.column_gap, 90);
        assert_eq!(config.trail.node_gap, 30);
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.postprocess.max_iterations, 10);
        assert_eq!(config.postprocess.heat_map_scale, 1);
        assert_eq!(config.postprocess.max_heat_map_cells, 2048);
    }

    proptest! {
        #[test]
        fn prop_align_on_raster_is_idempotent(x in -100_000i32..100_000, y in -100_000i32..100_000) {
            let grid = GridConfig::default();
            let once = grid.align_on_raster(Vec2i::new(x, y));
            prop_assert_eq!(grid.align_on_raster(once), once);
            prop_assert_eq!(once.x % 15, 0);
            prop_assert!((once.x - x).abs() <= 7);
        }

        #[test]
        fn prop_grid_offset_is_a_multiple_covering_the_input(x in -100_000i32..100_000) {
            let grid = GridConfig::default();
            let offset = grid.to_grid_offset(x);
            prop_assert_eq!(offset % 15, 0);
            prop_assert!(offset.abs() >= x.abs());
            prop_assert!(offset.abs() - x.abs() < 15);
        }
    }
}
